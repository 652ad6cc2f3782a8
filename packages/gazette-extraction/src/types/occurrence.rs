//! Occurrence - a candidate publication span found on a single page.

use serde::{Deserialize, Serialize};

/// A candidate publication span, produced by the boundary scanner and
/// consumed by the merger. Offsets are byte positions into the page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Span start within the page text
    pub start_offset: usize,

    /// Span end (exclusive) within the page text
    pub end_offset: usize,

    /// The span's text
    pub raw_text: String,

    /// Page the span was found on
    pub page_number: u32,

    /// Content spilled over from the previous page (span starts with
    /// lawyer-citation tokens before any anchor)
    pub head_truncated: bool,

    /// Span ends without a terminal lawyer-citation marker
    pub tail_truncated: bool,
}

impl Occurrence {
    /// Whether this occurrence needs merge resolution.
    pub fn is_truncated(&self) -> bool {
        self.head_truncated || self.tail_truncated
    }

    /// Span length in bytes.
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}
