//! Boundary scanner - locates publication spans within one page.
//!
//! Publications are laid out contiguously with no delimiters; the only
//! reliable boundary is the process-number anchor that opens each one. A
//! span runs from its anchor to just before the next anchor (or page end),
//! and truncation flags mark spans whose content crosses the page edge.

use tracing::debug;

use crate::types::{config::CompiledPatterns, Occurrence};

/// Scans one page of text for publication occurrences.
pub struct BoundaryScanner<'a> {
    patterns: &'a CompiledPatterns,
    head_probe_window: usize,
}

impl<'a> BoundaryScanner<'a> {
    /// Create a scanner over compiled patterns.
    pub fn new(patterns: &'a CompiledPatterns, head_probe_window: usize) -> Self {
        Self {
            patterns,
            head_probe_window,
        }
    }

    /// Scan a page, returning occurrences in reading order.
    ///
    /// A page with no anchors yields an empty list; that is not an error.
    pub fn scan(&self, page_number: u32, text: &str) -> Vec<Occurrence> {
        let anchor_starts: Vec<usize> = self
            .patterns
            .anchor
            .find_iter(text)
            .map(|m| m.start())
            .collect();

        if anchor_starts.is_empty() {
            debug!(page_number, "no anchors on page");
            return Vec::new();
        }

        let mut occurrences = Vec::with_capacity(anchor_starts.len() + 1);

        // Pre-anchor prefix. A prefix that opens with lawyer-citation tokens
        // is a lawyer list spilled over from the previous page; it becomes a
        // head-truncated occurrence to be completed backwards. A prefix that
        // starts mid-sentence belongs to the previous page's tail-merge and
        // is dropped here, so the same publication is never emitted twice.
        let first_anchor = anchor_starts[0];
        if first_anchor > 0 {
            let prefix = &text[..first_anchor];
            if self.begins_with_citation(prefix) {
                debug!(
                    page_number,
                    end_offset = first_anchor,
                    "head-truncated prefix before first anchor"
                );
                occurrences.push(Occurrence {
                    start_offset: 0,
                    end_offset: first_anchor,
                    raw_text: prefix.to_string(),
                    page_number,
                    head_truncated: true,
                    tail_truncated: false,
                });
            }
        }

        for (i, &start) in anchor_starts.iter().enumerate() {
            let end = anchor_starts.get(i + 1).copied().unwrap_or(text.len());
            let span = &text[start..end];
            let tail_truncated = !self.patterns.lawyer_marker.is_match(span);

            if tail_truncated {
                debug!(
                    page_number,
                    start_offset = start,
                    end_offset = end,
                    "occurrence without terminal lawyer marker"
                );
            }

            occurrences.push(Occurrence {
                start_offset: start,
                end_offset: end,
                raw_text: span.to_string(),
                page_number,
                head_truncated: false,
                tail_truncated,
            });
        }

        occurrences
    }

    /// Whether a pre-anchor prefix opens with lawyer-citation tokens.
    ///
    /// Two conditions: the first marker starts within the probe window, and
    /// everything before it is name-list material (separators and uppercase
    /// fragments, no lowercase sentence text). A mid-sentence remainder that
    /// merely contains a citation further in fails the second check.
    fn begins_with_citation(&self, prefix: &str) -> bool {
        let Some(m) = self.patterns.lawyer_marker.find(prefix) else {
            return false;
        };
        if m.start() > self.head_probe_window {
            return false;
        }
        !prefix[..m.start()].chars().any(|c| c.is_lowercase())
    }
}
