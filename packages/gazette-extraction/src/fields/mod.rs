//! Field extraction - pattern cascades over (merged) occurrence text.
//!
//! One parameterized cascade serves both extraction paths: the enhanced
//! extractor runs it in full, the legacy extractor runs a restricted pass.
//! A failure on any single field leaves that field absent; it never aborts
//! the record.

pub mod dates;
pub mod lawyers;
pub mod money;

pub use dates::parse_flexible_date;
pub use money::parse_money_cents;

use crate::types::{config::CompiledPatterns, PublicationRecord};

/// How a pass over the cascade is parameterized.
#[derive(Debug, Clone, Copy)]
pub struct ExtractParams {
    /// Trailing window (bytes) re-scanned for lawyer lists; `None` disables
    pub tail_window: Option<usize>,

    /// Restrict the lawyer cascade to its N most specific entries
    pub cascade_limit: Option<usize>,

    /// Validate author candidates (token count, length, no digits)
    pub validate_authors: bool,
}

impl ExtractParams {
    /// Full cascade with a trailing re-scan: the enhanced path.
    pub fn enhanced(tail_window: usize) -> Self {
        Self {
            tail_window: Some(tail_window),
            cascade_limit: None,
            validate_authors: true,
        }
    }

    /// Single pass over the two most specific patterns, no window, no
    /// candidate validation: the legacy path.
    pub fn legacy() -> Self {
        Self {
            tail_window: None,
            cascade_limit: Some(2),
            validate_authors: false,
        }
    }
}

/// Turns occurrence text into a typed record.
pub struct FieldExtractor<'a> {
    patterns: &'a CompiledPatterns,
    params: ExtractParams,
}

impl<'a> FieldExtractor<'a> {
    /// Create an extractor over compiled patterns.
    pub fn new(patterns: &'a CompiledPatterns, params: ExtractParams) -> Self {
        Self { patterns, params }
    }

    /// Extract all fields from text. Infallible by design: missing or
    /// malformed fields stay absent.
    pub fn extract(&self, text: &str, source_pages: &[u32]) -> PublicationRecord {
        let mut record = PublicationRecord::new(text, source_pages.to_vec());

        record.process_number = self
            .patterns
            .anchor
            .find(text)
            .map(|m| m.as_str().to_string());
        record.authors = self.authors(text);
        record.defendant = self.defendant(text);
        record.lawyers = lawyers::extract_lawyers(
            self.patterns,
            text,
            self.params.tail_window,
            self.params.cascade_limit,
        );
        record.gross_value = money::extract_money(&self.patterns.money_gross, text, "gross");
        record.net_value = money::extract_money(&self.patterns.money_net, text, "net");
        record.interest_value =
            money::extract_money(&self.patterns.money_interest, text, "interest");
        record.attorney_fees = money::extract_money(&self.patterns.money_fees, text, "fees");
        record.publication_date =
            dates::extract_date(&self.patterns.date_publication, text, "publication");
        record.availability_date =
            dates::extract_date(&self.patterns.date_availability, text, "availability");

        record
    }

    /// Authors live between the anchor and the first role keyword, separated
    /// by commas or "e".
    fn authors(&self, text: &str) -> Vec<String> {
        let anchor_end = match self.patterns.anchor.find(text) {
            Some(m) => m.end(),
            None => 0,
        };
        let rest = &text[anchor_end..];
        let Some(role) = self.patterns.author_role.find(rest) else {
            return Vec::new();
        };
        let segment = &rest[..role.start()];

        let mut authors = Vec::new();
        for part in segment.split(',') {
            for piece in part.split(" e ").flat_map(|p| p.split(" E ")) {
                let candidate = clean_candidate(piece);
                if candidate.is_empty() {
                    continue;
                }
                if !self.params.validate_authors || valid_author(&candidate) {
                    authors.push(candidate);
                }
            }
        }
        authors
    }

    /// Defendant follows its role keyword; the compiled pattern captures up
    /// to the next delimiter.
    fn defendant(&self, text: &str) -> Option<String> {
        let caps = self.patterns.defendant_role.captures(text)?;
        let candidate = clean_candidate(caps.get(1)?.as_str());
        if candidate.is_empty() {
            None
        } else {
            Some(candidate)
        }
    }
}

fn clean_candidate(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| "-–.;:,".contains(c) || c.is_whitespace())
        .to_string()
}

/// A plausible party name: at least two tokens, every token at least two
/// chars, no digits anywhere.
fn valid_author(candidate: &str) -> bool {
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    tokens.len() >= 2
        && tokens
            .iter()
            .all(|t| t.chars().count() >= 2 && !t.chars().any(|c| c.is_ascii_digit()))
}
