//! Publication record - the typed output of the pipeline.
//!
//! Every field's optionality is explicit; there is no dict-shaped result.
//! Monetary values are integer minor units (cents), never floating point.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An attorney citation extracted from a publication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lawyer {
    /// Attorney name as printed
    pub name: String,

    /// OAB registration number
    pub oab_number: String,

    /// OAB state (e.g. "SP"); absent when the citation omits it
    pub oab_state: Option<String>,
}

impl Lawyer {
    /// Create a lawyer citation.
    pub fn new(name: impl Into<String>, oab_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oab_number: oab_number.into(),
            oab_state: None,
        }
    }

    /// Set the OAB state.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.oab_state = Some(state.into());
        self
    }

    /// Identity used for deduplication: (name, number), case-insensitive on
    /// the name.
    pub fn dedup_key(&self) -> (String, String) {
        (self.name.to_uppercase(), self.oab_number.clone())
    }
}

/// Which extractor produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPath {
    /// Merge-aware extractor with the full pattern cascade
    Enhanced,

    /// Single-pass fallback extractor
    Legacy,
}

impl std::fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionPath::Enhanced => write!(f, "enhanced"),
            ExtractionPath::Legacy => write!(f, "legacy"),
        }
    }
}

/// One structured publication, extracted from a (possibly merged) occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Canonical process number (the occurrence's anchor)
    pub process_number: Option<String>,

    /// Plaintiff-side party names
    pub authors: Vec<String>,

    /// Defendant name, when the role keyword is present
    pub defendant: Option<String>,

    /// Attorney citations, deduplicated by (name, OAB number)
    pub lawyers: Vec<Lawyer>,

    /// Monetary fields in integer cents
    pub gross_value: Option<i64>,
    pub net_value: Option<i64>,
    pub interest_value: Option<i64>,
    pub attorney_fees: Option<i64>,

    /// Dates, mapped by label
    pub publication_date: Option<NaiveDate>,
    pub availability_date: Option<NaiveDate>,

    /// Full (merged) publication text
    pub content: String,

    /// Completeness score in [0, 1]
    pub quality_score: f32,

    /// Pages that contributed content, in reading order
    pub source_page_numbers: Vec<u32>,

    /// Which extractor produced this record
    pub extraction_path: ExtractionPath,

    /// True when a detected truncation could not be resolved within one
    /// merge hop (fetch failure, rejected splice, or a span exceeding two
    /// pages).
    pub unresolved_truncation: bool,
}

impl PublicationRecord {
    /// Create an empty record for the given content.
    pub fn new(content: impl Into<String>, source_page_numbers: Vec<u32>) -> Self {
        Self {
            process_number: None,
            authors: Vec::new(),
            defendant: None,
            lawyers: Vec::new(),
            gross_value: None,
            net_value: None,
            interest_value: None,
            attorney_fees: None,
            publication_date: None,
            availability_date: None,
            content: content.into(),
            quality_score: 0.0,
            source_page_numbers,
            extraction_path: ExtractionPath::Enhanced,
            unresolved_truncation: false,
        }
    }

    /// Whether any monetary field is present.
    pub fn has_monetary_value(&self) -> bool {
        self.gross_value.is_some()
            || self.net_value.is_some()
            || self.interest_value.is_some()
            || self.attorney_fees.is_some()
    }

    /// Whether any date field is present.
    pub fn has_date(&self) -> bool {
        self.publication_date.is_some() || self.availability_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_is_case_insensitive_on_name() {
        let a = Lawyer::new("Marcio Silva", "45683").with_state("SP");
        let b = Lawyer::new("MARCIO SILVA", "45683");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn monetary_and_date_presence() {
        let mut record = PublicationRecord::new("text", vec![1]);
        assert!(!record.has_monetary_value());
        assert!(!record.has_date());

        record.interest_value = Some(1000);
        record.availability_date = NaiveDate::from_ymd_opt(2024, 3, 12);
        assert!(record.has_monetary_value());
        assert!(record.has_date());
    }

    #[test]
    fn extraction_path_serializes_lowercase() {
        let json = serde_json::to_string(&ExtractionPath::Enhanced).unwrap();
        assert_eq!(json, "\"enhanced\"");
        let json = serde_json::to_string(&ExtractionPath::Legacy).unwrap();
        assert_eq!(json, "\"legacy\"");
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record = PublicationRecord::new("Processo ...", vec![3, 4]);
        record.process_number = Some("1234567-89.2024.8.26.0100".to_string());
        record.gross_value = Some(150050);
        record.quality_score = 0.9;

        let json = serde_json::to_string(&record).unwrap();
        let back: PublicationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.process_number, record.process_number);
        assert_eq!(back.gross_value, Some(150050));
        assert_eq!(back.source_page_numbers, vec![3, 4]);
    }
}
