//! Extractor capability - the enhanced/legacy polymorphism.
//!
//! The two extraction paths are variants of one capability, selected by the
//! orchestrator on measured score. There is no feature flag and no
//! inheritance: both consume the same compiled cascade, parameterized
//! differently.

use crate::fields::{ExtractParams, FieldExtractor};
use crate::types::{config::CompiledPatterns, ExtractionPath, PublicationRecord};

/// Turns (possibly merged) occurrence text into a tagged record.
pub trait Extractor {
    /// Extract a record from text.
    fn extract(&self, text: &str, source_pages: &[u32]) -> PublicationRecord;

    /// Which path this extractor implements.
    fn path(&self) -> ExtractionPath;
}

/// Merge-aware extractor: full cascade, trailing-window re-scan, candidate
/// validation.
pub struct EnhancedExtractor<'a> {
    fields: FieldExtractor<'a>,
}

impl<'a> EnhancedExtractor<'a> {
    /// Create an enhanced extractor.
    pub fn new(patterns: &'a CompiledPatterns, tail_window: usize) -> Self {
        Self {
            fields: FieldExtractor::new(patterns, ExtractParams::enhanced(tail_window)),
        }
    }
}

impl Extractor for EnhancedExtractor<'_> {
    fn extract(&self, text: &str, source_pages: &[u32]) -> PublicationRecord {
        let mut record = self.fields.extract(text, source_pages);
        record.extraction_path = ExtractionPath::Enhanced;
        record
    }

    fn path(&self) -> ExtractionPath {
        ExtractionPath::Enhanced
    }
}

/// Single-pass fallback extractor: most specific patterns only, no window,
/// no candidate validation.
pub struct LegacyExtractor<'a> {
    fields: FieldExtractor<'a>,
}

impl<'a> LegacyExtractor<'a> {
    /// Create a legacy extractor.
    pub fn new(patterns: &'a CompiledPatterns) -> Self {
        Self {
            fields: FieldExtractor::new(patterns, ExtractParams::legacy()),
        }
    }
}

impl Extractor for LegacyExtractor<'_> {
    fn extract(&self, text: &str, source_pages: &[u32]) -> PublicationRecord {
        let mut record = self.fields.extract(text, source_pages);
        record.extraction_path = ExtractionPath::Legacy;
        record
    }

    fn path(&self) -> ExtractionPath {
        ExtractionPath::Legacy
    }
}
