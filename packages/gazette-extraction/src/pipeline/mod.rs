//! Extraction pipeline - per-page orchestration.
//!
//! One page moves through a fixed sequence: scan for occurrences, resolve
//! truncation against adjoining pages, extract fields on the enhanced path,
//! score, and fall back to the legacy extractor when the score misses the
//! threshold. Every occurrence emits a record; low quality degrades the
//! score, it never drops the publication.

pub mod fallback;

pub use fallback::{FallbackAdapter, FallbackStats};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::CacheStats;
use crate::error::Result;
use crate::merger::{ContentMerger, MergeStatus, MergedOccurrence};
use crate::scanner::BoundaryScanner;
use crate::scorer::QualityScorer;
use crate::traits::extractor::{EnhancedExtractor, Extractor, LegacyExtractor};
use crate::traits::page_source::{PageSource, QueryContext};
use crate::types::{config::CompiledPatterns, EngineConfig, PublicationRecord};

/// What one page produced, with counters for observability.
#[derive(Debug, Clone, Default)]
pub struct PageReport {
    /// The page this report covers
    pub page_number: u32,

    /// Records emitted, in reading order
    pub records: Vec<PublicationRecord>,

    /// Occurrences the scanner found
    pub occurrences_found: usize,

    /// Occurrences that were truncated and went to the merger
    pub merges_attempted: usize,

    /// Splices accepted by validation
    pub merges_applied: usize,

    /// Splices rejected by validation
    pub merges_rejected: usize,

    /// Truncations left unresolved (fetch failure, page edge, cancellation)
    pub merges_unresolved: usize,

    /// Occurrences where the legacy extractor was consulted
    pub fallbacks_taken: usize,
}

impl PageReport {
    fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Self::default()
        }
    }

    /// Whether every truncation on the page was resolved cleanly.
    pub fn is_clean(&self) -> bool {
        self.merges_rejected == 0 && self.merges_unresolved == 0
    }
}

/// The per-worker extraction pipeline.
///
/// Owns the merger (and through it the page cache), so one pipeline per
/// scraping session. Construction validates the config and compiles every
/// pattern; a bad pattern fails here, never mid-page.
pub struct ExtractionPipeline<S: PageSource> {
    config: EngineConfig,
    patterns: CompiledPatterns,
    merger: ContentMerger<S>,
    scorer: QualityScorer,
    fallback: FallbackAdapter,
    cancel: CancellationToken,
}

impl<S: PageSource> ExtractionPipeline<S> {
    /// Build a pipeline over a page source.
    pub fn new(source: S, config: EngineConfig) -> Result<Self> {
        Self::with_cancellation(source, config, CancellationToken::new())
    }

    /// Build a pipeline that observes an external cancellation token.
    /// Cancellation abandons in-flight adjoining-page fetches; occurrences
    /// already scanned still emit, unmerged.
    pub fn with_cancellation(
        source: S,
        config: EngineConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        config.validate()?;
        let patterns = config.patterns.compile()?;
        let merger = ContentMerger::new(
            source,
            config.cache_capacity,
            config.merge_safety_budget,
            cancel.clone(),
        );
        let scorer = QualityScorer::new(config.weights);

        Ok(Self {
            config,
            patterns,
            merger,
            scorer,
            fallback: FallbackAdapter::new(),
            cancel,
        })
    }

    /// Token that cancels this pipeline's adjoining-page fetches.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Page-cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.merger.cache_stats()
    }

    /// Fallback arbitration counters.
    pub fn fallback_stats(&self) -> FallbackStats {
        self.fallback.stats()
    }

    /// Process one page of gazette text.
    ///
    /// Deterministic for a given page text and source state: records come
    /// out in reading order with identical fields and scores on every run.
    /// Occurrence failures are isolated; one bad span cannot take down the
    /// rest of the page.
    pub async fn process_page(
        &mut self,
        ctx: &QueryContext,
        page_number: u32,
        text: &str,
    ) -> PageReport {
        let mut report = PageReport::new(page_number);

        let scanner = BoundaryScanner::new(&self.patterns, self.config.head_probe_window);
        let occurrences = scanner.scan(page_number, text);
        report.occurrences_found = occurrences.len();
        if occurrences.is_empty() {
            debug!(page_number, "page yielded no occurrences");
            return report;
        }
        info!(
            page_number,
            occurrences = occurrences.len(),
            "processing page"
        );

        for occurrence in occurrences {
            let start_offset = occurrence.start_offset;
            let end_offset = occurrence.end_offset;
            if occurrence.is_truncated() {
                report.merges_attempted += 1;
            }

            let merged = self
                .merger
                .resolve(ctx, occurrence, &self.patterns)
                .await;
            match merged.status {
                MergeStatus::NotNeeded => {}
                MergeStatus::Merged => report.merges_applied += 1,
                MergeStatus::Rejected => report.merges_rejected += 1,
                MergeStatus::Unresolved => report.merges_unresolved += 1,
            }

            let record = self.extract_and_score(&merged, &mut report);
            info!(
                page_number,
                start_offset,
                end_offset,
                path = %record.extraction_path,
                score = record.quality_score,
                "record emitted"
            );
            report.records.push(record);
        }

        report
    }

    /// Enhanced extraction, scoring, and the legacy fallback when the score
    /// misses the threshold.
    fn extract_and_score(
        &mut self,
        merged: &MergedOccurrence,
        report: &mut PageReport,
    ) -> PublicationRecord {
        let enhanced = EnhancedExtractor::new(&self.patterns, self.config.tail_window);
        let mut record = enhanced.extract(&merged.text, &merged.source_pages);
        record.quality_score = self.penalized_score(&record, merged);
        record.unresolved_truncation = merged.penalized();

        if record.quality_score >= self.config.quality_threshold {
            return record;
        }

        report.fallbacks_taken += 1;
        debug!(
            page_number = merged.occurrence.page_number,
            start_offset = merged.occurrence.start_offset,
            score = record.quality_score,
            threshold = self.config.quality_threshold,
            "score below threshold, consulting legacy extractor"
        );

        // The legacy pass runs on the unmerged occurrence text, as a
        // single-page extractor would have seen it.
        let legacy = LegacyExtractor::new(&self.patterns);
        let mut candidate = legacy.extract(
            &merged.occurrence.raw_text,
            &[merged.occurrence.page_number],
        );
        candidate.quality_score = self.penalized_score(&candidate, merged);
        candidate.unresolved_truncation = merged.penalized();

        self.fallback.arbitrate(record, candidate)
    }

    fn penalized_score(&self, record: &PublicationRecord, merged: &MergedOccurrence) -> f32 {
        let score = self.scorer.score(record);
        if merged.penalized() {
            (score - self.config.truncation_penalty).clamp(0.0, 1.0)
        } else {
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPageSource;

    const ANCHOR_A: &str = "1234567-89.2024.8.26.0100";

    fn ctx() -> QueryContext {
        QueryContext::new("caderno-3", "precatorio")
    }

    fn pipeline(source: MockPageSource) -> ExtractionPipeline<MockPageSource> {
        ExtractionPipeline::new(source, EngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn empty_page_reports_nothing() {
        let mut pipeline = pipeline(MockPageSource::new());
        let report = pipeline.process_page(&ctx(), 1, "Expediente sem processos.").await;

        assert_eq!(report.occurrences_found, 0);
        assert!(report.records.is_empty());
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn complete_occurrence_needs_no_merge() {
        let mut pipeline = pipeline(MockPageSource::new());
        let text = format!(
            "Processo {ANCHOR_A} - MARIA LUIZA CAMPOS autor: \
             Valor principal bruto: R$ 1.500,50. Data de publicação: 12/03/2024. \
             ADV: CARLOS EDUARDO LIMA (OAB 123456/SP)"
        );

        let report = pipeline.process_page(&ctx(), 3, &text).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.merges_attempted, 0);
        let record = &report.records[0];
        assert_eq!(record.process_number.as_deref(), Some(ANCHOR_A));
        assert_eq!(record.source_page_numbers, vec![3]);
        assert!(!record.unresolved_truncation);
        assert!(record.quality_score >= 0.7);
    }

    #[tokio::test]
    async fn unresolved_truncation_penalizes_and_flags() {
        // Tail truncated, and the adjoining page fetch fails.
        let source = MockPageSource::new().fail_page(8);
        let mut pipeline = pipeline(source);
        let text = format!(
            "Processo {ANCHOR_A} - MARIA LUIZA CAMPOS autor: \
             Valor principal bruto: R$ 1.500,50. Data de publicação: 12/03/2024. \
             texto que termina no meio da"
        );

        let report = pipeline.process_page(&ctx(), 7, &text).await;

        assert_eq!(report.merges_attempted, 1);
        assert_eq!(report.merges_unresolved, 1);
        assert!(!report.is_clean());
        let record = &report.records[0];
        assert!(record.unresolved_truncation);
        // 0.8 raw (no lawyers) minus the 0.1 penalty.
        assert!((record.quality_score - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn construction_rejects_invalid_config() {
        let config = EngineConfig::new().with_cache_capacity(0);
        assert!(ExtractionPipeline::new(MockPageSource::new(), config).is_err());
    }

    #[tokio::test]
    async fn construction_rejects_bad_pattern() {
        let mut patterns = crate::types::PatternConfig::default();
        patterns.process_anchor = "([unclosed".to_string();
        let config = EngineConfig::new().with_patterns(patterns);

        assert!(ExtractionPipeline::new(MockPageSource::new(), config).is_err());
    }
}
