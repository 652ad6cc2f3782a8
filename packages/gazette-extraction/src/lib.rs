//! Gazette Publication Extraction Engine
//!
//! Extraction-and-merge engine for paginated legal-gazette text (DJE). Court
//! publications are rendered as contiguous text with no delimiters, and a
//! publication regularly runs off the bottom of one result page onto the
//! next. This crate scans pages for publication occurrences, detects
//! truncation at page boundaries, pulls adjoining pages to complete the
//! text, extracts typed fields through regex cascades, scores completeness,
//! and falls back to a simpler extractor when quality is low.
//!
//! # Design
//!
//! - Every occurrence emits a record; low quality degrades the score, it
//!   never drops a publication
//! - Monetary values are integer cents, dates are typed, optionality is
//!   explicit
//! - One merge hop per direction, validated before the splice is trusted
//! - Page fetching is behind the [`PageSource`] trait; the engine never
//!   talks to a browser or network directly
//!
//! # Usage
//!
//! ```rust,ignore
//! use gazette_extraction::{EngineConfig, ExtractionPipeline, QueryContext};
//!
//! let mut pipeline = ExtractionPipeline::new(source, EngineConfig::default())?;
//! let ctx = QueryContext::new("caderno-3", "precatorio");
//!
//! let report = pipeline.process_page(&ctx, page_number, &page_text).await;
//! for record in &report.records {
//!     println!("{:?} (score {})", record.process_number, record.quality_score);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (PageSource, Extractor)
//! - [`types`] - Config, occurrences, and the publication record
//! - [`scanner`] - Occurrence detection within one page
//! - [`merger`] - Cross-page truncation resolution
//! - [`fields`] - Field extraction cascades (lawyers, money, dates)
//! - [`scorer`] - Completeness scoring
//! - [`pipeline`] - Per-page orchestration and the quality fallback
//! - [`cache`] - Bounded FIFO page cache
//! - [`testing`] - Mock implementations for testing

pub mod cache;
pub mod error;
pub mod fields;
pub mod merger;
pub mod pipeline;
pub mod scanner;
pub mod scorer;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractError, FetchError, FetchResult, Result};
pub use traits::{
    extractor::{EnhancedExtractor, Extractor, LegacyExtractor},
    page_source::{PageSource, QueryContext},
};
pub use types::{
    config::{CompiledPatterns, EngineConfig, PatternConfig, ScoreWeights},
    occurrence::Occurrence,
    record::{ExtractionPath, Lawyer, PublicationRecord},
};

// Re-export pipeline components
pub use pipeline::{ExtractionPipeline, FallbackAdapter, FallbackStats, PageReport};

// Re-export merge and scoring machinery
pub use cache::{CacheStats, PageCache};
pub use fields::{parse_flexible_date, parse_money_cents};
pub use merger::{ContentMerger, MergeStatus, MergedOccurrence};
pub use scanner::BoundaryScanner;
pub use scorer::QualityScorer;

// Re-export testing utilities
pub use testing::MockPageSource;
