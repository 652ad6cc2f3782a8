//! Trait seams of the engine.
//!
//! - [`page_source`] - the external input boundary (browser-automation
//!   collaborator renders pages; this core never touches network or DOM)
//! - [`extractor`] - the polymorphic extractor capability (enhanced vs
//!   legacy), selected by the orchestrator based on measured score

pub mod extractor;
pub mod page_source;

pub use extractor::{EnhancedExtractor, Extractor, LegacyExtractor};
pub use page_source::{PageSource, QueryContext};
