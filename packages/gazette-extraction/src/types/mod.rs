//! Data types of the engine.

pub mod config;
pub mod occurrence;
pub mod record;

pub use config::{CompiledPatterns, EngineConfig, PatternConfig, ScoreWeights};
pub use occurrence::Occurrence;
pub use record::{ExtractionPath, Lawyer, PublicationRecord};
