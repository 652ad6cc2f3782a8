//! Typed errors for the extraction engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while building or running the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Adjoining-page fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A configured pattern failed to compile
    #[error("invalid pattern `{name}`: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration rejected at construction
    #[error("invalid config: {reason}")]
    Config { reason: String },

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Errors reported by a [`PageSource`](crate::traits::PageSource)
/// implementation.
///
/// These are always soft failures from the pipeline's perspective: a merge
/// that cannot fetch its adjoining page proceeds unmerged with a penalty,
/// never aborts the page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The page could not be retrieved
    #[error("page {page_number} unavailable: {reason}")]
    Unavailable { page_number: u32, reason: String },

    /// Fetch timed out
    #[error("timeout fetching page {page_number}")]
    Timeout { page_number: u32 },

    /// The rendering session behind the source expired
    #[error("page source session expired")]
    SessionExpired,
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for page fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
