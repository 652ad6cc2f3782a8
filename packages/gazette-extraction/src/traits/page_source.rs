//! PageSource trait - the external input boundary.
//!
//! Raw page text comes from a browser-automation collaborator that renders
//! the gazette site and extracts visible text. This core only consumes that
//! text; it performs no network or DOM calls itself.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// Identifies one search session on the gazette site.
///
/// Page numbering is only meaningful relative to a query context: the same
/// page number under a different search term or edition date is a different
/// page. The context feeds cache keys, so forward and backward lookups of
/// the same page share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    /// Gazette section being searched (e.g. "caderno-3-judicial-1a-instancia")
    pub journal: String,

    /// Search term submitted to the site
    pub search_term: String,

    /// Edition date, if the search is scoped to one edition
    pub edition_date: Option<NaiveDate>,
}

impl QueryContext {
    /// Create a context for a journal and search term.
    pub fn new(journal: impl Into<String>, search_term: impl Into<String>) -> Self {
        Self {
            journal: journal.into(),
            search_term: search_term.into(),
            edition_date: None,
        }
    }

    /// Scope the context to a single edition date.
    pub fn with_edition_date(mut self, date: NaiveDate) -> Self {
        self.edition_date = Some(date);
        self
    }

    /// Stable string identity for cache keys and mocks.
    pub fn key_material(&self) -> String {
        match self.edition_date {
            Some(date) => format!("{}|{}|{}", self.journal, self.search_term, date),
            None => format!("{}|{}|", self.journal, self.search_term),
        }
    }
}

/// Supplier of raw page text for a query context.
///
/// Implementations live outside this crate (the browser-automation
/// collaborator). Fetching is the pipeline's only suspension point: it is
/// awaited cooperatively so independent page-processing tasks keep running.
///
/// # Errors
///
/// A fetch failure during merge resolution is a soft failure: the occurrence
/// proceeds unmerged, its truncation is marked unresolved, and its score is
/// penalized. It never propagates as a fatal error.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the text of one result page.
    async fn fetch_page(&self, ctx: &QueryContext, page_number: u32) -> FetchResult<String>;

    /// Source name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_material_distinguishes_contexts() {
        let a = QueryContext::new("caderno-3", "precatorio");
        let b = QueryContext::new("caderno-3", "alvara");
        let c = QueryContext::new("caderno-2", "precatorio");

        assert_ne!(a.key_material(), b.key_material());
        assert_ne!(a.key_material(), c.key_material());
        assert_eq!(a.key_material(), a.clone().key_material());
    }

    #[test]
    fn key_material_includes_edition_date() {
        let base = QueryContext::new("caderno-3", "precatorio");
        let dated = base
            .clone()
            .with_edition_date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());

        assert_ne!(base.key_material(), dated.key_material());
    }
}
