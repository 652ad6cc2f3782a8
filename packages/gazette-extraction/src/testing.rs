//! Testing utilities including mock implementations.
//!
//! Useful for testing the pipeline without a real browser-automation
//! collaborator behind the page source.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::page_source::{PageSource, QueryContext};

/// A mock page source with canned pages and failure injection.
///
/// Clones share state, so tests can keep a handle for assertions while the
/// pipeline owns the source.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = QueryContext::new("caderno-3", "precatorio");
/// let source = MockPageSource::new()
///     .with_page(&ctx, 4, "texto da página quatro")
///     .fail_page(9);
/// let handle = source.clone();
/// // ... run the pipeline, then:
/// assert_eq!(handle.fetch_call_count(), 1);
/// ```
#[derive(Default)]
pub struct MockPageSource {
    /// Canned pages keyed by (context identity, page number)
    pages: Arc<RwLock<HashMap<(String, u32), String>>>,

    /// Page numbers that fail on fetch
    fail_pages: Arc<RwLock<HashSet<u32>>>,

    /// Fetches made, in order
    calls: Arc<RwLock<Vec<(String, u32)>>>,
}

impl MockPageSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned page (builder pattern).
    pub fn with_page(self, ctx: &QueryContext, page_number: u32, content: &str) -> Self {
        self.add_page(ctx, page_number, content);
        self
    }

    /// Mark a page number as failing (builder pattern).
    pub fn fail_page(self, page_number: u32) -> Self {
        self.fail_pages.write().unwrap().insert(page_number);
        self
    }

    /// Add a canned page.
    pub fn add_page(&self, ctx: &QueryContext, page_number: u32, content: &str) {
        self.pages
            .write()
            .unwrap()
            .insert((ctx.key_material(), page_number), content.to_string());
    }

    /// Number of fetches made against this source.
    pub fn fetch_call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Page numbers fetched, in order.
    pub fn fetched_pages(&self) -> Vec<u32> {
        self.calls.read().unwrap().iter().map(|(_, p)| *p).collect()
    }

    /// Clear recorded calls.
    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

impl Clone for MockPageSource {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            fail_pages: Arc::clone(&self.fail_pages),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn fetch_page(&self, ctx: &QueryContext, page_number: u32) -> FetchResult<String> {
        self.calls
            .write()
            .unwrap()
            .push((ctx.key_material(), page_number));

        if self.fail_pages.read().unwrap().contains(&page_number) {
            return Err(FetchError::Unavailable {
                page_number,
                reason: "injected failure".to_string(),
            });
        }

        self.pages
            .read()
            .unwrap()
            .get(&(ctx.key_material(), page_number))
            .cloned()
            .ok_or_else(|| FetchError::Unavailable {
                page_number,
                reason: "no such page".to_string(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> QueryContext {
        QueryContext::new("caderno-3", "precatorio")
    }

    #[tokio::test]
    async fn returns_canned_page() {
        let source = MockPageSource::new().with_page(&ctx(), 4, "página quatro");

        let content = source.fetch_page(&ctx(), 4).await.unwrap();
        assert_eq!(content, "página quatro");
        assert_eq!(source.fetch_call_count(), 1);
        assert_eq!(source.fetched_pages(), vec![4]);
    }

    #[tokio::test]
    async fn missing_page_errors() {
        let source = MockPageSource::new();
        assert!(source.fetch_page(&ctx(), 1).await.is_err());
    }

    #[tokio::test]
    async fn injected_failure_errors() {
        let source = MockPageSource::new()
            .with_page(&ctx(), 9, "existe")
            .fail_page(9);

        let err = source.fetch_page(&ctx(), 9).await.unwrap_err();
        assert!(err.to_string().contains("page 9"));
    }

    #[tokio::test]
    async fn pages_are_scoped_by_context() {
        let source = MockPageSource::new().with_page(&ctx(), 4, "precatorio");

        let other = QueryContext::new("caderno-3", "alvara");
        assert!(source.fetch_page(&other, 4).await.is_err());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let source = MockPageSource::new();
        let handle = source.clone();

        source.add_page(&ctx(), 2, "dois");
        handle.fetch_page(&ctx(), 2).await.unwrap();

        assert_eq!(source.fetch_call_count(), 1);
    }
}
