//! Bounded per-session page cache.
//!
//! Page text is render-session-dependent, so a cache is owned by exactly one
//! scraping worker and never shared. Keys hash the query context together
//! with the page number; a forward lookup of page N+1 and a later backward
//! lookup of the same page hit the same entry.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

use crate::traits::page_source::QueryContext;

/// A cached page.
#[derive(Debug, Clone)]
pub struct PageEntry {
    /// Key this entry is stored under
    pub cache_key: String,

    /// Result-page number within the query context
    pub page_number: u32,

    /// Raw page text
    pub content: String,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

/// Hit/miss counters for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate in [0, 1]; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f32 / total as f32
    }
}

/// Bounded FIFO cache of fetched page text.
#[derive(Debug)]
pub struct PageCache {
    capacity: usize,
    entries: HashMap<String, PageEntry>,
    order: VecDeque<String>,
    stats: CacheStats,
}

impl PageCache {
    /// Create a cache holding up to `capacity` pages.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Cache key for a (context, page) pair.
    pub fn key(ctx: &QueryContext, page_number: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ctx.key_material().as_bytes());
        hasher.update(page_number.to_be_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Look up a page, counting the hit or miss.
    pub fn get(&mut self, ctx: &QueryContext, page_number: u32) -> Option<&str> {
        let key = Self::key(ctx, page_number);
        if self.entries.contains_key(&key) {
            self.stats.hits += 1;
            self.entries.get(&key).map(|e| e.content.as_str())
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Store a page, evicting the oldest entry at capacity.
    pub fn put(&mut self, ctx: &QueryContext, page_number: u32, content: impl Into<String>) {
        let key = Self::key(ctx, page_number);

        if let Some(existing) = self.entries.get_mut(&key) {
            existing.content = content.into();
            existing.fetched_at = Utc::now();
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(
            key.clone(),
            PageEntry {
                cache_key: key,
                page_number,
                content: content.into(),
                fetched_at: Utc::now(),
            },
        );
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> QueryContext {
        QueryContext::new("caderno-3", "precatorio")
    }

    #[test]
    fn get_after_put_hits() {
        let mut cache = PageCache::new(10);
        cache.put(&ctx(), 4, "page four");

        assert_eq!(cache.get(&ctx(), 4), Some("page four"));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 0 });
    }

    #[test]
    fn miss_is_counted() {
        let mut cache = PageCache::new(10);
        assert_eq!(cache.get(&ctx(), 9), None);
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1 });
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }

    #[test]
    fn key_ignores_fetch_direction() {
        // Forward lookup (N+1 from page 3) and backward lookup (N-1 from
        // page 5) of page 4 must share the entry.
        assert_eq!(PageCache::key(&ctx(), 4), PageCache::key(&ctx(), 4));
        assert_ne!(PageCache::key(&ctx(), 4), PageCache::key(&ctx(), 5));
    }

    #[test]
    fn different_contexts_do_not_collide() {
        let mut cache = PageCache::new(10);
        cache.put(&ctx(), 4, "precatorio page");

        let other = QueryContext::new("caderno-3", "alvara");
        assert_eq!(cache.get(&other, 4), None);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut cache = PageCache::new(2);
        cache.put(&ctx(), 1, "one");
        cache.put(&ctx(), 2, "two");
        cache.put(&ctx(), 3, "three");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&ctx(), 1), None);
        assert_eq!(cache.get(&ctx(), 2), Some("two"));
        assert_eq!(cache.get(&ctx(), 3), Some("three"));
    }

    #[test]
    fn put_replaces_without_growing() {
        let mut cache = PageCache::new(2);
        cache.put(&ctx(), 1, "one");
        cache.put(&ctx(), 1, "one again");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&ctx(), 1), Some("one again"));
    }

    #[test]
    fn hit_rate_mixes_hits_and_misses() {
        let mut cache = PageCache::new(10);
        cache.put(&ctx(), 1, "one");
        cache.get(&ctx(), 1);
        cache.get(&ctx(), 2);

        assert!((cache.stats().hit_rate() - 0.5).abs() < f32::EPSILON);
    }
}
