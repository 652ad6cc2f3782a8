//! Content merger - resolves truncation across page boundaries.
//!
//! A truncated occurrence pulls at most one adjoining page in each
//! direction: the next page's prefix for a missing tail, the previous
//! page's suffix for a missing head. Splices are validated before they are
//! trusted; an invalid splice keeps the original occurrence and flags it
//! for a score penalty downstream.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheStats, PageCache};
use crate::traits::page_source::{PageSource, QueryContext};
use crate::types::{config::CompiledPatterns, Occurrence};

/// How merge resolution ended for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    /// Occurrence was not truncated; text returned unchanged
    NotNeeded,

    /// Adjoining content spliced and validated
    Merged,

    /// Splice failed validation (zero or multiple anchors, or no lawyer
    /// marker); original occurrence kept
    Rejected,

    /// Adjoining page unavailable (fetch failure, first/last page, or
    /// cancellation); original occurrence kept
    Unresolved,
}

/// An occurrence after merge resolution.
#[derive(Debug, Clone)]
pub struct MergedOccurrence {
    /// The original occurrence, untouched
    pub occurrence: Occurrence,

    /// Text to extract from (spliced on `Merged`, original otherwise)
    pub text: String,

    /// Pages contributing to `text`, in reading order
    pub source_pages: Vec<u32>,

    /// Resolution outcome
    pub status: MergeStatus,
}

impl MergedOccurrence {
    /// Whether the downstream score should be penalized.
    pub fn penalized(&self) -> bool {
        matches!(self.status, MergeStatus::Rejected | MergeStatus::Unresolved)
    }

    fn kept(occurrence: Occurrence, status: MergeStatus) -> Self {
        Self {
            text: occurrence.raw_text.clone(),
            source_pages: vec![occurrence.page_number],
            status,
            occurrence,
        }
    }
}

enum Adjoin {
    Page(String),
    Unavailable,
    Cancelled,
}

/// Resolves truncated occurrences against adjoining pages.
///
/// Owns the per-session [`PageCache`]; one merger per scraping worker.
pub struct ContentMerger<S: PageSource> {
    source: S,
    cache: PageCache,
    safety_budget: usize,
    cancel: CancellationToken,
}

impl<S: PageSource> ContentMerger<S> {
    /// Create a merger over a page source.
    pub fn new(
        source: S,
        cache_capacity: usize,
        safety_budget: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            cache: PageCache::new(cache_capacity),
            safety_budget,
            cancel,
        }
    }

    /// Cache counters, for observability.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolve one occurrence.
    ///
    /// Merging a non-truncated occurrence is a no-op returning the original
    /// text unchanged. Fetch failures are soft: the occurrence proceeds
    /// unmerged with [`MergeStatus::Unresolved`].
    pub async fn resolve(
        &mut self,
        ctx: &QueryContext,
        occurrence: Occurrence,
        patterns: &CompiledPatterns,
    ) -> MergedOccurrence {
        if !occurrence.is_truncated() {
            return MergedOccurrence::kept(occurrence, MergeStatus::NotNeeded);
        }

        let mut text = occurrence.raw_text.clone();
        let mut pages = vec![occurrence.page_number];

        // One hop forward: complete a missing tail from page N+1.
        if occurrence.tail_truncated {
            let next_page = occurrence.page_number + 1;
            match self.adjoining(ctx, next_page).await {
                Adjoin::Page(next) => {
                    // Cut before the next page's first anchor so the splice
                    // cannot swallow a second publication.
                    let prefix = match patterns.anchor.find(&next) {
                        Some(m) => &next[..m.start()],
                        None => prefix_within(&next, self.safety_budget),
                    };
                    text.push_str(prefix);
                    pages.push(next_page);
                }
                Adjoin::Unavailable | Adjoin::Cancelled => {
                    warn!(
                        page_number = occurrence.page_number,
                        start_offset = occurrence.start_offset,
                        end_offset = occurrence.end_offset,
                        "tail truncation left unresolved"
                    );
                    return MergedOccurrence::kept(occurrence, MergeStatus::Unresolved);
                }
            }
        }

        // One hop backward: complete a missing head from page N-1.
        if occurrence.head_truncated {
            let Some(prev_page) = previous_page(occurrence.page_number) else {
                warn!(
                    page_number = occurrence.page_number,
                    "head truncation on first page left unresolved"
                );
                return MergedOccurrence::kept(occurrence, MergeStatus::Unresolved);
            };
            match self.adjoining(ctx, prev_page).await {
                Adjoin::Page(prev) => {
                    // Everything after the previous page's last citation
                    // belongs to the publication that spilled over.
                    let suffix = match patterns.lawyer_marker.find_iter(&prev).last() {
                        Some(m) => &prev[m.end()..],
                        None => suffix_within(&prev, self.safety_budget),
                    };
                    text = format!("{}{}", suffix, text);
                    pages.insert(0, prev_page);
                }
                Adjoin::Unavailable | Adjoin::Cancelled => {
                    warn!(
                        page_number = occurrence.page_number,
                        start_offset = occurrence.start_offset,
                        end_offset = occurrence.end_offset,
                        "head truncation left unresolved"
                    );
                    return MergedOccurrence::kept(occurrence, MergeStatus::Unresolved);
                }
            }
        }

        // A valid splice holds exactly one publication: one anchor, and a
        // terminal lawyer citation somewhere in the text.
        let anchor_count = patterns.anchor.find_iter(&text).count();
        let has_marker = patterns.lawyer_marker.is_match(&text);
        if anchor_count == 1 && has_marker {
            debug!(
                page_number = occurrence.page_number,
                start_offset = occurrence.start_offset,
                merged_pages = ?pages,
                "merge accepted"
            );
            MergedOccurrence {
                occurrence,
                text,
                source_pages: pages,
                status: MergeStatus::Merged,
            }
        } else {
            warn!(
                page_number = occurrence.page_number,
                start_offset = occurrence.start_offset,
                end_offset = occurrence.end_offset,
                anchor_count,
                has_marker,
                "merge rejected, keeping unmerged occurrence"
            );
            MergedOccurrence::kept(occurrence, MergeStatus::Rejected)
        }
    }

    /// Fetch an adjoining page, cache first. Cancellation abandons the
    /// in-flight fetch promptly.
    async fn adjoining(&mut self, ctx: &QueryContext, page_number: u32) -> Adjoin {
        if let Some(content) = self.cache.get(ctx, page_number) {
            return Adjoin::Page(content.to_string());
        }
        if self.cancel.is_cancelled() {
            return Adjoin::Cancelled;
        }

        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => return Adjoin::Cancelled,
            result = self.source.fetch_page(ctx, page_number) => result,
        };

        match fetched {
            Ok(content) => {
                self.cache.put(ctx, page_number, content.clone());
                Adjoin::Page(content)
            }
            Err(e) => {
                warn!(page_number, source = self.source.name(), error = %e, "adjoining page fetch failed");
                Adjoin::Unavailable
            }
        }
    }
}

/// Result pages are 1-based; page 1 has no predecessor.
fn previous_page(page_number: u32) -> Option<u32> {
    if page_number > 1 {
        Some(page_number - 1)
    } else {
        None
    }
}

/// At most `budget` bytes from the start, cut on a char boundary.
fn prefix_within(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// At most `budget` bytes from the end, cut on a char boundary.
fn suffix_within(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut start = text.len() - budget;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPageSource;
    use crate::types::PatternConfig;

    const ANCHOR_A: &str = "1234567-89.2024.8.26.0100";
    const ANCHOR_B: &str = "7654321-12.2023.8.26.0053";

    fn patterns() -> CompiledPatterns {
        PatternConfig::default().compile().unwrap()
    }

    fn ctx() -> QueryContext {
        QueryContext::new("caderno-3", "precatorio")
    }

    fn merger(source: MockPageSource) -> ContentMerger<MockPageSource> {
        ContentMerger::new(source, 50, 3000, CancellationToken::new())
    }

    fn tail_truncated(page_number: u32, raw: &str) -> Occurrence {
        Occurrence {
            start_offset: 0,
            end_offset: raw.len(),
            raw_text: raw.to_string(),
            page_number,
            head_truncated: false,
            tail_truncated: true,
        }
    }

    fn head_truncated(page_number: u32, raw: &str) -> Occurrence {
        Occurrence {
            start_offset: 0,
            end_offset: raw.len(),
            raw_text: raw.to_string(),
            page_number,
            head_truncated: true,
            tail_truncated: false,
        }
    }

    #[tokio::test]
    async fn non_truncated_resolve_is_identity() {
        let source = MockPageSource::new();
        let handle = source.clone();
        let mut merger = merger(source);

        let raw = format!("Processo {ANCHOR_A} - texto. ADV: JOAO LIMA (OAB 111/SP)");
        let occurrence = Occurrence {
            start_offset: 0,
            end_offset: raw.len(),
            raw_text: raw.clone(),
            page_number: 7,
            head_truncated: false,
            tail_truncated: false,
        };

        let merged = merger.resolve(&ctx(), occurrence, &patterns()).await;
        assert_eq!(merged.status, MergeStatus::NotNeeded);
        assert_eq!(merged.text, raw);
        assert_eq!(merged.source_pages, vec![7]);
        assert_eq!(handle.fetch_call_count(), 0);
    }

    #[tokio::test]
    async fn tail_merge_takes_prefix_up_to_next_anchor() {
        let next = format!(
            "final da sentença. ADV: NOME COMPLETO (OAB 123456/SP) Processo {ANCHOR_B} - outro processo"
        );
        let source = MockPageSource::new().with_page(&ctx(), 8, &next);
        let mut merger = merger(source);

        let raw = format!("Processo {ANCHOR_A} - texto cortado no meio da");
        let merged = merger
            .resolve(&ctx(), tail_truncated(7, &raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Merged);
        assert_eq!(merged.source_pages, vec![7, 8]);
        assert!(merged.text.contains("NOME COMPLETO"));
        assert!(!merged.text.contains(ANCHOR_B));
    }

    #[tokio::test]
    async fn tail_merge_without_marker_is_rejected() {
        // Next page's prefix never reaches a citation: invalid splice.
        let next = format!("ainda sem advogado nenhum aqui Processo {ANCHOR_B} - outro");
        let source = MockPageSource::new().with_page(&ctx(), 8, &next);
        let mut merger = merger(source);

        let raw = format!("Processo {ANCHOR_A} - texto cortado");
        let merged = merger
            .resolve(&ctx(), tail_truncated(7, &raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Rejected);
        assert_eq!(merged.text, raw);
        assert_eq!(merged.source_pages, vec![7]);
        assert!(merged.penalized());
    }

    #[tokio::test]
    async fn fetch_failure_is_soft() {
        let source = MockPageSource::new().fail_page(8);
        let mut merger = merger(source);

        let raw = format!("Processo {ANCHOR_A} - texto cortado");
        let merged = merger
            .resolve(&ctx(), tail_truncated(7, &raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Unresolved);
        assert_eq!(merged.text, raw);
        assert!(merged.penalized());
    }

    #[tokio::test]
    async fn head_merge_prepends_suffix_after_last_marker() {
        let prev = format!(
            "Processo {ANCHOR_B} - encerrado. ADV: OUTRA PESSOA (OAB 999/SP) Processo {ANCHOR_A} - começo do despacho que continua"
        );
        let source = MockPageSource::new().with_page(&ctx(), 7, &prev);
        let mut merger = merger(source);

        let raw = "MARCIO SILVA COELHO (OAB 45683/SP), ANA REIS (OAB 222/SP)";
        let merged = merger
            .resolve(&ctx(), head_truncated(8, raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Merged);
        assert_eq!(merged.source_pages, vec![7, 8]);
        assert!(merged.text.contains(ANCHOR_A));
        assert!(!merged.text.contains(ANCHOR_B));
        assert!(merged.text.ends_with(raw));
    }

    #[tokio::test]
    async fn head_merge_without_anchor_is_rejected() {
        // Previous page carries no citation, so the fallback suffix has no
        // anchor either: zero anchors after splice.
        let prev = "página anterior inteira sem processo algum".to_string();
        let source = MockPageSource::new().with_page(&ctx(), 7, &prev);
        let mut merger = merger(source);

        let raw = "MARCIO SILVA COELHO (OAB 45683/SP)";
        let merged = merger
            .resolve(&ctx(), head_truncated(8, raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Rejected);
        assert_eq!(merged.text, raw);
    }

    #[tokio::test]
    async fn head_merge_on_first_page_is_unresolved() {
        let source = MockPageSource::new();
        let handle = source.clone();
        let mut merger = merger(source);

        let raw = "MARCIO SILVA COELHO (OAB 45683/SP)";
        let merged = merger
            .resolve(&ctx(), head_truncated(1, raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Unresolved);
        assert_eq!(handle.fetch_call_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_abandons_the_fetch() {
        let source = MockPageSource::new().with_page(&ctx(), 8, "conteúdo");
        let handle = source.clone();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut merger = ContentMerger::new(source, 50, 3000, cancel);

        let raw = format!("Processo {ANCHOR_A} - texto cortado");
        let merged = merger
            .resolve(&ctx(), tail_truncated(7, &raw), &patterns())
            .await;

        assert_eq!(merged.status, MergeStatus::Unresolved);
        assert_eq!(handle.fetch_call_count(), 0);
    }

    #[tokio::test]
    async fn second_resolve_hits_the_cache() {
        let next = format!("restante. ADV: NOME COMPLETO (OAB 123456/SP) Processo {ANCHOR_B} x");
        let source = MockPageSource::new().with_page(&ctx(), 8, &next);
        let handle = source.clone();
        let mut merger = merger(source);

        let raw = format!("Processo {ANCHOR_A} - texto cortado");
        merger
            .resolve(&ctx(), tail_truncated(7, &raw), &patterns())
            .await;
        merger
            .resolve(&ctx(), tail_truncated(7, &raw), &patterns())
            .await;

        assert_eq!(handle.fetch_call_count(), 1);
        assert_eq!(merger.cache_stats().hits, 1);
        assert_eq!(merger.cache_stats().misses, 1);
    }

    #[test]
    fn budget_cuts_respect_char_boundaries() {
        let text = "ação";
        // Byte 2 falls inside 'ç'; both helpers must back off to a boundary.
        assert_eq!(prefix_within(text, 2), "a");
        assert!(suffix_within(text, 2).is_char_boundary(0));
        assert_eq!(prefix_within(text, 100), text);
        assert_eq!(suffix_within(text, 100), text);
    }
}
