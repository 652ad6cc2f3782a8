//! Lawyer citation extraction via the ordered pattern cascade.
//!
//! The cascade runs over the full text and again over a trailing window,
//! because multi-lawyer lists are comma-separated at the end of a
//! publication and the loosest patterns only anchor reliably there.

use std::collections::HashSet;

use crate::types::{config::CompiledPatterns, Lawyer};

/// Extract lawyers from text.
///
/// `cascade_limit` restricts the cascade to its most specific entries (the
/// legacy extractor's single pass); `None` runs the full cascade.
/// `tail_window` additionally re-scans the trailing window in bytes.
/// Results are deduplicated by (name, OAB number).
pub(crate) fn extract_lawyers(
    patterns: &CompiledPatterns,
    text: &str,
    tail_window: Option<usize>,
    cascade_limit: Option<usize>,
) -> Vec<Lawyer> {
    let limit = cascade_limit.unwrap_or(patterns.lawyer_cascade.len());
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut lawyers = Vec::new();

    collect(patterns, limit, text, &mut seen, &mut lawyers);
    if let Some(window) = tail_window {
        let tail = tail_slice(text, window);
        if tail.len() < text.len() {
            collect(patterns, limit, tail, &mut seen, &mut lawyers);
        }
    }

    lawyers
}

fn collect(
    patterns: &CompiledPatterns,
    limit: usize,
    segment: &str,
    seen: &mut HashSet<(String, String)>,
    out: &mut Vec<Lawyer>,
) {
    for pattern in patterns.lawyer_cascade.iter().take(limit) {
        for caps in pattern.captures_iter(segment) {
            let (Some(name), Some(number)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let name = clean_name(name.as_str());
            if name.is_empty() {
                continue;
            }
            let mut lawyer = Lawyer::new(name, number.as_str());
            if let Some(state) = caps.get(3) {
                lawyer = lawyer.with_state(state.as_str());
            }
            if seen.insert(lawyer.dedup_key()) {
                out.push(lawyer);
            }
        }
    }
}

/// Collapse whitespace and strip list separators around a captured name.
fn clean_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .to_string()
}

fn tail_slice(text: &str, window: usize) -> &str {
    if text.len() <= window {
        return text;
    }
    let mut start = text.len() - window;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
