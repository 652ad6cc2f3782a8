//! Label-anchored date extraction.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

/// Parse ISO ("2024-03-12") or Brazilian ("12/03/2024") dates.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Apply a label-anchored date pattern to text.
pub(crate) fn extract_date(pattern: &Regex, text: &str, label: &str) -> Option<NaiveDate> {
    let caps = pattern.captures(text)?;
    let token = caps.get(1)?.as_str();
    let parsed = parse_flexible_date(token);
    if parsed.is_none() {
        debug!(label, token, "unparsable date token");
    }
    parsed
}
