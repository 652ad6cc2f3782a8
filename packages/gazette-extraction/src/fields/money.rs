//! Monetary value normalization.
//!
//! All monetary fields are integer minor units (cents). Gazette text mixes
//! three representations for the same amount: Brazilian currency formatting
//! ("R$ 1.500,50"), decimal reais ("1500.50") and raw cent counts
//! ("150050"). All three normalize to the integer 150050.

use regex::Regex;
use tracing::debug;

/// Parse a monetary token into integer cents.
///
/// Rules, in order:
/// - a comma is the Brazilian decimal separator (dots are grouping);
/// - a single dot followed by one or two digits is a decimal point;
/// - dots in grouping positions mean whole reais;
/// - a bare digit string is already cents.
///
/// Returns `None` for anything unparsable or overflowing.
pub fn parse_money_cents(raw: &str) -> Option<i64> {
    let token: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let token = token.trim_matches(|c| c == '.' || c == ',');

    if token.is_empty() {
        return None;
    }

    if let Some(pos) = token.rfind(',') {
        let frac = &token[pos + 1..];
        if (1..=2).contains(&frac.len()) && frac.chars().all(|c| c.is_ascii_digit()) {
            let int_digits: String = token[..pos].chars().filter(char::is_ascii_digit).collect();
            return combine(&int_digits, frac);
        }
        // Comma in a grouping position: whole reais.
        let digits: String = token.chars().filter(char::is_ascii_digit).collect();
        return reais_to_cents(&digits);
    }

    if let Some(pos) = token.rfind('.') {
        let frac = &token[pos + 1..];
        let single_dot = token.matches('.').count() == 1;
        if single_dot && (1..=2).contains(&frac.len()) && frac.chars().all(|c| c.is_ascii_digit())
        {
            let int_digits: String = token[..pos].chars().filter(char::is_ascii_digit).collect();
            return combine(&int_digits, frac);
        }
        // Dots as thousands separators: whole reais.
        let digits: String = token.chars().filter(char::is_ascii_digit).collect();
        return reais_to_cents(&digits);
    }

    // No separators at all: the token is already minor units.
    token.parse::<i64>().ok()
}

fn combine(int_digits: &str, frac: &str) -> Option<i64> {
    let int: i64 = if int_digits.is_empty() {
        0
    } else {
        int_digits.parse().ok()?
    };
    let mut frac_val: i64 = frac.parse().ok()?;
    if frac.len() == 1 {
        frac_val *= 10;
    }
    int.checked_mul(100)?.checked_add(frac_val)
}

fn reais_to_cents(digits: &str) -> Option<i64> {
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()?.checked_mul(100)
}

/// Apply a label-anchored monetary pattern to text.
///
/// An unparsable token leaves the field absent; it never fails the record.
pub(crate) fn extract_money(pattern: &Regex, text: &str, label: &str) -> Option<i64> {
    let caps = pattern.captures(text)?;
    let token = caps.get(1)?.as_str();
    let parsed = parse_money_cents(token);
    if parsed.is_none() {
        debug!(label, token, "unparsable monetary token");
    }
    parsed
}
