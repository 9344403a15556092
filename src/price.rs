//! Price text normalization
//!
//! Retailer pages render prices with Central-European conventions: comma as
//! the decimal separator and non-breaking (U+00A0) or narrow no-break
//! (U+202F) spaces as thousands separators. This module turns such text into
//! a plain `f64`, treating "no parseable number" and "zero" both as absence.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+[.,]?\d*)").expect("valid price regex"))
}

/// Parse localized price text into a numeric value.
///
/// Returns `None` for empty input, input without digits, or a parsed value of
/// exactly zero — a zero price on a product page means the real price was not
/// rendered, not that the product is free.
///
/// Only the first digit run is considered. Text like "4.5 / 5 (120 opinii)"
/// therefore yields 4.5; callers scoping the input to a price-bearing element
/// keep this from mattering in practice.
pub fn parse_price(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\u{00a0}' && *c != '\u{202f}')
        .collect();

    let m = price_regex().find(&cleaned)?;
    let value: f64 = m.as_str().replace(',', ".").parse().ok()?;

    if value == 0.0 { None } else { Some(value) }
}

/// Parse a price out of a JSON value.
///
/// JSON-LD offers carry prices as either numbers (`"price": 499.99`) or
/// strings (`"price": "499,99"`); both go through the same zero-is-absent
/// rule.
pub fn price_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => {
            let v = n.as_f64()?;
            if v == 0.0 { None } else { Some(v) }
        }
        Value::String(s) => parse_price(s),
        _ => None,
    }
}
