//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Fallback swatch color for names with no known mapping.
const SWATCH_FALLBACK: &str = "#9ca3af";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a price as a dollar string, e.g. `29.5` becomes `$29.50`.
///
/// Usage in templates: `{{ product.price|price }}`
#[askama::filter_fn]
pub fn price(amount: &f64, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_price(*amount))
}

/// Maps a product color name to a CSS hex value for its swatch.
///
/// Usage in templates: `{{ color|swatch }}`
#[askama::filter_fn]
pub fn swatch(name: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(swatch_hex(&name.to_string()))
}

/// Format an amount as a dollar price string.
#[must_use]
pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Matching is case-insensitive and unknown names fall back to a neutral
/// gray, so every color option renders a swatch.
fn swatch_hex(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "white" => "#ffffff",
        "black" => "#000000",
        "blue" => "#3b82f6",
        "navy" => "#1e3a8a",
        "gray" | "grey" => "#6b7280",
        "red" => "#ef4444",
        "green" | "olive" => "#22c55e",
        "beige" | "khaki" | "sand" => "#d4c5a9",
        "cream" => "#f5f5dc",
        _ => SWATCH_FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_two_decimals() {
        assert_eq!(format_price(29.5), "$29.50");
        assert_eq!(format_price(100.0), "$100.00");
        assert_eq!(format_price(9.999), "$10.00");
        assert_eq!(format_price(0.0), "$0.00");
    }

    #[test]
    fn test_swatch_known_colors() {
        assert_eq!(swatch_hex("navy"), "#1e3a8a");
        assert_eq!(swatch_hex("Black"), "#000000");
        assert_eq!(swatch_hex("GREY"), "#6b7280");
        assert_eq!(swatch_hex("gray"), "#6b7280");
        assert_eq!(swatch_hex("khaki"), "#d4c5a9");
    }

    #[test]
    fn test_swatch_unknown_falls_back() {
        assert_eq!(swatch_hex("chartreuse"), SWATCH_FALLBACK);
        assert_eq!(swatch_hex(""), SWATCH_FALLBACK);
    }
}
