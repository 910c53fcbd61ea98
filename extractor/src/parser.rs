use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").expect("static regex"));

/// Converts a display figure such as `$20.39`, `1,234.5`, `1.5K` or `2.3M`
/// into a number.
///
/// Returns `None` for empty input, input with no digits, or digit runs that
/// are not a valid float (e.g. `1.2.3`).
pub fn parse_value(text: &str) -> Option<f64> {
    let cleaned = text.replace(['$', ','], "");
    let mut body = cleaned.trim();
    if body.is_empty() {
        return None;
    }

    let multiplier = match body.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => 1e3,
        Some('M') => 1e6,
        Some('B') => 1e9,
        _ => 1.0,
    };
    if multiplier != 1.0 {
        body = &body[..body.len() - 1];
    }

    let digits = NUMBER.find(body)?;
    digits.as_str().parse::<f64>().ok().map(|v| v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_currency_values() {
        assert_eq!(parse_value("$20.39"), Some(20.39));
        assert_eq!(parse_value("  42 "), Some(42.0));
        assert_eq!(parse_value("$1,234,567.89"), Some(1_234_567.89));
        assert_eq!(parse_value("20.40 satUSD-v1"), Some(20.40));
    }

    #[test]
    fn suffixes_are_case_insensitive() {
        assert_eq!(parse_value("1.5K"), Some(1500.0));
        assert_eq!(parse_value("1.5k"), Some(1500.0));
        assert_eq!(parse_value("2.3M"), Some(2_300_000.0));
        assert_eq!(parse_value("$4b"), Some(4_000_000_000.0));
    }

    #[test]
    fn unparseable_input_is_none() {
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("   "), None);
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value("$"), None);
        assert_eq!(parse_value("K"), None);
        assert_eq!(parse_value("1.2.3"), None);
        assert_eq!(parse_value("."), None);
    }
}
