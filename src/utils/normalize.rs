//! Normalization of locale-formatted amounts and free-text labels

use bigdecimal::BigDecimal;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?").expect("valid regex"));

/// Parse a currency string in either `1.234,56` or `1234.56` convention.
///
/// Never fails: anything without a parseable leading number yields zero.
/// The sign is kept, so callers that need non-negative values must filter.
pub fn parse_amount(raw: &str) -> BigDecimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let mut canonical = canonical_decimal(&cleaned);
    // ",50" and "-,50" carry no integer digits
    if canonical.starts_with('.') {
        canonical.insert(0, '0');
    } else if canonical.starts_with("-.") {
        canonical.insert(1, '0');
    }

    LEADING_NUMBER
        .find(&canonical)
        .and_then(|m| BigDecimal::from_str(m.as_str()).ok())
        .unwrap_or_else(|| BigDecimal::from(0))
}

/// Rewrite separators so the only remaining one is a `.` decimal point.
fn canonical_decimal(cleaned: &str) -> String {
    let decimal_separator = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) => Some(if comma > dot { ',' } else { '.' }),
        (Some(_), None) => (cleaned.matches(',').count() == 1).then_some(','),
        (None, Some(dot)) => {
            let fraction_digits = cleaned[dot + 1..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .count();
            // "1.234" reads as a pt-BR thousands group
            (cleaned.matches('.').count() == 1 && fraction_digits != 3).then_some('.')
        }
        (None, None) => None,
    };

    cleaned
        .chars()
        .filter_map(|c| match c {
            ',' | '.' if Some(c) == decimal_separator => Some('.'),
            ',' | '.' => None,
            _ => Some(c),
        })
        .collect()
}

/// Uppercase, trim and collapse internal whitespace runs to one space
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
