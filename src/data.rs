//! Cell-level coercion shared by the mapper and the analyzer.
//!
//! Every value in a [`Dataset`](crate::dataset::Dataset) is stored as text.
//! The helpers here turn those cells into numbers and timestamps on demand,
//! treating anything that does not parse as missing rather than as an error.

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '﷼'];

/// Slash dates read month-first; day-first is tried only when that fails.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%b %d, %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Returns `true` for tokens that spreadsheets and exports use to mean "no value".
pub fn is_placeholder_token(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    let stripped = lowered.trim_start_matches('#');
    matches!(
        stripped,
        "na" | "n/a" | "n.a." | "nan" | "null" | "none" | "nil" | "missing"
    ) || (!stripped.is_empty() && stripped.chars().all(|c| c == '-'))
}

/// Normalizes a raw cell into `None` when it is blank or a missing-value placeholder.
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_placeholder_token(trimmed) {
        None
    } else {
        Some(raw.to_string())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses a date or a datetime cell; plain dates land on midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = parse_naive_date(value) {
        return Some(date.and_time(NaiveTime::MIN));
    }
    parse_naive_datetime(value).ok()
}

/// Best-effort numeric coercion. Returns `None` for anything that is not a finite number.
///
/// Accepts surrounding whitespace, a single leading currency symbol, `,` thousands
/// separators and accounting-style parentheses for negatives.
pub fn coerce_numeric(value: &str) -> Option<f64> {
    let mut body = value.trim();
    if body.is_empty() {
        return None;
    }

    let mut negative = false;
    if body.starts_with('(') && body.ends_with(')') && body.len() > 2 {
        negative = true;
        body = body[1..body.len() - 1].trim();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix(CURRENCY_SYMBOLS) {
        body = rest.trim_start();
    } else if let Some(rest) = body.strip_suffix(CURRENCY_SYMBOLS) {
        body = rest.trim_end();
    }
    if body.is_empty() {
        return None;
    }

    let cleaned = if body.contains(',') {
        if !has_valid_grouping(body) {
            return None;
        }
        body.replace(',', "")
    } else {
        body.to_string()
    };

    let parsed: f64 = cleaned.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

fn has_valid_grouping(body: &str) -> bool {
    let integer_part = body.split('.').next().unwrap_or_default();
    let mut groups = integer_part.split(',');
    let Some(first) = groups.next() else {
        return false;
    };
    if first.is_empty() || first.len() > 3 {
        return false;
    }
    groups.all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()))
}

/// Renders a coerced number back to text without a trailing `.0` for whole values.
pub fn canonical_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_tokens_are_missing() {
        assert!(is_placeholder_token("NA"));
        assert!(is_placeholder_token(" n/a "));
        assert!(is_placeholder_token("#NULL"));
        assert!(is_placeholder_token("---"));
        assert!(!is_placeholder_token("nairobi"));
        assert_eq!(normalize_cell("   "), None);
        assert_eq!(normalize_cell("East"), Some("East".to_string()));
    }

    #[test]
    fn coerce_numeric_handles_currency_and_grouping() {
        assert_eq!(coerce_numeric("1,234.50"), Some(1234.5));
        assert_eq!(coerce_numeric("$99"), Some(99.0));
        assert_eq!(coerce_numeric("(12.5)"), Some(-12.5));
        assert_eq!(coerce_numeric("-50"), Some(-50.0));
        assert_eq!(coerce_numeric(" 7 "), Some(7.0));
        assert_eq!(coerce_numeric("12,34"), None);
        assert_eq!(coerce_numeric("abc"), None);
        assert_eq!(coerce_numeric("inf"), None);
        assert_eq!(coerce_numeric(""), None);
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("05/06/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
        assert!(parse_naive_date("next tuesday").is_err());
    }

    #[test]
    fn ambiguous_slash_dates_read_month_first() {
        let march = parse_naive_date("03/04/2024").unwrap();
        assert_eq!(march, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        let christmas = parse_naive_date("25/12/2024").unwrap();
        assert_eq!(christmas, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        let stamp = parse_timestamp("07/01/2024 08:00").unwrap();
        assert_eq!(stamp.to_string(), "2024-07-01 08:00:00");
    }

    #[test]
    fn parse_timestamp_accepts_dates_and_datetimes() {
        let midnight = parse_timestamp("2024-05-06").unwrap();
        assert_eq!(midnight.to_string(), "2024-05-06 00:00:00");
        let afternoon = parse_timestamp("2024-05-06T14:30:00").unwrap();
        assert_eq!(afternoon.to_string(), "2024-05-06 14:30:00");
        assert!(parse_timestamp("1500").is_none());
    }

    #[test]
    fn canonical_number_drops_trailing_zero_fraction() {
        assert_eq!(canonical_number(250.0), "250");
        assert_eq!(canonical_number(12.5), "12.5");
    }
}
