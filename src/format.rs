//! Display formatting for KPI cards, insights and reports.

const NOT_AVAILABLE: &str = "N/A";

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats `value` with `decimals` places and `,` thousands separators.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rendered = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };
    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// Whole-dollar currency, e.g. `$1,235` or `-$50`.
pub fn format_currency(value: f64) -> String {
    let grouped = format_grouped(value, 0);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None if grouped == NOT_AVAILABLE => grouped,
        None => format!("${grouped}"),
    }
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}%", format_grouped(value, 1))
}

pub fn format_decimal(value: f64) -> String {
    format_grouped(value, 1)
}

/// Unit counts: whole numbers without a fraction, otherwise up to two places.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        return format_grouped(value, 0);
    }
    let rendered = format_grouped(value, 2);
    rendered.trim_end_matches('0').trim_end_matches('.').to_string()
}
