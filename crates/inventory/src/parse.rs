//! Lenient numeric parsing for values that arrive as display strings.
//!
//! None of these fail: callers pick the fallback that fits the column.

/// Parse the leading integer of `input`.
///
/// Leading whitespace and a single sign are accepted; parsing stops at the
/// first non-digit. `"12/5"` → 12, `" 7 pairs"` → 7, `"abc"` → `None`.
/// Values beyond `i64` saturate.
pub fn leading_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first().copied() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let magnitude = rest[..digits].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    Some(if negative { -magnitude } else { magnitude })
}

/// Listed quantity from a `qty` column value.
///
/// Only the part before `/` counts; anything unparsable counts as 0.
pub fn listed_quantity(qty: &str) -> i64 {
    let head = qty.split('/').next().unwrap_or_default();
    leading_int(head).unwrap_or(0)
}

/// ROI percentage from strings like `"12%"`.
///
/// A single trailing `%` is stripped. Non-finite or unparsable values yield
/// `None` so they never reach a min/max fold.
pub fn roi_percent(roi: &str) -> Option<f64> {
    let trimmed = roi.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Dollar amount from a decimal string, tolerating a `$` prefix and
/// thousands separators (`"$1,095.00"`).
pub fn dollars(amount: &str) -> Option<f64> {
    let cleaned: String = amount
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Dollar amount from an integer-cents string (`"15800"` → 158.0).
pub fn cents_to_dollars(cents: &str) -> Option<f64> {
    cents.trim().parse::<i64>().ok().map(|c| c as f64 / 100.0)
}

/// Numeric shoe size from labels like `"9"`, `"US 9.5"` or `"US M 9.5"`.
pub fn shoe_size(size: &str) -> Option<f64> {
    size.trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// `$116`, or `$116.50` when there are cents.
pub fn format_price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("${amount:.0}")
    } else {
        format!("${amount:.2}")
    }
}

/// `12%`, or `12.5%` when fractional.
pub fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}%")
    } else {
        format!("{value}%")
    }
}
