//! Display formatting helpers.
//!
//! All helpers use fixed grouping and decimal rules (comma thousands,
//! dot decimal point) so the output never depends on the host locale.
//! Every function is total: non-finite input renders as zero, numbers
//! too large for the chosen notation switch to exponent form (`1.8e308`),
//! and negatives always use a leading minus sign.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

// ============================================================================
// Currencies
// ============================================================================

/// Display rules for a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    /// Prefix symbol, if the currency has a well-known one.
    pub symbol: Option<&'static str>,
    /// Digits after the decimal point.
    pub minor_units: u32,
}

/// Returns the display rules for an ISO 4217 code (case-insensitive).
pub fn currency_info(code: &str) -> CurrencyInfo {
    let (symbol, minor_units) = match code.trim().to_ascii_uppercase().as_str() {
        "USD" => (Some("$"), 2),
        "INR" => (Some("₹"), 2),
        "EUR" => (Some("€"), 2),
        "GBP" => (Some("£"), 2),
        "JPY" => (Some("¥"), 0),
        _ => (None, 2),
    };
    CurrencyInfo {
        symbol,
        minor_units,
    }
}

/// Rounds a money amount half-up to `minor_units` decimal places.
pub fn round_money(amount: Decimal, minor_units: u32) -> Decimal {
    amount.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointAwayFromZero)
}

// ============================================================================
// Money
// ============================================================================

/// Formats a money amount, e.g. `format_money(75000, "INR")` → `"₹75,000.00"`.
///
/// Unknown codes are appended instead of a symbol: `"1,234.50 CHF"`.
pub fn format_money(amount: Decimal, currency_code: &str) -> String {
    let info = currency_info(currency_code);
    let rounded = round_money(amount, info.minor_units);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = format!("{:.*}", info.minor_units as usize, rounded.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut number = group_thousands(int_part);
    if let Some(frac) = frac_part {
        number.push('.');
        number.push_str(frac);
    }

    match info.symbol {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{number} {}", currency_code.trim().to_ascii_uppercase()),
    }
}

/// Formats an `f64` money amount.
///
/// Non-finite values render as zero; amounts beyond `Decimal` range
/// saturate at `Decimal::MAX` or `Decimal::MIN`.
pub fn format_money_f64(amount: f64, currency_code: &str) -> String {
    let amount = if amount.is_finite() {
        Decimal::from_f64_retain(amount).unwrap_or_else(|| {
            if amount.abs() < 1.0 {
                Decimal::ZERO
            } else if amount.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        })
    } else {
        Decimal::ZERO
    };
    format_money(amount, currency_code)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// Numbers
// ============================================================================

/// Formats a percentage with at most one decimal: `25%`, `66.7%`, `-12.5%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    if value.abs() >= EXPONENT_THRESHOLD {
        return format!("{}%", exponent(value));
    }
    format!("{}%", one_decimal(value))
}

/// Formats a number compactly: `500`, `1.5K`, `1.5M`, `2B`.
///
/// Anything that would read 1000T or more uses exponent form.
pub fn format_compact_number(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

    if !value.is_finite() {
        return "0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    if abs.round() < 1000.0 {
        let n = abs.round();
        if n == 0.0 {
            return "0".to_string();
        }
        return format!("{sign}{n:.0}");
    }

    for (divisor, suffix) in UNITS {
        let scaled = (abs / divisor * 10.0).round() / 10.0;
        if scaled < 1000.0 {
            return format!("{sign}{}{suffix}", one_decimal(scaled));
        }
    }
    exponent(value)
}

/// Magnitude from which one-decimal rounding no longer applies.
const EXPONENT_THRESHOLD: f64 = 1e15;

/// Exponent form with one decimal: `1.8e308`, `-2e15`.
fn exponent(value: f64) -> String {
    format!("{value:.1e}").replacen(".0e", "e", 1)
}

/// Rounds to one decimal and drops a trailing `.0`.
///
/// Callers keep `value` below [`EXPONENT_THRESHOLD`].
fn one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let text = format!("{rounded:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text).to_string();
    if text == "-0" { "0".to_string() } else { text }
}

// ============================================================================
// Dates
// ============================================================================

/// Formats a date as `"Oct 16, 2026"`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Describes `target` relative to `now`: `"in 3 days"`, `"2 hours ago"`.
///
/// Differences under a minute read `"just now"`; 30 days or more fall back
/// to [`format_date`].
pub fn format_relative(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = target - now;
    let abs = if diff < Duration::zero() { -diff } else { diff };

    if abs < Duration::minutes(1) {
        return "just now".to_string();
    }
    if abs >= Duration::days(30) {
        return format_date(target);
    }

    let phrase = if abs < Duration::hours(1) {
        plural(abs.num_minutes(), "minute")
    } else if abs < Duration::days(1) {
        plural(abs.num_hours(), "hour")
    } else {
        plural(abs.num_days(), "day")
    };

    if diff > Duration::zero() {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn plural(n: i64, unit: &str) -> String {
    format!("{n} {unit}{}", if n == 1 { "" } else { "s" })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_money_symbols() {
        assert_eq!(format_money(Decimal::from(75_000), "INR"), "₹75,000.00");
        assert_eq!(format_money(Decimal::new(123_450, 2), "usd"), "$1,234.50");
        assert_eq!(format_money(Decimal::from(1_500), "JPY"), "¥1,500");
        assert_eq!(format_money(Decimal::new(123_450, 2), "CHF"), "1,234.50 CHF");
    }

    #[test]
    fn test_format_money_small_and_zero() {
        assert_eq!(format_money(Decimal::ZERO, "USD"), "$0.00");
        assert_eq!(format_money(Decimal::new(5, 2), "USD"), "$0.05");
        assert_eq!(format_money(Decimal::from(999), "USD"), "$999.00");
        assert_eq!(format_money(Decimal::from(1_000_000), "USD"), "$1,000,000.00");
    }

    #[test]
    fn test_format_money_rounds_half_up() {
        assert_eq!(format_money(Decimal::new(1005, 3), "USD"), "$1.01");
        assert_eq!(format_money(Decimal::new(1004, 3), "USD"), "$1.00");
        assert_eq!(format_money(Decimal::new(25, 1), "JPY"), "¥3");
    }

    #[test]
    fn test_format_money_negative() {
        assert_eq!(format_money(Decimal::new(-123_450, 2), "USD"), "-$1,234.50");
        assert_eq!(format_money(Decimal::new(-1, 3), "USD"), "$0.00");
    }

    #[test]
    fn test_format_money_f64_non_finite() {
        assert_eq!(format_money_f64(f64::NAN, "USD"), "$0.00");
        assert_eq!(format_money_f64(f64::INFINITY, "USD"), "$0.00");
        assert_eq!(format_money_f64(12.5, "USD"), "$12.50");
    }

    #[test]
    fn test_format_money_f64_out_of_range_saturates() {
        assert_eq!(
            format_money_f64(1e30, "USD"),
            "$79,228,162,514,264,337,593,543,950,335.00"
        );
        assert_eq!(
            format_money_f64(-f64::MAX, "USD"),
            "-$79,228,162,514,264,337,593,543,950,335.00"
        );
        assert_eq!(format_money_f64(1e-300, "USD"), "$0.00");
    }

    #[test]
    fn test_huge_values_use_exponent_form() {
        assert_eq!(format_percent(f64::MAX), "1.8e308%");
        assert_eq!(format_percent(-f64::MAX), "-1.8e308%");
        assert_eq!(format_percent(1e15), "1e15%");
        assert_eq!(format_compact_number(f64::MAX), "1.8e308");
        assert_eq!(format_compact_number(-f64::MAX), "-1.8e308");
        assert_eq!(format_compact_number(2.5e15), "2.5e15");
        assert_eq!(format_compact_number(5e14), "500T");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(25.0), "25%");
        assert_eq!(format_percent(66.666), "66.7%");
        assert_eq!(format_percent(-12.5), "-12.5%");
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(-0.01), "0%");
        assert_eq!(format_percent(f64::NAN), "0%");
    }

    #[test]
    fn test_format_compact_number() {
        assert_eq!(format_compact_number(0.0), "0");
        assert_eq!(format_compact_number(500.0), "500");
        assert_eq!(format_compact_number(1_000.0), "1K");
        assert_eq!(format_compact_number(1_500.0), "1.5K");
        assert_eq!(format_compact_number(1_500_000.0), "1.5M");
        assert_eq!(format_compact_number(2_000_000_000.0), "2B");
        assert_eq!(format_compact_number(-1_500_000.0), "-1.5M");
        assert_eq!(format_compact_number(f64::INFINITY), "0");
    }

    #[test]
    fn test_format_compact_number_promotes_on_rounding() {
        assert_eq!(format_compact_number(999.6), "1K");
        assert_eq!(format_compact_number(999_950.0), "1M");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2026, 10, 6, 12, 0, 0).unwrap();
        assert_eq!(format_date(date), "Oct 6, 2026");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now + Duration::seconds(20), now), "just now");
        assert_eq!(format_relative(now + Duration::minutes(1), now), "in 1 minute");
        assert_eq!(format_relative(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(format_relative(now + Duration::days(3), now), "in 3 days");
        assert_eq!(format_relative(now - Duration::days(45), now), "Sep 1, 2026");
    }
}
