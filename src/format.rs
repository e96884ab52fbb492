//! Numeric helpers shared by the billing strategies and the presentation layers.
//!
//! Line-item labels are built here so every strategy formats quantities and
//! prices the same way.

/// Clamps a user-entered reading to a usable value.
///
/// Negative and non-finite values (NaN, ±∞) become `0.0`.
///
/// # Examples
///
/// ```
/// use tariff_sim::format::clamp_reading;
///
/// assert_eq!(clamp_reading(12.5), 12.5);
/// assert_eq!(clamp_reading(-3.0), 0.0);
/// assert_eq!(clamp_reading(f64::NAN), 0.0);
/// ```
pub fn clamp_reading(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Rounds a monetary amount to cents, half away from zero.
///
/// `f64::EPSILON` is added before scaling so values such as `1.005` that are
/// stored slightly below their decimal representation still round up.
pub fn round_cents(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}

/// Formats an amount with two decimals and no currency symbol.
pub fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

/// Formats a quantity with up to three decimals, dropping trailing zeros.
///
/// # Examples
///
/// ```
/// use tariff_sim::format::format_quantity;
///
/// assert_eq!(format_quantity(150.0), "150");
/// assert_eq!(format_quantity(12.5), "12.5");
/// assert_eq!(format_quantity(0.1234), "0.123");
/// ```
pub fn format_quantity(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// English ordinal for a 1-based position: `1st`, `2nd`, `3rd`, `11th`, `22nd`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Parses a number typed with either a comma or a dot as decimal separator.
///
/// Accepts `"6,744"`, `"6.744"` and `"1.234,56"`. When both separators are
/// present the dots are thousands separators and the comma is the decimal
/// mark. Whitespace anywhere in the input is ignored. Returns `None` for
/// empty, malformed or non-finite input.
pub fn parse_number_any(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = if compact.contains(',') && compact.contains('.') {
        compact.replace('.', "").replacen(',', ".", 1)
    } else {
        compact.replacen(',', ".", 1)
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
