//! # Quantity Module
//!
//! Parsing of free-text quantities ("1/2", "1 1/2", "1.5", "½", "12 large") into
//! numbers, and rendering of numbers back into kitchen-friendly fractions.

use serde_json::Value;

use crate::measurement_patterns::{
    FRACTION_REGEX, MIXED_NUMBER_REGEX, QUANTITY_PREFIX_REGEX, RANGE_REGEX,
};

/// Largest denominator used when rendering fractions
pub const MAX_DENOMINATOR: u32 = 16;

const AMOUNT_EPSILON: f64 = 1e-9;

/// Value of a unicode vulgar fraction character
pub fn unicode_fraction_value(c: char) -> Option<f64> {
    let value = match c {
        '½' => 1.0 / 2.0,
        '⅓' => 1.0 / 3.0,
        '⅔' => 2.0 / 3.0,
        '¼' => 1.0 / 4.0,
        '¾' => 3.0 / 4.0,
        '⅕' => 1.0 / 5.0,
        '⅛' => 1.0 / 8.0,
        '⅜' => 3.0 / 8.0,
        '⅝' => 5.0 / 8.0,
        '⅞' => 7.0 / 8.0,
        _ => return None,
    };
    Some(value)
}

/// Parse a token that is entirely a number
///
/// Accepts "2", "1.5", ".5", "1/2", "1 1/2", "½" and "1½". Zero denominators
/// and anything else yield `None`.
pub fn parse_number_token(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(caps) = MIXED_NUMBER_REGEX.captures(token) {
        let whole: f64 = caps[1].parse().ok()?;
        let fraction = fraction_value(&caps[2], &caps[3])?;
        return Some(whole + fraction);
    }

    if let Some(caps) = FRACTION_REGEX.captures(token) {
        return fraction_value(&caps[1], &caps[2]);
    }

    if let Some(last) = token.chars().last() {
        if let Some(fraction) = unicode_fraction_value(last) {
            let whole = token[..token.len() - last.len_utf8()].trim();
            if whole.is_empty() {
                return Some(fraction);
            }
            return whole.parse::<u32>().ok().map(|w| f64::from(w) + fraction);
        }
    }

    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

fn fraction_value(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: u32 = numerator.parse().ok()?;
    let denominator: u32 = denominator.parse().ok()?;
    if denominator == 0 {
        return None;
    }
    Some(f64::from(numerator) / f64::from(denominator))
}

/// Parse the numeric prefix of a quantity string
///
/// Trailing text is ignored ("2 cups" -> 2.0, "12 large" -> 12.0) and ranges
/// resolve to their midpoint ("2-3" -> 2.5).
///
/// # Examples
///
/// ```rust
/// use grocery_aggregator::quantity::parse_amount;
///
/// assert_eq!(parse_amount("1/2"), Some(0.5));
/// assert_eq!(parse_amount("1 1/2 cups"), Some(1.5));
/// assert_eq!(parse_amount("2-3"), Some(2.5));
/// assert_eq!(parse_amount("a handful"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<f64> {
    if let Some(caps) = RANGE_REGEX.captures(text) {
        if let (Some(min), Some(max)) = (
            parse_number_token(&caps["min"]),
            parse_number_token(&caps["max"]),
        ) {
            return Some((min + max) / 2.0);
        }
    }

    QUANTITY_PREFIX_REGEX
        .captures(text)
        .and_then(|caps| parse_number_token(&caps["qty"]))
}

/// Numeric amount carried by a JSON quantity field
pub fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(text) => parse_amount(text),
        _ => None,
    }
}

/// Check whether an amount should be read as plural ("2 cups" vs "1 cup")
pub fn is_plural_amount(amount: f64) -> bool {
    amount > 1.0 + AMOUNT_EPSILON
}

/// Render an amount as a whole number or simplified (mixed) fraction
///
/// The fractional part is approximated with the closest fraction whose
/// denominator is at most [`MAX_DENOMINATOR`].
///
/// # Examples
///
/// ```rust
/// use grocery_aggregator::quantity::format_amount;
///
/// assert_eq!(format_amount(5.0), "5");
/// assert_eq!(format_amount(0.5), "1/2");
/// assert_eq!(format_amount(1.125), "1 1/8");
/// assert_eq!(format_amount(0.333), "1/3");
/// ```
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let magnitude = amount.abs();
    let mut whole = magnitude.trunc() as u64;
    let remainder = magnitude - magnitude.trunc();

    let (mut numerator, mut denominator) = (0u32, 1u32);
    let mut best_error = remainder;
    for candidate in 1..=MAX_DENOMINATOR {
        let n = (remainder * f64::from(candidate)).round() as u32;
        let error = (remainder - f64::from(n) / f64::from(candidate)).abs();
        if error + AMOUNT_EPSILON < best_error {
            best_error = error;
            numerator = n;
            denominator = candidate;
        }
    }

    if numerator == denominator {
        whole += 1;
        numerator = 0;
    }

    match (whole, numerator) {
        (0, 0) if magnitude > AMOUNT_EPSILON => {
            // Below 1/32: keep the decimal, never rendering zero
            let decimal = format!("{:.2}", magnitude.max(0.01));
            format!("{sign}{}", decimal.trim_end_matches('0').trim_end_matches('.'))
        }
        (whole, 0) => format!("{sign}{whole}"),
        (0, numerator) => format!("{sign}{numerator}/{denominator}"),
        (whole, numerator) => format!("{sign}{whole} {numerator}/{denominator}"),
    }
}

/// Plural display form of a unit ("cup" -> "cups", "leaf" -> "leaves")
///
/// Abbreviations and empty units are returned unchanged.
pub fn pluralize_unit(unit: &str, amount: f64) -> String {
    if !is_plural_amount(amount) {
        return unit.to_string();
    }

    match unit {
        "" | "tbsp" | "tsp" | "oz" | "g" | "kg" | "ml" | "l" => unit.to_string(),
        "leaf" => "leaves".to_string(),
        "lb" => "lbs".to_string(),
        "pinch" | "dash" | "bunch" => format!("{unit}es"),
        unit if unit.ends_with('s') => unit.to_string(),
        unit => format!("{unit}s"),
    }
}
