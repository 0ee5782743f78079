//! # Measurement Patterns Module
//!
//! This module contains regex patterns and constants used for quantity and unit detection.

use lazy_static::lazy_static;
use regex::Regex;

/// Numeric quantity: mixed numbers, fractions, decimals and unicode vulgar fractions
pub const NUMBER_PATTERN: &str = r"\d+\s*[½⅓⅔¼¾⅕⅛⅜⅝⅞]|\d+\s+\d+/\d+|\d+/\d+|\d*\.\d+|\d+|[½⅓⅔¼¾⅕⅛⅜⅝⅞]";

// Units recognised by the multi-quantity parser, longest spellings first
const COMPLEX_UNIT_PATTERN: &str =
    r"tablespoons?|tbsps?|teaspoons?|tsps?|cups?|ounces?|oz|pounds?|lbs?|cloves?|grams?|g|ml";

lazy_static! {
    /// Every `number + unit` occurrence in an ingredient string ("1 cup 2 tbsp olive oil")
    pub static ref COMPLEX_QUANTITY_REGEX: Regex = Regex::new(&format!(
        r"(?i)(?P<qty>{NUMBER_PATTERN})\s*(?P<unit>{COMPLEX_UNIT_PATTERN})\b\.?"
    ))
    .expect("Complex quantity pattern should be valid");

    /// A quantity at the start of a string, followed by the rest of the text
    pub static ref LEADING_QUANTITY_REGEX: Regex = Regex::new(&format!(
        r"^\s*(?P<qty>{NUMBER_PATTERN})\s*(?P<rest>.*)$"
    ))
    .expect("Leading quantity pattern should be valid");

    /// Only the numeric prefix of a quantity string ("1/2 cup" -> "1/2")
    pub static ref QUANTITY_PREFIX_REGEX: Regex = Regex::new(&format!(
        r"^\s*(?P<qty>{NUMBER_PATTERN})"
    ))
    .expect("Quantity prefix pattern should be valid");

    /// Ranges such as "2-3" or "1 to 2"
    pub static ref RANGE_REGEX: Regex = Regex::new(&format!(
        r"^\s*(?P<min>{NUMBER_PATTERN})\s*(?:-|–|to)\s*(?P<max>{NUMBER_PATTERN})"
    ))
    .expect("Range pattern should be valid");

    pub static ref MIXED_NUMBER_REGEX: Regex =
        Regex::new(r"^(\d+)\s+(\d+)/(\d+)$").expect("Mixed number pattern should be valid");

    pub static ref FRACTION_REGEX: Regex =
        Regex::new(r"^(\d+)/(\d+)$").expect("Fraction pattern should be valid");

    pub static ref LEADING_INTEGER_REGEX: Regex =
        Regex::new(r"^\s*(\d+)").expect("Leading integer pattern should be valid");

    /// Leading run of digits, fractions and separators left in front of a name
    pub static ref LEADING_NUMERIC_RUN_REGEX: Regex =
        Regex::new(r"^[\d\s/.,½⅓⅔¼¾⅕⅛⅜⅝⅞-]+").expect("Leading numeric run pattern should be valid");

    pub static ref TRAILING_PUNCTUATION_REGEX: Regex =
        Regex::new(r"[,.;:\s]+$").expect("Trailing punctuation pattern should be valid");

    pub static ref COOKED_REGEX: Regex =
        Regex::new(r"\bcooked\b").expect("Cooked qualifier pattern should be valid");

    pub static ref TO_TASTE_REGEX: Regex =
        Regex::new(r"(?i)\bto\s+taste\b").expect("To taste pattern should be valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_pattern_finds_all_quantities() {
        let found: Vec<(String, String)> = COMPLEX_QUANTITY_REGEX
            .captures_iter("1 cup 2 tablespoons olive oil")
            .map(|caps| (caps["qty"].to_string(), caps["unit"].to_string()))
            .collect();

        assert_eq!(
            found,
            vec![
                ("1".to_string(), "cup".to_string()),
                ("2".to_string(), "tablespoons".to_string())
            ]
        );
    }

    #[test]
    fn test_complex_pattern_word_boundaries() {
        assert!(COMPLEX_QUANTITY_REGEX.is_match("500g butter"));
        assert!(COMPLEX_QUANTITY_REGEX.is_match("1 1/2 Cups milk"));
        assert!(!COMPLEX_QUANTITY_REGEX.is_match("2 garlic bulbs"));
        assert!(!COMPLEX_QUANTITY_REGEX.is_match("3 eggs"));
        assert!(!COMPLEX_QUANTITY_REGEX.is_match("1 cupboard"));
    }

    #[test]
    fn test_leading_quantity_pattern() {
        let caps = LEADING_QUANTITY_REGEX.captures("8 chicken breasts").unwrap();
        assert_eq!(&caps["qty"], "8");
        assert_eq!(&caps["rest"], "chicken breasts");

        let caps = LEADING_QUANTITY_REGEX.captures("1 1/2 slices bread").unwrap();
        assert_eq!(&caps["qty"], "1 1/2");
        assert_eq!(&caps["rest"], "slices bread");

        assert!(LEADING_QUANTITY_REGEX.captures("salt").is_none());
    }
}
