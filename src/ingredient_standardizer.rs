//! # Ingredient Standardizer Module
//!
//! Turns one raw ingredient (free text or a semi-structured record) into a
//! canonical `(name, amount, unit)` triple so that different spellings of the
//! same ingredient land on the same aggregation key.
//!
//! The standardizer never fails: anything it cannot read comes back as a name
//! without an amount.
//!
//! ## Text input
//!
//! 1. Every `number + unit` occurrence is extracted ("1 cup 2 tbsp olive oil")
//! 2. Otherwise a leading number is read, with an optional unit word after it
//! 3. The remaining text is sanitized into a name
//! 4. The unit is normalized through the alias table, or defaulted from the name
//!
//! ## Record input
//!
//! The name, quantity and unit fields are read separately. Generic piece units
//! are dropped and re-derived from the name, and eggs get special handling for
//! quantities such as "12 large".

use std::sync::Arc;

use log::{debug, trace};
use serde_json::Value;

use crate::config_errors::ConfigError;
use crate::grocery_config::{GroceryConfig, NormalizationRules};
use crate::ingredient_model::{RawIngredient, StandardizedIngredient, StructuredIngredient};
use crate::measurement_patterns::{
    COMPLEX_QUANTITY_REGEX, COOKED_REGEX, LEADING_INTEGER_REGEX, LEADING_NUMERIC_RUN_REGEX,
    LEADING_QUANTITY_REGEX, QUANTITY_PREFIX_REGEX, RANGE_REGEX, TO_TASTE_REGEX,
    TRAILING_PUNCTUATION_REGEX,
};
use crate::quantity::{amount_from_value, parse_amount, parse_number_token};
use crate::unit_converter::{are_compatible, convert_from_base, convert_to_base};

/// Unit tokens that carry no information and are re-derived from the name
const GENERIC_PIECE_UNITS: &[&str] = &["piece", "pieces", "pc", "pcs", "whole"];

/// Quantity read out of an ingredient string, with the text left over
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuantity {
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub rest: String,
}

/// Converts raw ingredients into standardized triples
#[derive(Debug, Clone)]
pub struct IngredientStandardizer {
    rules: Arc<NormalizationRules>,
}

impl Default for IngredientStandardizer {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientStandardizer {
    /// Create a standardizer using the built-in normalization tables
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_aggregator::ingredient_standardizer::IngredientStandardizer;
    ///
    /// let standardizer = IngredientStandardizer::new();
    /// let milk = standardizer.standardize_text("1/2 cup milk");
    ///
    /// assert_eq!(milk.name, "milk");
    /// assert_eq!(milk.amount, Some(0.5));
    /// assert_eq!(milk.unit, "cup");
    /// ```
    pub fn new() -> Self {
        Self::with_rules(NormalizationRules::builtin())
    }

    /// Create a standardizer sharing already compiled rules
    pub fn with_rules(rules: Arc<NormalizationRules>) -> Self {
        Self { rules }
    }

    /// Create a standardizer from a configuration document
    pub fn with_config(config: &GroceryConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_rules(Arc::new(config.compile()?)))
    }

    /// Normalization rules used by this standardizer
    pub fn rules(&self) -> &Arc<NormalizationRules> {
        &self.rules
    }

    /// Standardize either shape of raw ingredient
    pub fn standardize(&self, raw: &RawIngredient) -> StandardizedIngredient {
        match raw {
            RawIngredient::Text(text) => self.standardize_text(text),
            RawIngredient::Structured(record) => self.standardize_record(record),
        }
    }

    /// Standardize an ingredient straight from its JSON value
    pub fn standardize_value(&self, value: &Value) -> StandardizedIngredient {
        self.standardize(&RawIngredient::from_value(value))
    }

    /// Standardize a free-text ingredient line
    pub fn standardize_text(&self, text: &str) -> StandardizedIngredient {
        // A leading range is one quantity ("1 to 2 cups flour")
        let range = RANGE_REGEX
            .is_match(text)
            .then(|| self.parse_leading_quantity(text))
            .flatten();

        let mut parsed = range
            .or_else(|| self.parse_complex(text))
            .or_else(|| self.parse_leading_quantity(text))
            .unwrap_or_else(|| ParsedQuantity {
                amount: None,
                unit: None,
                rest: text.to_string(),
            });

        let mut name = self.sanitize_name(&parsed.rest, text);
        if name.is_empty() {
            // Nothing but a measure ("2 cups"): the unit word names the item
            if let Some(unit) = parsed.unit.take() {
                name = self.sanitize_name(&unit, text);
            }
        }
        let unit = self.resolve_unit(parsed.unit.as_deref(), &name);

        trace!(
            "Standardized text '{}' -> name='{}' amount={:?} unit='{}'",
            text,
            name,
            parsed.amount,
            unit
        );

        StandardizedIngredient {
            name,
            amount: parsed.amount,
            unit,
        }
    }

    /// Standardize a semi-structured ingredient record
    pub fn standardize_record(&self, record: &StructuredIngredient) -> StandardizedIngredient {
        let raw_name = record.name.as_deref().unwrap_or_default();
        let unit_field = record
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|unit| !unit.is_empty());

        // A bare name may still carry its own quantity ("2 cups milk")
        if record.quantity.is_none() && unit_field.is_none() {
            return self.standardize_text(raw_name);
        }

        let context = record.raw_text();
        let mut name = self.sanitize_name(raw_name, &context);
        let quantity = record.quantity.as_ref();
        let mut amount = quantity.and_then(amount_from_value);

        if name == "egg" || name == "eggs" {
            name = "egg".to_string();
            if let Some(Value::String(text)) = quantity {
                if parse_number_token(text).is_none() {
                    amount = LEADING_INTEGER_REGEX
                        .captures(text)
                        .and_then(|caps| caps[1].parse::<f64>().ok());
                }
            }
        }

        let raw_unit = match unit_field {
            Some(unit) => Some(unit.to_string()),
            None => quantity.and_then(|value| self.trailing_unit_word(value)),
        }
        .filter(|unit| !GENERIC_PIECE_UNITS.contains(&unit.to_lowercase().as_str()));

        let unit = self.resolve_unit(raw_unit.as_deref(), &name);

        trace!(
            "Standardized record {:?} -> name='{}' amount={:?} unit='{}'",
            record,
            name,
            amount,
            unit
        );

        StandardizedIngredient { name, amount, unit }
    }

    /// Extract every `number + unit` occurrence from a string
    ///
    /// Quantities of the same measurement family are summed and expressed in
    /// the unit of the first occurrence. Occurrences of a different family are
    /// dropped from the amount but still removed from the text.
    pub fn parse_complex(&self, text: &str) -> Option<ParsedQuantity> {
        let mut first_unit: Option<String> = None;
        let mut base_total = 0.0;
        let mut matches = 0usize;

        for caps in COMPLEX_QUANTITY_REGEX.captures_iter(text) {
            let unit = caps["unit"].to_string();
            let Some(amount) = parse_number_token(&caps["qty"]) else {
                continue;
            };

            if let Some(first) = first_unit.as_deref() {
                if !are_compatible(first, &unit) {
                    debug!(
                        "Skipping quantity '{}' in '{}': '{}' cannot be added to '{}'",
                        &caps[0], text, unit, first
                    );
                    continue;
                }
            }

            base_total += convert_to_base(amount, &unit);
            first_unit.get_or_insert(unit);
            matches += 1;
        }

        let unit = first_unit?;
        let amount = convert_from_base(base_total, &unit);
        if matches > 1 {
            debug!(
                "Combined {} quantities in '{}' into {} {}",
                matches, text, amount, unit
            );
        }

        Some(ParsedQuantity {
            amount: Some(amount),
            rest: COMPLEX_QUANTITY_REGEX.replace_all(text, " ").into_owned(),
            unit: Some(unit),
        })
    }

    /// Read a leading number, and a unit word directly after it
    ///
    /// Ranges ("2-3 carrots") resolve to their midpoint.
    pub fn parse_leading_quantity(&self, text: &str) -> Option<ParsedQuantity> {
        let (amount, rest) = match RANGE_REGEX.find(text) {
            Some(range) => (parse_amount(text)?, &text[range.end()..]),
            None => {
                let caps = LEADING_QUANTITY_REGEX.captures(text)?;
                let amount = parse_number_token(&caps["qty"])?;
                let rest = caps.name("rest").map_or("", |m| m.as_str());
                (amount, rest)
            }
        };

        let rest = rest.trim();
        let (unit, rest) = match rest.split_once(char::is_whitespace) {
            Some((word, remainder))
                if self.rules.is_unit_alias(word) && !remainder.trim().is_empty() =>
            {
                (Some(word.to_string()), remainder.trim())
            }
            _ => (None, rest),
        };

        Some(ParsedQuantity {
            amount: Some(amount),
            unit,
            rest: rest.to_string(),
        })
    }

    /// Clean an ingredient name
    ///
    /// `context` is the complete raw ingredient text, used to detect phrases
    /// such as "to taste" that the name itself no longer contains.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_aggregator::ingredient_standardizer::IngredientStandardizer;
    ///
    /// let standardizer = IngredientStandardizer::new();
    /// assert_eq!(standardizer.sanitize_name("Freshly Grated Parmesan Cheese,", ""), "parmesan");
    /// assert_eq!(standardizer.sanitize_name("cooked brown rice", ""), "brown rice cooked");
    /// ```
    pub fn sanitize_name(&self, raw_name: &str, context: &str) -> String {
        let mut name = raw_name.trim().to_lowercase();

        let cooked = COOKED_REGEX.is_match(&name);
        if cooked {
            name = COOKED_REGEX.replace_all(&name, " ").into_owned();
        }

        name = LEADING_NUMERIC_RUN_REGEX.replace(&name, "").into_owned();

        for pattern in self.rules.fillers().iter().chain(self.rules.descriptors()) {
            name = collapse_whitespace(&pattern.replace_all(&name, " "));
        }

        name = TRAILING_PUNCTUATION_REGEX.replace(&name, "").into_owned();
        name = collapse_whitespace(&self.rules.apply_replacements(&name));

        if name == "salt" && TO_TASTE_REGEX.is_match(context) {
            return "salt to taste".to_string();
        }

        if (name.contains("cheddar") || name.contains("cheddase")) && !name.contains("cheese") {
            name = format!("{} cheese", name.replace("cheddase", "cheddar"));
        }

        if cooked && (name.contains("rice") || name.contains("quinoa")) {
            name.push_str(" cooked");
        }

        name
    }

    /// Normalize a unit token through the alias table
    pub fn normalize_unit(&self, token: &str) -> String {
        self.rules.canonical_unit(token)
    }

    /// Final unit for a sanitized name
    ///
    /// A raw unit goes through the alias table; without one the default-unit
    /// table is consulted. Count items always end up with no unit.
    pub fn resolve_unit(&self, raw_unit: Option<&str>, name: &str) -> String {
        if self.rules.is_count_item(name) {
            return String::new();
        }

        match raw_unit.map(str::trim).filter(|unit| !unit.is_empty()) {
            Some(unit) => self.normalize_unit(unit),
            None => self
                .rules
                .default_unit_for(name)
                .map(str::to_string)
                .unwrap_or_default(),
        }
    }

    /// Unit word following the number in a quantity string ("1 cup")
    fn trailing_unit_word(&self, quantity: &Value) -> Option<String> {
        let Value::String(text) = quantity else {
            return None;
        };
        let prefix = QUANTITY_PREFIX_REGEX.find(text)?;
        let word = text[prefix.end()..].split_whitespace().next()?;
        self.rules.is_unit_alias(word).then(|| word.to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn standardizer() -> IngredientStandardizer {
        IngredientStandardizer::new()
    }

    #[test]
    fn test_complex_single_quantity() {
        let parsed = standardizer().parse_complex("2 cups milk").unwrap();
        assert_eq!(parsed.amount, Some(2.0));
        assert_eq!(parsed.unit.as_deref(), Some("cups"));
        assert_eq!(parsed.rest.trim(), "milk");
    }

    #[test]
    fn test_complex_sums_same_family() {
        let parsed = standardizer()
            .parse_complex("1 cup 2 tablespoons olive oil")
            .unwrap();
        assert_eq!(parsed.unit.as_deref(), Some("cup"));
        assert!((parsed.amount.unwrap() - 1.125).abs() < 1e-9);
        assert_eq!(parsed.rest.trim(), "olive oil");
    }

    #[test]
    fn test_complex_skips_other_family() {
        let parsed = standardizer().parse_complex("1 cup 4 oz cheese").unwrap();
        assert_eq!(parsed.amount, Some(1.0));
        assert_eq!(parsed.unit.as_deref(), Some("cup"));
        assert_eq!(parsed.rest.trim(), "cheese");
    }

    #[test]
    fn test_leading_quantity_with_unit_word() {
        let parsed = standardizer().parse_leading_quantity("4 slices bacon").unwrap();
        assert_eq!(parsed.amount, Some(4.0));
        assert_eq!(parsed.unit.as_deref(), Some("slices"));
        assert_eq!(parsed.rest, "bacon");

        let parsed = standardizer().parse_leading_quantity("2-3 carrots").unwrap();
        assert_eq!(parsed.amount, Some(2.5));
        assert_eq!(parsed.unit, None);
        assert_eq!(parsed.rest, "carrots");

        assert!(standardizer().parse_leading_quantity("salt").is_none());
    }

    #[test]
    fn test_sanitize_removes_fillers_and_descriptors() {
        let s = standardizer();
        assert_eq!(s.sanitize_name("a pinch of nutmeg", ""), "nutmeg");
        assert_eq!(s.sanitize_name("Onion, finely chopped", ""), "onion");
        assert_eq!(s.sanitize_name("extra-virgin olive oil (for drizzling)", ""), "olive oil");
        assert_eq!(s.sanitize_name("2 large Eggs", ""), "egg");
    }

    #[test]
    fn test_sanitize_overrides() {
        let s = standardizer();
        assert_eq!(s.sanitize_name("salt", "salt to taste"), "salt to taste");
        assert_eq!(s.sanitize_name("salt", "1 tsp salt"), "salt");
        assert_eq!(s.sanitize_name("Cheddase", ""), "cheddar cheese");
        assert_eq!(s.sanitize_name("shredded cheddar", ""), "cheddar cheese");
        assert_eq!(s.sanitize_name("quinoa, cooked", ""), "quinoa cooked");
        assert_eq!(s.sanitize_name("cooked chicken", ""), "chicken");
    }

    #[test]
    fn test_record_generic_piece_unit_rederived() {
        let garlic = standardizer()
            .standardize_value(&json!({"name": "Garlic", "quantity": 2, "unit": "pieces"}));
        assert_eq!(garlic.unit, "clove");

        let apple = standardizer()
            .standardize_value(&json!({"name": "apple", "quantity": 2, "unit": "whole"}));
        assert_eq!(apple.unit, "");
    }

    #[test]
    fn test_record_unit_from_quantity_string() {
        let flour = standardizer().standardize_value(&json!({"name": "flour", "quantity": "2 cup"}));
        assert_eq!(flour.amount, Some(2.0));
        assert_eq!(flour.unit, "cup");
    }

    #[test]
    fn test_record_egg_leading_integer() {
        let eggs = standardizer()
            .standardize_value(&json!({"name": "Large Eggs", "quantity": "12 large"}));
        assert_eq!(eggs.name, "egg");
        assert_eq!(eggs.amount, Some(12.0));
        assert_eq!(eggs.unit, "");

        let half = standardizer().standardize_value(&json!({"name": "eggs", "quantity": "1 1/2 beaten"}));
        assert_eq!(half.amount, Some(1.0));
    }

    #[test]
    fn test_record_without_quantity_reads_name() {
        let milk = standardizer().standardize_value(&json!({"name": "2 cups milk"}));
        assert_eq!(milk.name, "milk");
        assert_eq!(milk.amount, Some(2.0));
        assert_eq!(milk.unit, "cup");
    }

    #[test]
    fn test_count_items_drop_units() {
        let peppers = standardizer().standardize_text("2 cups bell peppers");
        assert_eq!(peppers.name, "bell pepper");
        assert_eq!(peppers.unit, "");
    }

    #[test]
    fn test_non_string_values_never_fail() {
        let s = standardizer();
        assert_eq!(s.standardize_value(&json!(null)).name, "");
        assert_eq!(s.standardize_value(&json!(true)).name, "true");
        assert_eq!(s.standardize_value(&json!({})).name, "");
        assert_eq!(s.standardize_value(&json!({"quantity": [1, 2]})).amount, None);
    }
}
