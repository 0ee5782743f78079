//! # Grocery Aggregator Module
//!
//! This module walks a meal-plan document of unknown shape, standardizes every
//! ingredient it finds and merges repeated ingredients into one deduplicated,
//! human readable grocery list.
//!
//! ## Scanning
//!
//! - Objects holding an `ingredients` array contribute each entry of that array
//! - Objects with a `title`, no `ingredients` and no nested lists of records
//!   are simple items such as snacks
//! - The known wrapper fields `meal_plan` and `meal_plan_json` are scanned first,
//!   parsing them again when they hold JSON text
//!
//! ## Fallbacks
//!
//! When the regular scan yields nothing, the aggregator retries in order:
//! parsing a string document again, wrapping a bare object as `meal_plan_json`,
//! scanning the whole document blindly, and finally collecting raw
//! `"{quantity} {name}"` text without standardization.
//!
//! Aggregation never fails. Missing or malformed documents produce an empty list.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, trace, warn};
use serde_json::{Map, Value};

use crate::grocery_config::NormalizationRules;
use crate::ingredient_model::{
    parse_json_text, Accumulator, AggregationKey, GroceryItem, MenuDocument,
};
use crate::ingredient_standardizer::IngredientStandardizer;
use crate::quantity::{format_amount, pluralize_unit};
use crate::shopping_list_cache::ShoppingListCache;

/// Top-level fields known to wrap the actual meal plan
pub const KNOWN_MENU_FIELDS: &[&str] = &["meal_plan", "meal_plan_json"];

/// Maximum nesting depth followed by the deep scan
pub const MAX_SCAN_DEPTH: usize = 128;

const SALT_TO_TASTE_LINE: &str = "Salt    To taste";

/// Builds consolidated grocery lists from meal-plan documents
#[derive(Debug, Clone, Default)]
pub struct GroceryAggregator {
    standardizer: IngredientStandardizer,
}

impl GroceryAggregator {
    /// Create an aggregator using the built-in normalization tables
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Arc<NormalizationRules>) -> Self {
        Self::with_standardizer(IngredientStandardizer::with_rules(rules))
    }

    pub fn with_standardizer(standardizer: IngredientStandardizer) -> Self {
        Self { standardizer }
    }

    pub fn standardizer(&self) -> &IngredientStandardizer {
        &self.standardizer
    }

    /// Produce the grocery list for a menu document
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_aggregator::grocery_aggregator::GroceryAggregator;
    ///
    /// let menu = r#"{"days": [{"meals": [{"title": "Pancakes", "ingredients": [
    ///     {"name": "flour", "quantity": "1 cup"},
    ///     "2 cups flour",
    ///     "1/2 cup milk"
    /// ]}]}]}"#;
    ///
    /// let items = GroceryAggregator::new().aggregate(menu);
    /// let lines: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    /// assert_eq!(lines, vec!["3 cups flour", "1/2 cup milk"]);
    /// ```
    pub fn aggregate(&self, menu: impl Into<MenuDocument>) -> Vec<GroceryItem> {
        let Some(value) = menu.into().into_value() else {
            info!("No usable menu document, returning an empty grocery list");
            return Vec::new();
        };

        let items = self.render(&self.accumulate(&value));
        if !items.is_empty() {
            info!("Aggregated {} grocery items", items.len());
            return items;
        }

        let reparsed = match &value {
            Value::String(text) => parse_json_text(text),
            _ => None,
        };

        if let Some(inner) = &reparsed {
            let items = self.render(&self.accumulate(inner));
            if !items.is_empty() {
                debug!("Grocery items found after parsing string document again");
                return items;
            }
        }

        let candidate = reparsed.as_ref().unwrap_or(&value);
        if let Value::Object(map) = candidate {
            let mut wrapper = Map::new();
            wrapper.insert("meal_plan_json".to_string(), Value::Object(map.clone()));
            let items = self.render(&self.accumulate(&Value::Object(wrapper)));
            if !items.is_empty() {
                debug!("Grocery items found after wrapping document as meal_plan_json");
                return items;
            }
        }

        let mut accumulator = Accumulator::new();
        self.extract_ingredients_deep(&value, &mut accumulator, 0);
        if let Some(inner) = &reparsed {
            self.extract_ingredients_deep(inner, &mut accumulator, 0);
        }
        let items = self.render(&accumulator);
        if !items.is_empty() {
            debug!("Grocery items found by blind deep scan");
            return items;
        }

        let mut lines = extract_raw_ingredient_strings(&value);
        if let Some(inner) = &reparsed {
            lines.extend(extract_raw_ingredient_strings(inner));
        }
        if lines.is_empty() {
            warn!("No ingredients found in menu document");
        } else {
            debug!("Falling back to {} raw ingredient strings", lines.len());
        }

        let mut seen = HashSet::new();
        lines
            .into_iter()
            .filter(|line| seen.insert(line.clone()))
            .map(GroceryItem::from_display_line)
            .collect()
    }

    /// Aggregate through a cache keyed by a caller-supplied key
    ///
    /// Only non-empty lists are stored.
    pub fn aggregate_cached<C>(
        &self,
        cache: &C,
        key: &str,
        menu: impl Into<MenuDocument>,
    ) -> Vec<GroceryItem>
    where
        C: ShoppingListCache<Vec<GroceryItem>> + ?Sized,
    {
        if let Some(items) = cache.get(key) {
            debug!("Serving grocery list '{}' from cache", key);
            return items;
        }

        let items = self.aggregate(menu);
        if !items.is_empty() {
            cache.put(key, items.clone());
        }
        items
    }

    /// Scan a parsed document into a fresh accumulator
    ///
    /// Known wrapper fields take precedence. The blind scan only runs when
    /// none of them is present.
    pub fn accumulate(&self, value: &Value) -> Accumulator {
        let mut accumulator = Accumulator::new();
        if !self.scan_known_fields(value, &mut accumulator) {
            self.extract_ingredients_deep(value, &mut accumulator, 0);
        }
        accumulator
    }

    /// Scan the first usable known wrapper field; returns whether one was found
    fn scan_known_fields(&self, value: &Value, accumulator: &mut Accumulator) -> bool {
        let Value::Object(map) = value else {
            return false;
        };

        for field in KNOWN_MENU_FIELDS {
            let inner = match map.get(*field) {
                None | Some(Value::Null) => continue,
                Some(Value::String(text)) => match parse_json_text(text) {
                    Some(Value::Null) | None => continue,
                    Some(parsed) => parsed,
                },
                Some(other) => other.clone(),
            };

            debug!("Scanning menu through known field '{}'", field);
            self.extract_ingredients_deep(&inner, accumulator, 0);
            return true;
        }
        false
    }

    /// Recursively fold every ingredient found under `value`
    pub fn extract_ingredients_deep(&self, value: &Value, accumulator: &mut Accumulator, depth: usize) {
        if depth > MAX_SCAN_DEPTH {
            warn!("Menu document nested deeper than {} levels, skipping", MAX_SCAN_DEPTH);
            return;
        }

        match value {
            Value::Object(map) => {
                match map.get("ingredients") {
                    Some(Value::Array(entries)) => {
                        for entry in entries {
                            self.fold_ingredient(entry, accumulator);
                        }
                    }
                    Some(_) => {}
                    None => {
                        if let Some(text) = simple_item_text(map) {
                            trace!("Folding simple item '{}'", text);
                            self.fold_ingredient(&Value::String(text), accumulator);
                        }
                    }
                }

                for (key, child) in map {
                    if key == "ingredients" && child.is_array() {
                        continue;
                    }
                    self.extract_ingredients_deep(child, accumulator, depth + 1);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.extract_ingredients_deep(item, accumulator, depth + 1);
                }
            }
            _ => {}
        }
    }

    fn fold_ingredient(&self, entry: &Value, accumulator: &mut Accumulator) {
        let ingredient = self.standardizer.standardize_value(entry);
        if ingredient.name.is_empty() {
            trace!("Skipping ingredient without a name: {}", entry);
            return;
        }
        accumulator.add(ingredient);
    }

    /// Turn accumulated totals into display items, in key order
    pub fn render(&self, accumulator: &Accumulator) -> Vec<GroceryItem> {
        accumulator
            .iter()
            .map(|(key, total)| GroceryItem::from_display_line(self.format_display_line(key, total)))
            .collect()
    }

    /// Render one aggregated ingredient
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_aggregator::grocery_aggregator::GroceryAggregator;
    /// use grocery_aggregator::ingredient_model::AggregationKey;
    ///
    /// let aggregator = GroceryAggregator::new();
    /// let garlic = AggregationKey::new("garlic", "clove");
    /// assert_eq!(aggregator.format_display_line(&garlic, Some(3.0)), "3 cloves garlic");
    ///
    /// let rice = AggregationKey::new("rice cooked", "cup");
    /// assert_eq!(aggregator.format_display_line(&rice, Some(1.5)), "1 1/2 cups rice (cooked)");
    /// ```
    pub fn format_display_line(&self, key: &AggregationKey, total: Option<f64>) -> String {
        if key.name == "salt to taste" {
            return SALT_TO_TASTE_LINE.to_string();
        }

        let name = match key.name.strip_suffix(" cooked") {
            Some(base) => format!("{base} (cooked)"),
            None => key.name.clone(),
        };

        let Some(amount) = total else {
            return name;
        };

        let unit = self.standardizer.rules().display_unit(&key.name, &key.unit);
        let unit = pluralize_unit(unit, amount);
        if unit.is_empty() {
            format!("{} {}", format_amount(amount), name)
        } else {
            format!("{} {} {}", format_amount(amount), unit, name)
        }
    }
}

/// Text of a scalar JSON value, trimmed; `None` when empty or not a scalar
fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn quantity_text(map: &Map<String, Value>) -> Option<String> {
    scalar_text(map.get("quantity")).or_else(|| scalar_text(map.get("amount")))
}

fn with_quantity(quantity: Option<String>, label: String) -> String {
    match quantity {
        Some(quantity) => format!("{quantity} {label}"),
        None => label,
    }
}

/// `"{quantity} {title}"` for an object carrying a title
///
/// Objects that contain lists of records (days, meals) are containers, not
/// items. Nested metadata such as `macros` does not disqualify an item.
fn simple_item_text(map: &Map<String, Value>) -> Option<String> {
    if map.contains_key("ingredients") || map.values().any(|v| holds_records(v, 0)) {
        return None;
    }
    match map.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {
            Some(with_quantity(quantity_text(map), title.trim().to_string()))
        }
        _ => None,
    }
}

/// Whether `value` is, or contains, an array of objects
fn holds_records(value: &Value, depth: usize) -> bool {
    if depth > MAX_SCAN_DEPTH {
        return false;
    }
    match value {
        Value::Array(items) => items
            .iter()
            .any(|item| item.is_object() || holds_records(item, depth + 1)),
        Value::Object(map) => map.values().any(|child| holds_records(child, depth + 1)),
        _ => false,
    }
}

/// Collect raw ingredient text from a document without standardizing it
///
/// Entries of `ingredients` arrays become `"{quantity} {name}"` (or the plain
/// string), and titled simple items become `"{quantity} {title}"`.
pub fn extract_raw_ingredient_strings(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    collect_raw_strings(value, &mut lines, 0);
    lines
}

fn collect_raw_strings(value: &Value, lines: &mut Vec<String>, depth: usize) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }

    match value {
        Value::Object(map) => {
            match map.get("ingredients") {
                Some(Value::Array(entries)) => {
                    for entry in entries {
                        let line = match entry {
                            Value::Object(record) => ["name", "ingredient", "item", "title"]
                                .iter()
                                .find_map(|field| scalar_text(record.get(*field)))
                                .map(|name| with_quantity(quantity_text(record), name)),
                            other => scalar_text(Some(other)),
                        };
                        lines.extend(line);
                    }
                }
                Some(_) => {}
                None => lines.extend(simple_item_text(map)),
            }

            for (key, child) in map {
                if key != "ingredients" {
                    collect_raw_strings(child, lines, depth + 1);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_raw_strings(item, lines, depth + 1);
            }
        }
        _ => {}
    }
}
