//! # Ingredient Data Model
//!
//! This module defines the transient shapes that flow through the grocery
//! pipeline: raw ingredients as they appear in menu documents, standardized
//! `(name, amount, unit)` triples, the aggregation accumulator and the
//! display items returned to callers.
//!
//! ## Core Concepts
//!
//! - **RawIngredient**: free text ("2 cups milk") or a record (`{"name": ..., "quantity": ...}`)
//! - **StandardizedIngredient**: canonical name, optional amount, canonical unit
//! - **AggregationKey**: the `(name, unit)` pair quantities are summed under
//! - **Accumulator**: running totals per key, keeping "unspecified" distinct from zero
//! - **GroceryItem** / **ShoppingItem**: display-ready output rows
//!
//! ## Usage
//!
//! ```rust
//! use grocery_aggregator::ingredient_model::{Accumulator, StandardizedIngredient};
//!
//! let mut accumulator = Accumulator::new();
//! accumulator.add(StandardizedIngredient::new("milk").with_amount(1.0).with_unit("cup"));
//! accumulator.add(StandardizedIngredient::new("milk").with_amount(2.0).with_unit("cup"));
//!
//! let (key, total) = accumulator.iter().next().unwrap();
//! assert_eq!(key.name, "milk");
//! assert_eq!(total, Some(3.0));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::quantity::format_amount;

/// Ingredient record as produced by the upstream meal-plan generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredIngredient {
    /// Ingredient name (falls back to the `ingredient` field)
    pub name: Option<String>,
    /// Raw quantity, read from `quantity` then `amount`
    pub quantity: Option<Value>,
    /// Raw unit text
    pub unit: Option<String>,
}

/// One ingredient occurrence before standardization
#[derive(Debug, Clone, PartialEq)]
pub enum RawIngredient {
    /// Free-text ingredient line
    Text(String),
    /// Semi-structured ingredient record
    Structured(StructuredIngredient),
}

impl StructuredIngredient {
    /// Build a record from a JSON object, ignoring unknown fields
    pub fn from_object(map: &serde_json::Map<String, Value>) -> Self {
        let name = ["name", "ingredient"]
            .iter()
            .find_map(|field| map.get(*field).and_then(scalar_text));
        let quantity = ["quantity", "amount"]
            .iter()
            .find_map(|field| map.get(*field).filter(|value| !value.is_null()))
            .cloned();
        let unit = map.get("unit").and_then(scalar_text);

        Self {
            name,
            quantity,
            unit,
        }
    }

    /// All textual content of the record joined with spaces
    pub fn raw_text(&self) -> String {
        let quantity = self.quantity.as_ref().and_then(scalar_text);
        [self.name.clone(), quantity, self.unit.clone()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl RawIngredient {
    /// Classify an arbitrary JSON value
    ///
    /// Strings become text, objects become records, `null` becomes empty text
    /// and every other value is coerced to its JSON text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => RawIngredient::Text(text.clone()),
            Value::Object(map) => RawIngredient::Structured(StructuredIngredient::from_object(map)),
            Value::Null => RawIngredient::Text(String::new()),
            other => {
                warn!("Coercing unexpected ingredient value to text: {}", other);
                RawIngredient::Text(other.to_string())
            }
        }
    }

    /// Original text of the ingredient, used for phrase detection ("to taste")
    pub fn raw_text(&self) -> String {
        match self {
            RawIngredient::Text(text) => text.clone(),
            RawIngredient::Structured(record) => record.raw_text(),
        }
    }
}

impl From<&str> for RawIngredient {
    fn from(text: &str) -> Self {
        RawIngredient::Text(text.to_string())
    }
}

impl From<&Value> for RawIngredient {
    fn from(value: &Value) -> Self {
        RawIngredient::from_value(value)
    }
}

/// Text of a scalar JSON value; `None` for null, arrays and objects
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Canonical `(name, amount, unit)` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedIngredient {
    /// Lower-cased, sanitized ingredient name
    pub name: String,
    /// Parsed amount; `None` when no quantity could be read
    pub amount: Option<f64>,
    /// Canonical unit; empty for plain counts
    pub unit: String,
}

impl StandardizedIngredient {
    /// Create an ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            amount: None,
            unit: String::new(),
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Check if this ingredient carries a parsed amount
    pub fn has_amount(&self) -> bool {
        self.amount.is_some()
    }

    /// Aggregation key of this ingredient
    pub fn key(&self) -> AggregationKey {
        AggregationKey {
            name: self.name.clone(),
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for StandardizedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(amount) = self.amount {
            write!(f, "{} ", format_amount(amount))?;
            if !self.unit.is_empty() {
                write!(f, "{} ", self.unit)?;
            }
        }
        write!(f, "{}", self.name)
    }
}

/// Key under which repeated ingredient occurrences are merged
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregationKey {
    pub name: String,
    pub unit: String,
}

impl AggregationKey {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Running totals per aggregation key
///
/// A key maps to `None` while every occurrence lacked an amount. Once any
/// occurrence carries an amount the key holds a number, and later occurrences
/// without an amount leave that number untouched.
///
/// Iteration follows key order, so the result does not depend on the order in
/// which occurrences were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    totals: BTreeMap<AggregationKey, Option<f64>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a standardized ingredient into the totals
    pub fn add(&mut self, ingredient: StandardizedIngredient) {
        let key = ingredient.key();
        self.add_amount(key, ingredient.amount);
    }

    /// Fold an amount into the total for `key`
    pub fn add_amount(&mut self, key: AggregationKey, amount: Option<f64>) {
        let total = self.totals.entry(key).or_insert(None);
        if let Some(amount) = amount {
            *total = Some(total.unwrap_or(0.0) + amount);
        }
    }

    /// Total for a key: `None` if the key is absent, `Some(None)` if unspecified
    pub fn get(&self, key: &AggregationKey) -> Option<Option<f64>> {
        self.totals.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AggregationKey, Option<f64>)> {
        self.totals.iter().map(|(key, total)| (key, *total))
    }
}

/// One line of the aggregated grocery list
///
/// The amount and unit are folded into `name`; `quantity` stays empty for
/// consumers that expect the combined display line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub name: String,
    pub quantity: String,
}

impl GroceryItem {
    /// Wrap a rendered display line
    pub fn from_display_line(line: impl Into<String>) -> Self {
        Self {
            name: line.into(),
            quantity: String::new(),
        }
    }
}

impl fmt::Display for GroceryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One ingredient of a single meal's shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Capitalized display name
    pub name: String,
    /// Human formatted quantity ("6 oz", "To taste", "As needed")
    pub quantity: String,
    /// Canonical unit; empty for plain counts
    pub unit: String,
    /// Amount after defaults were applied
    pub amount: Option<f64>,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.quantity)
    }
}

/// Menu document as received from a caller
///
/// Callers may hand over nothing, raw JSON text or an already parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuDocument {
    Missing,
    Raw(String),
    Parsed(Value),
}

impl MenuDocument {
    /// Parsed JSON value of the document; `None` when missing or unparseable
    pub fn into_value(self) -> Option<Value> {
        match self {
            MenuDocument::Missing => None,
            MenuDocument::Raw(text) => parse_json_text(&text),
            MenuDocument::Parsed(Value::Null) => None,
            MenuDocument::Parsed(value) => Some(value),
        }
    }
}

impl From<&str> for MenuDocument {
    fn from(text: &str) -> Self {
        MenuDocument::Raw(text.to_string())
    }
}

impl From<String> for MenuDocument {
    fn from(text: String) -> Self {
        MenuDocument::Raw(text)
    }
}

impl From<Value> for MenuDocument {
    fn from(value: Value) -> Self {
        MenuDocument::Parsed(value)
    }
}

impl From<&Value> for MenuDocument {
    fn from(value: &Value) -> Self {
        MenuDocument::Parsed(value.clone())
    }
}

impl<T: Into<MenuDocument>> From<Option<T>> for MenuDocument {
    fn from(value: Option<T>) -> Self {
        value.map_or(MenuDocument::Missing, Into::into)
    }
}

/// Parse JSON text, logging instead of failing
pub fn parse_json_text(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Failed to parse menu document as JSON: {}", err);
            None
        }
    }
}
