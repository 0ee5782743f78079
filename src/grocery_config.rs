//! # Grocery Configuration Module
//!
//! This module defines the normalization tables used by the ingredient
//! standardizer, the grocery aggregator and the per-meal generator.
//!
//! The tables are loaded from a single JSON document and compiled once into a
//! [`NormalizationRules`] value, which is immutable and shared through an `Arc`.
//! A built-in document is embedded in the crate and used when no other
//! configuration is supplied.
//!
//! ## Document keys
//!
//! - `fillers`: regex patterns removed from ingredient names ("a pinch of")
//! - `descriptors`: regex patterns for adjectives removed from names ("fresh")
//! - `units`: alias → canonical unit map
//! - `default_units`: name substring → unit applied when no unit is present
//! - `regex_replacements`: pattern → replacement for typos and synonyms
//! - `count_items`: name patterns whose unit is always a plain count
//! - `display_units`: name substring → unit used when rendering count quantities
//! - `meal_defaults`: ordered default amount rules for per-meal lists
//!
//! Maps whose order matters (`default_units`, `regex_replacements`,
//! `display_units`) keep their document order.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::config_errors::ConfigError;

/// Built-in configuration document
pub const DEFAULT_CONFIG_JSON: &str = include_str!("../config/ingredient_config.json");

/// Environment variable pointing at an alternative configuration document
pub const CONFIG_PATH_ENV_VAR: &str = "GROCERY_CONFIG_PATH";

lazy_static! {
    static ref BUILTIN_RULES: Arc<NormalizationRules> = Arc::new(
        GroceryConfig::builtin()
            .compile()
            .expect("Built-in ingredient configuration should compile")
    );
}

/// Raw configuration document, as read from JSON
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GroceryConfig {
    #[serde(default)]
    pub fillers: Vec<String>,
    #[serde(default)]
    pub descriptors: Vec<String>,
    #[serde(default)]
    pub units: HashMap<String, String>,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub default_units: Vec<(String, String)>,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub regex_replacements: Vec<(String, String)>,
    #[serde(default)]
    pub count_items: Vec<String>,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub display_units: Vec<(String, String)>,
    #[serde(default)]
    pub meal_defaults: Vec<MealDefaultRule>,
}

/// Default amount rule for ingredients listed without a quantity
///
/// A rule matches a name when the name contains every `all` substring, at least
/// one `any` substring (if any are listed) and none of the `none` substrings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MealDefaultRule {
    #[serde(default)]
    pub all: Vec<String>,
    #[serde(default)]
    pub any: Vec<String>,
    #[serde(default)]
    pub none: Vec<String>,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

impl MealDefaultRule {
    /// Check whether this rule applies to a standardized ingredient name
    pub fn matches(&self, name: &str) -> bool {
        self.all.iter().all(|needle| name.contains(needle.as_str()))
            && (self.any.is_empty() || self.any.iter().any(|needle| name.contains(needle.as_str())))
            && !self.none.iter().any(|needle| name.contains(needle.as_str()))
    }
}

impl GroceryConfig {
    /// Parse the embedded configuration document
    pub fn builtin() -> Self {
        Self::from_json_str(DEFAULT_CONFIG_JSON)
            .expect("Built-in ingredient configuration should be valid JSON")
    }

    /// Parse a configuration document from a JSON string
    ///
    /// Missing keys default to empty tables.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_aggregator::grocery_config::GroceryConfig;
    ///
    /// let config = GroceryConfig::from_json_str(r#"{"units": {"cups": "cup"}}"#)?;
    /// assert_eq!(config.units.get("cups").map(String::as_str), Some("cup"));
    /// assert!(config.fillers.is_empty());
    /// # Ok::<(), grocery_aggregator::config_errors::ConfigError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration document from disk
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading ingredient configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Compile the pattern tables into a reusable rule set
    pub fn compile(&self) -> Result<NormalizationRules, ConfigError> {
        let rules = NormalizationRules {
            fillers: compile_patterns("fillers", &self.fillers)?,
            descriptors: compile_patterns("descriptors", &self.descriptors)?,
            units: self
                .units
                .iter()
                .map(|(alias, canonical)| (alias.trim().to_lowercase(), canonical.trim().to_lowercase()))
                .collect(),
            default_units: self.default_units.clone(),
            replacements: self
                .regex_replacements
                .iter()
                .map(|(pattern, replacement)| {
                    compile_pattern("regex_replacements", pattern)
                        .map(|regex| (regex, replacement.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            count_items: compile_patterns("count_items", &self.count_items)?,
            display_units: self.display_units.clone(),
            meal_defaults: self.meal_defaults.clone(),
        };

        debug!(
            "Compiled ingredient configuration: {} fillers, {} descriptors, {} unit aliases, {} replacements",
            rules.fillers.len(),
            rules.descriptors.len(),
            rules.units.len(),
            rules.replacements.len()
        );

        Ok(rules)
    }
}

/// Compiled, immutable normalization tables
#[derive(Debug, Clone)]
pub struct NormalizationRules {
    fillers: Vec<Regex>,
    descriptors: Vec<Regex>,
    units: HashMap<String, String>,
    default_units: Vec<(String, String)>,
    replacements: Vec<(Regex, String)>,
    count_items: Vec<Regex>,
    display_units: Vec<(String, String)>,
    meal_defaults: Vec<MealDefaultRule>,
}

impl NormalizationRules {
    /// Shared rules compiled from the built-in configuration
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN_RULES)
    }

    pub fn fillers(&self) -> &[Regex] {
        &self.fillers
    }

    pub fn descriptors(&self) -> &[Regex] {
        &self.descriptors
    }

    /// Look up the canonical unit for an alias such as "Tbsp." or "cups"
    ///
    /// Lookup is case-insensitive, ignores a trailing period and falls back to
    /// the singular form when the plural is not listed.
    pub fn lookup_unit(&self, token: &str) -> Option<&str> {
        let cleaned = clean_unit_token(token);
        if cleaned.is_empty() {
            return None;
        }
        self.units
            .get(cleaned.as_str())
            .or_else(|| cleaned.strip_suffix('s').and_then(|singular| self.units.get(singular)))
            .map(String::as_str)
    }

    /// Check whether a token is a known unit alias
    pub fn is_unit_alias(&self, token: &str) -> bool {
        self.lookup_unit(token).is_some()
    }

    /// Normalize a unit token, keeping unknown tokens as lower-cased text
    pub fn canonical_unit(&self, token: &str) -> String {
        self.lookup_unit(token)
            .map(str::to_string)
            .unwrap_or_else(|| clean_unit_token(token))
    }

    /// Default unit for a name, taken from the first matching substring
    pub fn default_unit_for(&self, name: &str) -> Option<&str> {
        first_substring_match(&self.default_units, name)
    }

    /// Apply the typo and synonym replacements in order
    pub fn apply_replacements(&self, name: &str) -> String {
        self.replacements
            .iter()
            .fold(name.to_string(), |current, (pattern, replacement)| {
                pattern.replace_all(&current, replacement.as_str()).into_owned()
            })
    }

    /// Check whether a name is always counted without a unit
    pub fn is_count_item(&self, name: &str) -> bool {
        self.count_items.iter().any(|pattern| pattern.is_match(name))
    }

    /// Unit used when rendering a counted quantity of this ingredient
    pub fn display_unit_for(&self, name: &str) -> Option<&str> {
        first_substring_match(&self.display_units, name)
    }

    /// Unit to show for an aggregated quantity
    ///
    /// Count-like units ("", piece, clove, leaf) are replaced by the
    /// ingredient's display unit when one is configured ("3 cloves garlic").
    pub fn display_unit<'a>(&'a self, name: &str, unit: &'a str) -> &'a str {
        if matches!(unit, "" | "piece" | "clove" | "leaf") {
            self.display_unit_for(name).unwrap_or(unit)
        } else {
            unit
        }
    }

    /// First meal default rule matching the name
    pub fn meal_default_for(&self, name: &str) -> Option<&MealDefaultRule> {
        self.meal_defaults.iter().find(|rule| rule.matches(name))
    }
}

/// Resolve the normalization rules for a process
///
/// An explicit path wins, then the `GROCERY_CONFIG_PATH` environment variable,
/// then the built-in configuration.
pub fn load_rules(path: Option<&Path>) -> Result<Arc<NormalizationRules>, ConfigError> {
    if let Some(path) = path {
        return Ok(Arc::new(GroceryConfig::from_path(path)?.compile()?));
    }

    match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(env_path) if !env_path.trim().is_empty() => {
            let config = GroceryConfig::from_path(Path::new(env_path.trim()))?;
            Ok(Arc::new(config.compile()?))
        }
        _ => {
            debug!("Using built-in ingredient configuration");
            Ok(NormalizationRules::builtin())
        }
    }
}

fn clean_unit_token(token: &str) -> String {
    token.trim().trim_end_matches('.').to_lowercase()
}

fn first_substring_match<'a>(table: &'a [(String, String)], name: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(needle, _)| name.contains(needle.as_str()))
        .map(|(_, unit)| unit.as_str())
}

fn compile_pattern(table: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        table,
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_patterns(table: &'static str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| compile_pattern(table, pattern))
        .collect()
}

/// Deserialize a JSON object into key/value pairs, keeping document order
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of string keys to string values")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                pairs.push((key, value));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}
