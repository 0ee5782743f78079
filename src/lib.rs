//! # Grocery Aggregator
//!
//! Turns loosely structured meal-plan documents into grocery lists. Ingredient
//! strings and records are standardized into `(name, amount, unit)` triples,
//! merged per ingredient and unit, and rendered as human readable lines. Per-meal
//! shopping lists with typical default amounts are available as well.

pub mod config_errors;
pub mod grocery_aggregator;
pub mod grocery_config;
pub mod ingredient_model;
pub mod ingredient_standardizer;
pub mod meal_shopping_list;
pub mod measurement_patterns;
pub mod quantity;
pub mod shopping_list_cache;
pub mod unit_converter;

pub use config_errors::ConfigError;
pub use grocery_aggregator::GroceryAggregator;
pub use grocery_config::{load_rules, GroceryConfig, NormalizationRules};
pub use ingredient_model::{GroceryItem, MenuDocument, RawIngredient, ShoppingItem, StandardizedIngredient};
pub use ingredient_standardizer::IngredientStandardizer;
pub use meal_shopping_list::{MealShoppingList, MealShoppingListGenerator, MenuShoppingLists};
pub use shopping_list_cache::{CacheConfig, InMemoryShoppingListCache, ShoppingListCache};
