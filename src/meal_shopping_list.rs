//! # Meal Shopping List Module
//!
//! Builds one shopping list per meal and per snack of a structured menu
//! (`days[].meals[]` and `days[].snacks[]`). Ingredients listed without a
//! quantity receive a typical per-meal amount from the configured default
//! rules, so each list can be shopped for directly.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::grocery_aggregator::KNOWN_MENU_FIELDS;
use crate::grocery_config::NormalizationRules;
use crate::ingredient_model::{parse_json_text, MenuDocument, ShoppingItem, StandardizedIngredient};
use crate::ingredient_standardizer::IngredientStandardizer;
use crate::quantity::{format_amount, pluralize_unit};

// Wrapper layers followed before giving up on finding `days`
const MAX_UNWRAP_LAYERS: usize = 4;

const DAY_NUMBER_FIELDS: &[&str] = &["dayNumber", "day_number", "day"];

/// Shopping list for a single meal or snack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealShoppingList {
    /// Day number as given by the menu, or position + 1
    pub day: u64,
    /// Position of the day in the `days` array
    pub day_index: usize,
    /// Position among the retained meals (or among the snacks)
    pub meal_index: usize,
    pub is_snack: bool,
    pub title: String,
    pub meal_time: Option<String>,
    pub ingredients: Vec<ShoppingItem>,
}

/// Every per-meal shopping list of one menu
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuShoppingLists {
    pub menu_id: Option<String>,
    pub title: String,
    pub meal_lists: Vec<MealShoppingList>,
}

impl MenuShoppingLists {
    /// Lists of regular meals, in menu order
    pub fn meals(&self) -> impl Iterator<Item = &MealShoppingList> {
        self.meal_lists.iter().filter(|list| !list.is_snack)
    }

    /// Lists of snacks, in menu order
    pub fn snacks(&self) -> impl Iterator<Item = &MealShoppingList> {
        self.meal_lists.iter().filter(|list| list.is_snack)
    }
}

/// Generates per-meal shopping lists
#[derive(Debug, Clone, Default)]
pub struct MealShoppingListGenerator {
    standardizer: IngredientStandardizer,
}

impl MealShoppingListGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Arc<NormalizationRules>) -> Self {
        Self {
            standardizer: IngredientStandardizer::with_rules(rules),
        }
    }

    /// Build the shopping lists of every meal and snack in a menu
    ///
    /// Malformed days, meals and ingredients are skipped; the call never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_aggregator::meal_shopping_list::MealShoppingListGenerator;
    ///
    /// let menu = r#"{"menu_id": 7, "days": [{"meals": [
    ///     {"title": "Grilled chicken", "ingredients": ["chicken breast", "1 tsp paprika"]}
    /// ]}]}"#;
    ///
    /// let lists = MealShoppingListGenerator::new().generate_for_menu(menu);
    /// assert_eq!(lists.menu_id.as_deref(), Some("7"));
    ///
    /// let chicken = &lists.meal_lists[0].ingredients[0];
    /// assert_eq!(chicken.name, "Chicken breast");
    /// assert_eq!(chicken.quantity, "6 oz");
    /// ```
    pub fn generate_for_menu(&self, menu: impl Into<MenuDocument>) -> MenuShoppingLists {
        let Some(value) = menu.into().into_value() else {
            info!("No usable menu document, returning no meal lists");
            return MenuShoppingLists::default();
        };

        let mut lists = MenuShoppingLists::default();
        let menu = unwrap_menu(value, &mut lists);

        let Some(days) = menu.get("days").and_then(Value::as_array) else {
            warn!(menu_id = ?lists.menu_id, "Menu has no days array");
            return lists;
        };

        for (day_index, day) in days.iter().enumerate() {
            let Value::Object(day_map) = day else {
                warn!(day_index, "Skipping malformed day entry");
                continue;
            };
            let day_number = read_day_number(day_map).unwrap_or(day_index as u64 + 1);

            let meals = entries(day_map, "meals")
                .filter(|meal| !is_snack_meal_time(meal))
                .enumerate()
                .map(|(meal_index, meal)| {
                    self.meal_list(meal, day_number, day_index, meal_index, false)
                });
            let snacks = entries(day_map, "snacks")
                .enumerate()
                .map(|(meal_index, snack)| {
                    self.meal_list(snack, day_number, day_index, meal_index, true)
                });

            lists.meal_lists.extend(meals.chain(snacks));
        }

        info!(
            menu_id = ?lists.menu_id,
            meal_lists = lists.meal_lists.len(),
            "Generated per-meal shopping lists"
        );
        lists
    }

    fn meal_list(
        &self,
        meal: &Map<String, Value>,
        day: u64,
        day_index: usize,
        meal_index: usize,
        is_snack: bool,
    ) -> MealShoppingList {
        let title = ["title", "name"]
            .iter()
            .find_map(|field| meal.get(*field).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        let ingredients: Vec<ShoppingItem> = match meal.get("ingredients") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|entry| self.standardizer.standardize_value(entry))
                .filter(|ingredient| !ingredient.name.is_empty())
                .map(|ingredient| self.shopping_item(ingredient))
                .collect(),
            _ if is_snack && !title.is_empty() => {
                let text = match meal.get("quantity").or_else(|| meal.get("amount")) {
                    Some(Value::String(quantity)) => format!("{quantity} {title}"),
                    Some(Value::Number(quantity)) => format!("{quantity} {title}"),
                    _ => title.clone(),
                };
                vec![self.shopping_item(self.standardizer.standardize_text(&text))]
            }
            _ => Vec::new(),
        };

        debug!(
            day,
            meal_index,
            is_snack,
            ingredients = ingredients.len(),
            "Built meal shopping list for '{}'",
            title
        );

        MealShoppingList {
            day,
            day_index,
            meal_index,
            is_snack,
            title,
            meal_time: meal
                .get("meal_time")
                .and_then(Value::as_str)
                .map(str::to_string),
            ingredients,
        }
    }

    /// Display item for one standardized ingredient, with meal defaults applied
    pub fn shopping_item(&self, ingredient: StandardizedIngredient) -> ShoppingItem {
        let rules = self.standardizer.rules();
        let StandardizedIngredient {
            name,
            mut amount,
            mut unit,
        } = ingredient;

        if amount.is_none() {
            if let Some(rule) = rules.meal_default_for(&name) {
                debug!(ingredient = %name, amount = rule.amount, unit = %rule.unit, "Applying meal default");
                amount = Some(rule.amount);
                if !rule.unit.is_empty() {
                    unit = rule.unit.clone();
                }
            }
        }

        let quantity = match amount {
            Some(amount) => {
                let shown_unit = pluralize_unit(rules.display_unit(&name, &unit), amount);
                if shown_unit.is_empty() {
                    format_amount(amount)
                } else {
                    format!("{} {}", format_amount(amount), shown_unit)
                }
            }
            None if is_to_taste(&name) => "To taste".to_string(),
            None => "As needed".to_string(),
        };

        ShoppingItem {
            name: display_name(&name),
            quantity,
            unit,
            amount,
        }
    }
}

/// Follow string encodings and wrapper fields down to the object holding `days`
///
/// `menu_id` and `title` are taken from the outermost layer that has them.
fn unwrap_menu(mut current: Value, lists: &mut MenuShoppingLists) -> Value {
    for _ in 0..MAX_UNWRAP_LAYERS {
        if let Value::Object(map) = &current {
            if lists.menu_id.is_none() {
                lists.menu_id = ["menu_id", "id"].iter().find_map(|field| id_text(map.get(*field)));
            }
            if lists.title.is_empty() {
                lists.title = ["title", "nickname"]
                    .iter()
                    .find_map(|field| map.get(*field).and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_string();
            }
        }

        let next = match &current {
            Value::String(text) => parse_json_text(text),
            Value::Object(map) if !map.contains_key("days") => KNOWN_MENU_FIELDS
                .iter()
                .find_map(|field| map.get(*field).filter(|value| !value.is_null()))
                .cloned(),
            _ => None,
        };

        match next {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn read_day_number(day: &Map<String, Value>) -> Option<u64> {
    DAY_NUMBER_FIELDS.iter().find_map(|field| match day.get(*field)? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Object entries of an array field, skipping anything malformed
fn entries<'a>(
    map: &'a Map<String, Value>,
    field: &'a str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    map.get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(move |entry| {
            let object = entry.as_object();
            if object.is_none() {
                warn!(field = %field, "Skipping malformed entry: {}", entry);
            }
            object
        })
}

fn is_snack_meal_time(meal: &Map<String, Value>) -> bool {
    meal.get("meal_time")
        .and_then(Value::as_str)
        .is_some_and(|meal_time| meal_time.to_lowercase().starts_with("snack_"))
}

fn is_to_taste(name: &str) -> bool {
    name.contains("salt") || (name.contains("pepper") && !name.contains("bell"))
}

/// Capitalized display name, with the cooked qualifier in parentheses
fn display_name(name: &str) -> String {
    let name = match name.strip_suffix(" cooked") {
        Some(base) => format!("{base} (cooked)"),
        None => name.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
