//! # Aggregator Integration Tests
//!
//! End-to-end aggregation of menu documents into grocery lists, including
//! malformed input and the fallback paths.

use grocery_aggregator::grocery_aggregator::GroceryAggregator;
use grocery_aggregator::ingredient_model::{GroceryItem, MenuDocument};
use grocery_aggregator::shopping_list_cache::{CacheConfig, InMemoryShoppingListCache, ShoppingListCache};
use serde_json::{json, Value};

fn aggregate(menu: impl Into<MenuDocument>) -> Vec<String> {
    let _ = env_logger::builder().is_test(true).try_init();
    GroceryAggregator::new()
        .aggregate(menu)
        .into_iter()
        .map(|item| item.name)
        .collect()
}

fn meal_with(ingredients: Value) -> Value {
    json!({"days": [{"dayNumber": 1, "meals": [{"title": "Meal", "ingredients": ingredients}]}]})
}

#[test]
fn test_repeated_eggs_are_combined() {
    let menu = json!({"days": [{"dayNumber": 1, "meals": [{"title": "Omelette", "ingredients": [
        {"name": "Eggs", "quantity": "3"},
        {"name": "Eggs", "quantity": "2"}
    ]}]}]});

    assert_eq!(aggregate(menu), vec!["5 egg"]);
}

#[test]
fn test_garlic_display_uses_cloves() {
    let menu = meal_with(json!([{"name": "Garlic", "quantity": "3"}]));
    assert_eq!(aggregate(menu), vec!["3 cloves garlic"]);
}

#[test]
fn test_malformed_input_returns_empty() {
    assert!(aggregate("{invalid json").is_empty());
    assert!(aggregate(MenuDocument::Missing).is_empty());
    assert!(aggregate(None::<String>).is_empty());
    assert!(aggregate(json!({})).is_empty());
    assert!(aggregate("not json").is_empty());
    assert!(aggregate(json!([1, 2, 3])).is_empty());
    assert!(aggregate(json!(null)).is_empty());
    assert!(aggregate(json!({"days": [{"meals": [{"ingredients": "eggs"}]}]})).is_empty());
}

#[test]
fn test_deeply_nested_garbage_never_fails() {
    let mut value = json!([{"ingredients": [null, 4, {"name": {"nested": true}}]}]);
    for depth in 0..300 {
        value = if depth % 2 == 0 {
            json!({ "level": value, "title": 7 })
        } else {
            json!([value, "noise"])
        };
    }
    let items = GroceryAggregator::new().aggregate(value);
    assert!(items.iter().all(|item: &GroceryItem| item.quantity.is_empty()));
}

#[test]
fn test_order_does_not_change_totals() {
    let forward = meal_with(json!([
        {"name": "flour", "quantity": "1 cup"},
        {"name": "flour", "quantity": "2 cup"},
        "1 tbsp sugar",
        {"name": "milk", "quantity": "1/2", "unit": "cup"}
    ]));
    let backward = meal_with(json!([
        {"name": "milk", "quantity": "1/2", "unit": "cup"},
        "1 tbsp sugar",
        {"name": "flour", "quantity": "2 cup"},
        {"name": "flour", "quantity": "1 cup"}
    ]));

    let forward = aggregate(forward);
    assert_eq!(forward, aggregate(backward));
    assert_eq!(forward, vec!["3 cups flour", "1/2 cup milk", "1 tbsp sugar"]);
}

#[test]
fn test_missing_quantities_keep_later_amounts() {
    let menu = meal_with(json!([
        {"name": "basil"},
        {"name": "basil", "quantity": "2", "unit": "bunch"},
        {"name": "basil", "unit": "bunch"},
        {"name": "basil", "quantity": "1", "unit": "bunch"},
        "fresh thyme",
        "thyme"
    ]));

    assert_eq!(aggregate(menu), vec!["basil", "3 bunches basil", "thyme"]);
}

#[test]
fn test_units_are_not_merged_across_keys() {
    let menu = meal_with(json!(["1 cup milk", "100 ml milk"]));
    assert_eq!(aggregate(menu), vec!["1 cup milk", "100 ml milk"]);
}

#[test]
fn test_display_formatting() {
    let menu = meal_with(json!([
        "salt to taste",
        "1 cup cooked rice",
        "1/2 cup cooked rice",
        "2 lettuce leaves",
        "1 1/2 cups shredded cheddar",
        "3 slices bacon",
        {"name": "lemon"}
    ]));

    assert_eq!(
        aggregate(menu),
        vec![
            "3 slices bacon",
            "1 1/2 cups cheddar cheese",
            "lemon",
            "2 leaves lettuce",
            "1 1/2 cups rice (cooked)",
            "Salt    To taste",
        ]
    );
}

#[test]
fn test_aggregator_output_has_empty_quantity() {
    let items = GroceryAggregator::new().aggregate(meal_with(json!(["2 cups milk"])));
    assert_eq!(items, vec![GroceryItem { name: "2 cups milk".to_string(), quantity: String::new() }]);
}

#[test]
fn test_string_encoded_meal_plan_json() {
    let inner = meal_with(json!(["2 cups milk", "1 cup milk"]));
    let menu = json!({"id": 12, "meal_plan_json": inner.to_string()});
    assert_eq!(aggregate(menu), vec!["3 cups milk"]);
}

#[test]
fn test_meal_plan_is_not_double_counted() {
    let plan = meal_with(json!(["1 cup oats"]));
    let menu = json!({"meal_plan": plan.clone(), "meal_plan_json": plan.to_string()});
    assert_eq!(aggregate(menu), vec!["1 cup oats"]);
}

#[test]
fn test_double_encoded_document() {
    let inner = meal_with(json!(["2 tbsp honey"])).to_string();
    let encoded = serde_json::to_string(&inner).unwrap();
    assert_eq!(aggregate(encoded), vec!["2 tbsp honey"]);
}

#[test]
fn test_snacks_as_simple_items() {
    let menu = json!({"days": [{"snacks": [
        {"title": "Banana", "quantity": "1"},
        {"title": "Banana", "quantity": 2}
    ]}]});
    assert_eq!(aggregate(menu), vec!["3 banana"]);
}

#[test]
fn test_snack_with_nested_metadata_is_listed() {
    let menu = json!({"days": [{
        "meals": [{"title": "Porridge", "ingredients": ["1 cup oats"]}],
        "snacks": [{"title": "Greek yogurt", "quantity": "1 cup", "macros": {"protein": 15}}]
    }]});
    assert_eq!(aggregate(menu), vec!["1 cup greek yogurt", "1 cup oats"]);
}

#[test]
fn test_ranges_are_aggregated_at_midpoint() {
    let menu = meal_with(json!(["1 to 2 cups flour", "2-3 cups flour"]));
    assert_eq!(aggregate(menu), vec!["4 cups flour"]);
}

#[test]
fn test_bare_measure_is_not_dropped() {
    assert_eq!(aggregate(meal_with(json!(["2 cups"]))), vec!["2 cups"]);
}

#[test]
fn test_raw_text_fallback() {
    let menu = meal_with(json!(["(optional)", {"item": "Sugar", "quantity": "1 cup"}]));
    assert_eq!(aggregate(menu), vec!["(optional)", "1 cup Sugar"]);
}

#[test]
fn test_cached_aggregation() {
    let aggregator = GroceryAggregator::new();
    let cache = InMemoryShoppingListCache::new(CacheConfig::default());

    let first = aggregator.aggregate_cached(&cache, "menu-1", meal_with(json!(["1 cup rice"])));
    assert_eq!(first.len(), 1);

    let cached = aggregator.aggregate_cached(&cache, "menu-1", meal_with(json!(["5 cups rice"])));
    assert_eq!(cached, first);

    cache.invalidate("menu-1");
    let fresh = aggregator.aggregate_cached(&cache, "menu-1", meal_with(json!(["5 cups rice"])));
    assert_eq!(fresh[0].name, "5 cups rice");

    let empty = aggregator.aggregate_cached(&cache, "menu-2", "{invalid json");
    assert!(empty.is_empty());
    assert!(cache.get("menu-2").is_none());
}
