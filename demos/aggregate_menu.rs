//! # Grocery Aggregation Examples
//!
//! Walks through standardizing ingredients, aggregating a weekly menu and
//! building per-meal shopping lists.

use grocery_aggregator::ingredient_standardizer::IngredientStandardizer;
use grocery_aggregator::shopping_list_cache::{CacheConfig, InMemoryShoppingListCache};
use grocery_aggregator::{GroceryAggregator, MealShoppingListGenerator};

const MENU: &str = r#"{
  "menu_id": "demo-week",
  "title": "Demo week",
  "days": [
    {
      "dayNumber": 1,
      "meals": [
        {
          "title": "Garlic chicken",
          "meal_time": "dinner",
          "ingredients": [
            {"name": "Chicken Breasts", "quantity": "2", "unit": "pieces"},
            {"name": "Garlic", "quantity": "3"},
            "2 tbsp extra-virgin olive oil",
            "salt to taste",
            "1 cup cooked rice"
          ]
        },
        {"title": "Apple", "meal_time": "snack_1", "quantity": "1"}
      ],
      "snacks": [{"title": "Apple", "quantity": "1"}]
    },
    {
      "dayNumber": 2,
      "meals": [
        {
          "title": "Omelette",
          "meal_time": "breakfast",
          "ingredients": [
            {"name": "Eggs", "quantity": "3"},
            "1/4 cup shredded cheddar",
            "1 tablespoon butter",
            "1 cup 2 tbsp milk"
          ]
        }
      ]
    }
  ]
}"#;

fn main() {
    println!("🛒 Grocery Aggregation Examples\n");

    // Example 1: Standardizing single ingredients
    println!("📝 Example 1: Standardizing ingredients");
    let standardizer = IngredientStandardizer::new();
    for text in ["1/2 cup milk", "3 cloves garlic, minced", "a pinch of salt", "2-3 carrots"] {
        let ingredient = standardizer.standardize_text(text);
        println!(
            "  • {:<28} -> name='{}' amount={:?} unit='{}'",
            text, ingredient.name, ingredient.amount, ingredient.unit
        );
    }
    println!();

    // Example 2: Aggregating a whole menu
    println!("📝 Example 2: Aggregated grocery list");
    let aggregator = GroceryAggregator::new();
    for item in aggregator.aggregate(MENU) {
        println!("  • {}", item);
    }
    println!();

    // Example 3: Per-meal shopping lists
    println!("📝 Example 3: Per-meal shopping lists");
    let lists = MealShoppingListGenerator::new().generate_for_menu(MENU);
    for meal in &lists.meal_lists {
        let kind = if meal.is_snack { "snack" } else { "meal" };
        println!("  Day {} {} #{}: {}", meal.day, kind, meal.meal_index, meal.title);
        for item in &meal.ingredients {
            println!("    - {}", item);
        }
    }
    println!();

    // Example 4: Caching aggregated lists
    println!("📝 Example 4: Cached aggregation");
    let cache = InMemoryShoppingListCache::new(CacheConfig::default());
    let first = aggregator.aggregate_cached(&cache, "demo-week", MENU);
    let second = aggregator.aggregate_cached(&cache, "demo-week", "not even json");
    println!("  Cached list reused: {}", first == second);
}
