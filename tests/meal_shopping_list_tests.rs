use grocery_aggregator::meal_shopping_list::{MealShoppingListGenerator, MenuShoppingLists};
use serde_json::json;

fn generate(menu: serde_json::Value) -> MenuShoppingLists {
    let _ = env_logger::builder().is_test(true).try_init();
    MealShoppingListGenerator::new().generate_for_menu(menu)
}

#[test]
fn test_snack_meals_are_taken_from_snacks_array() {
    let lists = generate(json!({"days": [{
        "dayNumber": 1,
        "meals": [
            {"title": "Oatmeal", "meal_time": "breakfast", "ingredients": ["1 cup oats"]},
            {"title": "Apple", "meal_time": "Snack_1", "quantity": "1"},
            {"title": "Salad", "meal_time": "lunch", "ingredients": ["2 cups spinach"]}
        ],
        "snacks": [{"title": "Apple", "meal_time": "snack_1", "quantity": "1"}]
    }]}));

    let meals: Vec<(&str, usize)> = lists.meals().map(|m| (m.title.as_str(), m.meal_index)).collect();
    assert_eq!(meals, vec![("Oatmeal", 0), ("Salad", 1)]);

    let snacks: Vec<_> = lists.snacks().collect();
    assert_eq!(snacks.len(), 1);
    assert_eq!(snacks[0].title, "Apple");
    assert_eq!(snacks[0].meal_index, 0);
    assert_eq!(snacks[0].ingredients.len(), 1);
    assert_eq!(snacks[0].ingredients[0].name, "Apple");
    assert_eq!(snacks[0].ingredients[0].quantity, "1");
}

#[test]
fn test_default_amounts_for_unquantified_ingredients() {
    let lists = generate(json!({"days": [{"meals": [{"title": "Dinner", "ingredients": [
        "chicken breasts",
        "salmon fillet",
        "garlic",
        "garlic powder",
        "parmesan cheese",
        "feta",
        "cream cheese",
        "olive oil",
        "brown rice",
        "onion",
        "eggs",
        "cilantro",
        "black pepper"
    ]}]}]}));

    let quantities: Vec<(&str, &str)> = lists.meal_lists[0]
        .ingredients
        .iter()
        .map(|item| (item.name.as_str(), item.quantity.as_str()))
        .collect();

    assert_eq!(
        quantities,
        vec![
            ("Chicken breast", "6 oz"),
            ("Salmon fillet", "6 oz"),
            ("Garlic", "2 cloves"),
            ("Garlic powder", "As needed"),
            ("Parmesan", "2 tbsp"),
            ("Feta", "2 tbsp"),
            ("Cream cheese", "2 tbsp"),
            ("Olive oil", "2 tbsp"),
            ("Brown rice", "1 cup"),
            ("Onion", "1"),
            ("Egg", "2"),
            ("Cilantro", "As needed"),
            ("Black pepper", "To taste"),
        ]
    );
}

#[test]
fn test_explicit_quantities_are_kept() {
    let lists = generate(json!({"days": [{"meals": [{"title": "Steak night", "ingredients": [
        {"name": "ribeye steak", "quantity": "12", "unit": "oz"},
        "1 1/2 cups cooked rice"
    ]}]}]}));

    let items = &lists.meal_lists[0].ingredients;
    assert_eq!(items[0].quantity, "12 oz");
    assert_eq!(items[0].amount, Some(12.0));
    assert_eq!(items[1].name, "Rice (cooked)");
    assert_eq!(items[1].quantity, "1 1/2 cups");
    assert_eq!(items[1].unit, "cup");
}

#[test]
fn test_menu_metadata_and_indices() {
    let lists = generate(json!({"meal_plan": {
        "menu_id": "m-1",
        "title": "Busy week",
        "days": [
            {"day": 1, "meals": [{"title": "A", "ingredients": []}]},
            {"day_number": 5, "meals": [{"title": "B", "ingredients": []}, "broken", {"title": "C"}]}
        ]
    }}));

    assert_eq!(lists.menu_id.as_deref(), Some("m-1"));
    assert_eq!(lists.title, "Busy week");

    let layout: Vec<(u64, usize, usize, &str)> = lists
        .meal_lists
        .iter()
        .map(|m| (m.day, m.day_index, m.meal_index, m.title.as_str()))
        .collect();
    assert_eq!(layout, vec![(1, 0, 0, "A"), (5, 1, 0, "B"), (5, 1, 1, "C")]);
    assert!(lists.meal_lists[2].ingredients.is_empty());
}

#[test]
fn test_malformed_menus_produce_no_lists() {
    for menu in [json!(null), json!("{broken"), json!([1, 2]), json!({"days": "monday"})] {
        assert!(generate(menu).meal_lists.is_empty());
    }
}

#[test]
fn test_lists_serialize_to_json() {
    let lists = generate(json!({"days": [{"meals": [{"title": "Toast", "ingredients": ["1 slice bread"]}]}]}));
    let value = serde_json::to_value(&lists).unwrap();

    assert_eq!(value["meal_lists"][0]["title"], "Toast");
    assert_eq!(value["meal_lists"][0]["ingredients"][0]["quantity"], "1 slice");
    assert_eq!(value["meal_lists"][0]["is_snack"], false);
}
