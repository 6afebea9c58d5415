mod common;

use menufeed::{
    fetch_and_normalize, fetch_categories, Endpoint, LocaleScope, Normalizer, StaticSource,
};
use serde_json::json;

use common::{
    configurable_products_response, deals_category_response, full_category_response,
    meals_response,
};

fn categories_query() -> menufeed::EntryQuery {
    Endpoint::Categories.query(Some(6), &LocaleScope::none(), "localeId")
}

#[tokio::test]
async fn single_promo_category_end_to_end() {
    let source = StaticSource::new().with_body("wrapperForCategories", deals_category_response());
    let index = fetch_categories(&source, &categories_query(), &Normalizer::standard())
        .await
        .expect("categories");

    assert_eq!(index.categories.len(), 1);
    let deals = &index.categories["deals"];
    assert_eq!(deals["navItem"]["type"], "promo");
    assert_eq!(deals["navItem"]["title"], "Deals");
    assert_eq!(
        deals["navItem"]["image"]["file"]["url"],
        "//images.example/nav-deals.png"
    );
    assert_eq!(deals["backgroundImage"], "//images.example/bg-deals.png");

    let tiles = deals["tiles"].as_array().expect("tiles list");
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0]["nextView"], "none");
    assert_eq!(
        tiles[0]["product"],
        json!({
            "id": "nuggets",
            "name": "Chicken Nuggets",
            "products": [{"id": "bbq", "name": "BBQ Sauce"}]
        })
    );
    assert!(index.issues.is_empty(), "{:?}", index.issues);
}

#[tokio::test]
async fn categories_keep_source_order_and_nest_subcategories() {
    let source = StaticSource::new().with_body("wrapperForCategories", full_category_response());
    let index = fetch_categories(&source, &categories_query(), &Normalizer::standard())
        .await
        .expect("categories");

    let keys: Vec<_> = index.categories.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["burgers", "drinks"]);

    let tile = &index.categories["burgers"]["tiles"][0];
    assert_eq!(
        tile["nextView"],
        json!({"currentCategory": "burgers", "currentView": "detail"})
    );
    assert!(tile.get("currentCategory").is_none());
    assert!(tile.get("currentView").is_none());

    let subcats = index.categories["drinks"]["subcats"]
        .as_array()
        .expect("subcats promoted to a list");
    assert_eq!(subcats.len(), 1);
    assert_eq!(subcats[0]["id"], "cold");
    assert!(subcats[0].get("navItem").is_none());
}

#[tokio::test]
async fn meals_are_merged_and_relabelled() {
    let source = StaticSource::new().with_body("meal", meals_response());
    let query = Endpoint::Meals.query(None, &LocaleScope::none(), "localeId");
    let batch = fetch_and_normalize(&source, &query, &Normalizer::standard())
        .await
        .expect("meals");

    assert_eq!(
        batch.into_value(),
        json!([
            {
                "id": "happy-meal",
                "items": {
                    "anchor": {"id": "hamburger", "name": "Hamburger"},
                    "side": "fries",
                    "drink": {"Soft Drinks": ["cola"], "Coffee & Tea": ["latte"]},
                    "toy": false
                }
            },
            {"id": "salad-meal", "items": {"anchor": "salad", "toy": true}}
        ])
    );
}

#[tokio::test]
async fn configurable_groups_become_single_key_maps() {
    let source = StaticSource::new().with_body("product", configurable_products_response());
    let query = Endpoint::Products.query(Some(6), &LocaleScope::none(), "localeId");
    let batch = fetch_and_normalize(&source, &query, &Normalizer::standard())
        .await
        .expect("products");

    assert_eq!(
        batch.records[0]["configurable"],
        json!([
            {"A": [{"id": "a1"}, {"id": "a2"}]},
            {"B": [{"id": "b1"}, {"id": "b2"}]}
        ])
    );
}

#[tokio::test]
async fn locale_scope_reaches_the_source() {
    let source = StaticSource::new().with_body("product", configurable_products_response());
    let scope = LocaleScope::locale("fr-CA").with_language("fr");
    let query = Endpoint::Products.query(Some(6), &scope, "localeId");
    fetch_and_normalize(&source, &query, &Normalizer::standard())
        .await
        .expect("products");

    let seen = source.queries();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].locale.as_deref(), Some("fr-CA"));
    assert_eq!(
        seen[0].field_filters,
        vec![("localeId".to_string(), "fr".to_string())]
    );
}
