//! Delivery-API response fixtures shared by the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn link(id: &str) -> Value {
    json!({"sys": {"type": "Link", "linkType": "Entry", "id": id}})
}

pub fn asset_link(id: &str) -> Value {
    json!({"sys": {"type": "Link", "linkType": "Asset", "id": id}})
}

pub fn entry(id: &str, content_type: &str, fields: Value) -> Value {
    json!({
        "sys": {"id": id, "type": "Entry", "contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": content_type}}},
        "fields": fields
    })
}

pub fn asset(id: &str, url: &str) -> Value {
    json!({
        "sys": {"id": id, "type": "Asset"},
        "fields": {"title": id, "file": {"url": url, "contentType": "image/png"}}
    })
}

pub fn response(items: Vec<Value>, entries: Vec<Value>, assets: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "sys": {"type": "Array"},
        "total": total,
        "skip": 0,
        "limit": 100,
        "items": items,
        "includes": {"Entry": entries, "Asset": assets}
    })
}

/// One category ("deals") with a promo nav item, a background image and a
/// single tile whose transition is disabled.
pub fn deals_category_response() -> Value {
    response(
        vec![entry(
            "wrapper",
            "wrapperForCategories",
            json!({"internalTitle": "Main menu", "categories": [link("cat-deals")]}),
        )],
        vec![
            entry(
                "cat-deals",
                "category",
                json!({
                    "id": "deals",
                    "internalTitle": "Deals category",
                    "navItemType": "promo",
                    "navItemTitle": "Deals",
                    "navImg": asset_link("nav-deals"),
                    "backgroundImage": asset_link("bg-deals"),
                    "tiles": [link("tile-1")]
                }),
            ),
            entry(
                "tile-1",
                "tile",
                json!({"id": "tile-1", "currentCategory": "none", "product": link("prod-nuggets")}),
            ),
            entry(
                "prod-nuggets",
                "product",
                json!({
                    "id": "nuggets",
                    "internalTitle": "Nuggets (authoring)",
                    "name": "Chicken Nuggets",
                    "products": [link("prod-sauce")]
                }),
            ),
            entry("prod-sauce", "product", json!({"id": "bbq", "name": "BBQ Sauce"})),
        ],
        vec![
            asset("nav-deals", "//images.example/nav-deals.png"),
            asset("bg-deals", "//images.example/bg-deals.png"),
        ],
    )
}

/// A menu with two categories, the second holding a subcategory container
/// and tiles that navigate.
pub fn full_category_response() -> Value {
    response(
        vec![entry(
            "wrapper",
            "wrapperForCategories",
            json!({"categories": [link("cat-burgers"), link("cat-drinks")]}),
        )],
        vec![
            entry(
                "cat-burgers",
                "category",
                json!({
                    "id": "burgers",
                    "navItemType": "menu",
                    "navItemTitle": "Burgers",
                    "tiles": [link("tile-bigmac")]
                }),
            ),
            entry(
                "tile-bigmac",
                "tile",
                json!({
                    "id": "tile-bigmac",
                    "currentCategory": "burgers",
                    "currentView": "detail",
                    "product": link("prod-bigmac")
                }),
            ),
            entry("prod-bigmac", "product", json!({"id": "bigmac", "name": "Big Mac"})),
            entry(
                "cat-drinks",
                "category",
                json!({
                    "id": "drinks",
                    "navItemType": "menu",
                    "navItemTitle": "Drinks",
                    "subcats": link("subcats-drinks"),
                    "tiles": []
                }),
            ),
            entry(
                "subcats-drinks",
                "subcategoryList",
                json!({"internalTitle": "Drink subcats", "subcats": [link("cat-cold")]}),
            ),
            entry("cat-cold", "category", json!({"id": "cold", "tiles": []})),
        ],
        vec![],
    )
}

pub fn meals_response() -> Value {
    response(
        vec![
            entry(
                "meal-1",
                "meal",
                json!({
                    "id": "happy-meal",
                    "itemAnchor": link("prod-burger"),
                    "itemSide": "fries",
                    "itemDrink": {"softDrinks": ["cola"], "coffeeTea": ["latte"]}
                }),
            ),
            entry(
                "meal-2",
                "meal",
                json!({"id": "salad-meal", "itemAnchor": "salad", "itemToy": true}),
            ),
        ],
        vec![entry("prod-burger", "product", json!({"id": "hamburger", "name": "Hamburger"}))],
        vec![],
    )
}

pub fn configurable_products_response() -> Value {
    response(
        vec![entry(
            "prod-combo",
            "product",
            json!({
                "id": "combo",
                "configurable": [link("group-a"), link("group-b")]
            }),
        )],
        vec![
            entry(
                "group-a",
                "configurableGroup",
                json!({"id": "A", "configurableItems": [link("item-a1"), link("item-a2")]}),
            ),
            entry(
                "group-b",
                "configurableGroup",
                json!({"id": "B", "configurableItems": [link("item-b1"), link("item-b2")]}),
            ),
            entry("item-a1", "product", json!({"id": "a1"})),
            entry("item-a2", "product", json!({"id": "a2"})),
            entry("item-b1", "product", json!({"id": "b1"})),
            entry("item-b2", "product", json!({"id": "b2"})),
        ],
        vec![],
    )
}
