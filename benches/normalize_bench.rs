use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use menufeed::{build_category_index, decode_collection, normalize_collection, Normalizer};
use serde_json::{json, Value};

fn link(id: &str) -> Value {
    json!({"sys": {"type": "Link", "linkType": "Entry", "id": id}})
}

fn entry(id: &str, content_type: &str, fields: Value) -> Value {
    json!({
        "sys": {"id": id, "type": "Entry", "contentType": {"sys": {"id": content_type}}},
        "fields": fields
    })
}

/// A wrapper with `categories` categories of `tiles` tiles each, every tile
/// pointing at a product with two nested products.
fn category_body(categories: usize, tiles: usize) -> Value {
    let mut includes = Vec::new();
    let mut category_links = Vec::new();
    for c in 0..categories {
        let mut tile_links = Vec::new();
        for t in 0..tiles {
            let tile_id = format!("tile-{c}-{t}");
            let product_id = format!("prod-{c}-{t}");
            includes.push(entry(
                &tile_id,
                "tile",
                json!({"id": tile_id, "currentCategory": format!("cat-{c}"), "currentView": "grid", "product": link(&product_id)}),
            ));
            includes.push(entry(
                &product_id,
                "product",
                json!({"id": product_id, "internalTitle": "x", "products": [link("side-a"), link("side-b")]}),
            ));
            tile_links.push(link(&tile_id));
        }
        let category_id = format!("cat-{c}");
        includes.push(entry(
            &category_id,
            "category",
            json!({"id": category_id, "navItemType": "menu", "navItemTitle": category_id, "tiles": tile_links}),
        ));
        category_links.push(link(&category_id));
    }
    includes.push(entry("side-a", "product", json!({"id": "side-a"})));
    includes.push(entry("side-b", "product", json!({"id": "side-b"})));

    json!({
        "items": [entry("wrapper", "wrapperForCategories", json!({"categories": category_links}))],
        "includes": {"Entry": includes}
    })
}

fn meal_body(meals: usize) -> Value {
    let items: Vec<Value> = (0..meals)
        .map(|i| {
            entry(
                &format!("meal-{i}"),
                "meal",
                json!({
                    "id": format!("meal-{i}"),
                    "itemAnchor": link("burger"),
                    "itemSide": "fries",
                    "itemDrink": {"softDrinks": ["cola"], "shakes": ["vanilla"]},
                    "criteriaSize": "large"
                }),
            )
        })
        .collect();
    json!({
        "items": items,
        "includes": {"Entry": [entry("burger", "product", json!({"id": "burger"}))]}
    })
}

fn category_bench(c: &mut Criterion) {
    let normalizer = Normalizer::standard();
    let mut group = c.benchmark_group("category_tree");
    for (categories, tiles) in [(5, 4), (20, 10)] {
        let body = category_body(categories, tiles);
        let collection = decode_collection(&body, 6).expect("bench body decodes");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{categories}x{tiles}")),
            &collection,
            |b, collection| {
                b.iter(|| {
                    let index = build_category_index(black_box(collection), &normalizer)
                        .expect("bench tree");
                    black_box(index);
                });
            },
        );
    }
    group.finish();
}

fn decode_bench(c: &mut Criterion) {
    let body = category_body(20, 10);
    c.bench_function("decode_categories_20x10", |b| {
        b.iter(|| {
            let collection = decode_collection(black_box(&body), 6).expect("bench decode");
            black_box(collection);
        });
    });
}

fn records_bench(c: &mut Criterion) {
    let normalizer = Normalizer::standard();
    let collection = decode_collection(&meal_body(500), 1).expect("bench meals decode");
    c.bench_function("normalize_500_meals", |b| {
        b.iter(|| {
            let batch = normalize_collection(black_box(&collection), &normalizer);
            black_box(batch);
        });
    });
}

criterion_group!(benches, category_bench, decode_bench, records_bench);
criterion_main!(benches);
