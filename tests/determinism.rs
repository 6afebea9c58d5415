mod common;

use menufeed::{
    build_category_index, decode_collection, normalize_collection, EntryCollection, Normalizer,
};
use normalize::{apply_next_view, index_records, unwrap_entry, TransformRegistry, UnwrapOptions};
use serde_json::{json, Map, Value};

use common::{
    configurable_products_response, deals_category_response, entry, full_category_response, link,
    meals_response, response,
};

fn decoded(body: &Value, include: u8) -> EntryCollection {
    decode_collection(body, include).expect("decodes")
}

fn contains_link(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.get("sys").and_then(|sys| sys.get("type")) == Some(&Value::from("Link"))
                || map.values().any(contains_link)
        }
        Value::Array(items) => items.iter().any(contains_link),
        _ => false,
    }
}

#[test]
fn normalizing_twice_gives_identical_output() {
    let normalizer = Normalizer::standard();
    for body in [deals_category_response(), full_category_response()] {
        let collection = decoded(&body, 6);
        let first = build_category_index(&collection, &normalizer).expect("first");
        let second = build_category_index(&collection, &normalizer).expect("second");
        assert_eq!(first, second);
    }

    let meals = decoded(&meals_response(), 1);
    assert_eq!(
        normalize_collection(&meals, &normalizer),
        normalize_collection(&meals, &normalizer)
    );
}

#[test]
fn decoded_graph_is_not_mutated() {
    let collection = decoded(&meals_response(), 1);
    let before = collection.clone();
    let _ = normalize_collection(&collection, &Normalizer::standard());
    assert_eq!(collection, before);
}

#[test]
fn no_links_survive_within_include_depth() {
    let collection = decoded(&full_category_response(), 6);
    let index = build_category_index(&collection, &Normalizer::standard()).expect("tree");
    assert!(!contains_link(&index.into_value()));

    let opts = UnwrapOptions::default();
    for entry in &collection.items {
        let unwrapped = unwrap_entry(entry, &opts);
        assert!(unwrapped.issues.is_empty());
        assert!(!contains_link(&Value::Object(unwrapped.fields)));
    }
}

#[test]
fn rules_are_idempotent_on_normalized_records() {
    let normalizer = Normalizer::standard();
    let registry = TransformRegistry::standard();
    let batch = normalize_collection(&decoded(&meals_response(), 1), &normalizer);

    for record in batch.records {
        let mut issues = normalize::IssueReport::new();
        let again = registry.apply("meal", record.clone(), "again", &normalizer.options, &mut issues);
        assert_eq!(again, record);
        assert!(issues.is_empty());
    }
}

/// A card exercising every structural rule: a flattened product with nested
/// products, configurable groups and merged criteria.
fn loaded_card_response() -> Value {
    response(
        vec![entry(
            "card-1",
            "card",
            json!({
                "id": "value-card",
                "product": link("prod-combo"),
                "configurable": [link("group-a")],
                "criteriaSize": "large",
                "criteriaSide": "fries"
            }),
        )],
        vec![
            entry(
                "prod-combo",
                "product",
                json!({
                    "id": "combo",
                    "internalTitle": "Combo (authoring)",
                    "products": [link("prod-side")]
                }),
            ),
            entry("prod-side", "product", json!({"id": "side", "name": "Side"})),
            entry(
                "group-a",
                "configurableGroup",
                json!({"id": "A", "configurableItems": [link("item-a1")]}),
            ),
            entry("item-a1", "product", json!({"id": "a1"})),
        ],
        vec![],
    )
}

#[test]
fn structural_rules_are_idempotent_on_normalized_records() {
    let normalizer = Normalizer::standard();
    let registry = TransformRegistry::standard();
    let cases = [
        ("card", loaded_card_response()),
        ("product", configurable_products_response()),
    ];

    for (content_type, body) in cases {
        let batch = normalize_collection(&decoded(&body, 3), &normalizer);
        assert!(batch.issues.is_empty(), "{:?}", batch.issues);

        for record in batch.records {
            let mut issues = normalize::IssueReport::new();
            let again = registry.apply(content_type, record.clone(), "again", &normalizer.options, &mut issues);
            assert_eq!(again, record);
            assert!(issues.is_empty(), "{content_type}: {issues:?}");
        }
    }
}

#[test]
fn loaded_card_has_every_rule_applied() {
    let batch = normalize_collection(&decoded(&loaded_card_response(), 3), &Normalizer::standard());
    let card = &batch.records[0];

    assert_eq!(
        card["product"],
        json!({"id": "combo", "products": [{"id": "side", "name": "Side"}]})
    );
    assert_eq!(card["configurable"], json!([{"A": [{"id": "a1"}]}]));
    assert_eq!(card["criteria"], json!({"size": "large", "side": "fries"}));
    assert!(card.get("criteriaSize").is_none());
}

#[test]
fn next_view_is_stable_on_rerun() {
    let collection = decoded(&full_category_response(), 6);
    let index = build_category_index(&collection, &Normalizer::standard()).expect("tree");
    let tile = index.categories["burgers"]["tiles"][0]
        .as_object()
        .cloned()
        .expect("tile");

    let mut rerun = tile.clone();
    apply_next_view(&mut rerun);
    assert_eq!(rerun, tile);
}

#[test]
fn distinct_ids_index_to_same_size() {
    let records: Vec<Map<String, Value>> = (0..50)
        .map(|i| {
            let mut record = Map::new();
            record.insert("id".into(), Value::from(format!("item-{i}")));
            record
        })
        .collect();
    let indexed = index_records(records.clone());
    assert_eq!(indexed.len(), records.len());
}
