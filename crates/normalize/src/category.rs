//! Category tree reconstruction.
//!
//! The category endpoint serves a navigation tree: a root wrapper entry holds
//! the ordered category list, categories hold subcategories and tiles, tiles
//! hold a product (which may hold products of its own). After unwrapping,
//! each category is reshaped into the client schema:
//!
//! - `navItemType` / `navItemTitle` / `navImg` become `navItem {type, title, image}`
//! - `backgroundImage` becomes its file URL
//! - a `subcats` container collapses to its list; subcategories get the same treatment
//! - every tile gets its `product` flattened, a `nextView`, and nested products
//!
//! `nextView` is `"none"` when either `currentCategory` or `currentView` is
//! the literal `"none"`; `{currentCategory, currentView}` (originals removed)
//! when both are present; otherwise it is not written at all.

use std::time::Instant;

use serde_json::{Map, Value};
use tracing::info;

use crate::error::NormalizeError;
use crate::issue::{Issue, IssueReport};
use crate::path::shape_of;
use crate::transform::{Transform, TransformContext};
use crate::unwrap::{promote_container_field, UnwrapOptions};

/// Marker value that disables a tile's transition.
pub const NEXT_VIEW_NONE: &str = "none";

const NAV_FIELDS: [(&str, &str); 3] = [
    ("navItemType", "type"),
    ("navItemTitle", "title"),
    ("navImg", "image"),
];

/// Categories in source order plus whatever was skipped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTree {
    pub categories: Vec<Map<String, Value>>,
    pub issues: IssueReport,
}

/// Build the category tree from the root wrapper's unwrapped field map.
///
/// ```rust
/// use normalize::{build_categories, UnwrapOptions};
/// use serde_json::json;
///
/// let root = json!({"categories": [{
///     "id": "deals",
///     "navItemType": "promo",
///     "navItemTitle": "Deals",
///     "tiles": [{"product": {"id": "p1"}, "currentCategory": "none"}]
/// }]});
///
/// let tree = build_categories(root.as_object().unwrap().clone(), "categories", &UnwrapOptions::default()).unwrap();
/// let deals = &tree.categories[0];
/// assert_eq!(deals["navItem"], json!({"type": "promo", "title": "Deals"}));
/// assert_eq!(deals["tiles"][0]["nextView"], "none");
/// ```
pub fn build_categories(
    mut root: Map<String, Value>,
    list_field: &str,
    opts: &UnwrapOptions,
) -> Result<CategoryTree, NormalizeError> {
    let start = Instant::now();
    let list = match root.remove(list_field) {
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(NormalizeError::InvalidListField {
                field: list_field.to_string(),
                found: shape_of(&other),
            })
        }
        None => return Err(NormalizeError::MissingListField(list_field.to_string())),
    };

    let builder = TreeBuilder::new(opts);
    let mut issues = IssueReport::new();
    let mut categories = Vec::with_capacity(list.len());
    for (position, item) in list.into_iter().enumerate() {
        match item {
            Value::Object(category) => categories.push(builder.category(category, true, &mut issues)),
            other => issues.push(Issue::shape(
                "",
                &format!("{list_field}[{position}]"),
                "object",
                shape_of(&other),
            )),
        }
    }

    info!(
        categories = categories.len(),
        issues = issues.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "normalize.categories"
    );

    Ok(CategoryTree { categories, issues })
}

struct TreeBuilder<'a> {
    opts: &'a UnwrapOptions,
    flatten_product: Transform,
    nested_products: Transform,
}

impl<'a> TreeBuilder<'a> {
    fn new(opts: &'a UnwrapOptions) -> Self {
        Self {
            opts,
            flatten_product: Transform::Flatten {
                field: "product".into(),
                inner: None,
                strip: Vec::new(),
            },
            nested_products: Transform::ProjectList {
                target: "product.products".into(),
                sources: vec!["product.products".into(), "products".into()],
            },
        }
    }

    fn category(
        &self,
        mut category: Map<String, Value>,
        top_level: bool,
        issues: &mut IssueReport,
    ) -> Map<String, Value> {
        let record_id = record_id(&category);

        attach_nav_item(&mut category, top_level);
        flatten_image(&mut category, "backgroundImage", &record_id, issues);

        promote_container_field(&mut category, "subcats", self.opts);
        if let Some(Value::Array(subcats)) = category.remove("subcats") {
            let rebuilt = subcats
                .into_iter()
                .map(|sub| match sub {
                    Value::Object(sub) => Value::Object(self.category(sub, false, issues)),
                    other => other,
                })
                .collect();
            category.insert("subcats".to_string(), Value::Array(rebuilt));
        }

        match category.remove("tiles") {
            Some(Value::Array(tiles)) => {
                let rebuilt = tiles
                    .into_iter()
                    .map(|tile| match tile {
                        Value::Object(tile) => Value::Object(self.tile(tile, &record_id, issues)),
                        other => {
                            issues.push(Issue::shape(&record_id, "tiles[]", "object", shape_of(&other)));
                            other
                        }
                    })
                    .collect();
                category.insert("tiles".to_string(), Value::Array(rebuilt));
            }
            Some(other) => {
                issues.push(Issue::shape(&record_id, "tiles", "list", shape_of(&other)));
                category.insert("tiles".to_string(), other);
            }
            None => {}
        }

        category
    }

    fn tile(
        &self,
        mut tile: Map<String, Value>,
        category_id: &str,
        issues: &mut IssueReport,
    ) -> Map<String, Value> {
        let tile_id = match tile.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => format!("{category_id}/tile"),
        };
        let mut ctx = TransformContext {
            record_id: &tile_id,
            opts: self.opts,
            issues,
        };
        self.flatten_product.apply(&mut tile, &mut ctx);
        apply_next_view(&mut tile);
        self.nested_products.apply(&mut tile, &mut ctx);
        tile
    }
}

fn record_id(map: &Map<String, Value>) -> String {
    match map.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Gather the nav fields into `navItem`. Top-level categories always get
/// one; subcategories only when they carry nav fields.
fn attach_nav_item(category: &mut Map<String, Value>, always: bool) {
    let mut nav = Map::with_capacity(NAV_FIELDS.len());
    for (source, key) in NAV_FIELDS {
        if let Some(value) = category.remove(source) {
            nav.insert(key.to_string(), value);
        }
    }
    if always || !nav.is_empty() {
        category.insert("navItem".to_string(), Value::Object(nav));
    }
}

/// Replace an asset map with its `file.url`.
fn flatten_image(map: &mut Map<String, Value>, key: &str, record_id: &str, issues: &mut IssueReport) {
    let Some(Value::Object(asset)) = map.get(key) else {
        return;
    };
    let url = asset
        .get("file")
        .and_then(|file| file.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);
    match url {
        Some(url) => {
            map.insert(key.to_string(), Value::String(url));
        }
        // An unresolved asset link was already reported by the unwrapper.
        None if asset.contains_key("sys") => {}
        None => issues.push(Issue::shape(record_id, key, "asset with file.url", "object")),
    }
}

fn is_none_marker(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s == NEXT_VIEW_NONE)
}

/// Null and empty text count as unset.
fn present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Write the tile's `nextView`.
pub fn apply_next_view(tile: &mut Map<String, Value>) {
    let category = tile.get("currentCategory");
    let view = tile.get("currentView");

    if is_none_marker(category) || is_none_marker(view) {
        tile.insert("nextView".to_string(), Value::String(NEXT_VIEW_NONE.to_string()));
        return;
    }
    if present(category) && present(view) {
        let mut next = Map::with_capacity(2);
        for key in ["currentCategory", "currentView"] {
            if let Some(value) = tile.remove(key) {
                next.insert(key.to_string(), value);
            }
        }
        tile.insert("nextView".to_string(), Value::Object(next));
    }
}
