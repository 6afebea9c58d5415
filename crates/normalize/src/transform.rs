//! Field transforms applied to unwrapped records.
//!
//! Each [`Transform`] is a small structural rewrite of one record. They are
//! data, not code: a content type's rule chain is a `Vec<Transform>` that can
//! be built in Rust or loaded from configuration.
//!
//! Shared rules for every transform:
//!
//! - A missing source field makes the transform a no-op.
//! - A source of the wrong shape skips the transform, leaves the record as it
//!   was and reports [`IssueKind::ShapeMismatch`](crate::IssueKind).
//! - Nothing is removed until the replacement is known to fit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::issue::{Issue, IssueReport};
use crate::path::{shape_of, FieldPath};
use crate::unwrap::UnwrapOptions;

/// One source of a [`Transform::Merge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSource {
    /// Field read (and removed) from the record.
    pub from: String,
    /// Key inside the merged object.
    pub to: String,
    /// Written when `from` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl MergeSource {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            default: None,
        }
    }

    pub fn or_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Declarative key relabelling: source key -> display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameTable(BTreeMap<String, String>);

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, label: &str) -> Self {
        self.0.insert(key.to_string(), label.to_string());
        self
    }

    /// Add or replace entries from another table.
    pub fn extend(&mut self, other: &RenameTable) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display labels for drink categories.
    pub fn drink_categories() -> Self {
        RenameTable::new()
            .with("softDrinks", "Soft Drinks")
            .with("coffeeTea", "Coffee & Tea")
            .with("juiceWater", "Juice & Water")
            .with("shakes", "Shakes & Frozen Drinks")
    }
}

/// A structural rewrite of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    /// Move `sources` into one object at `into`. Runs only when `when` exists.
    Merge {
        into: FieldPath,
        when: FieldPath,
        sources: Vec<MergeSource>,
    },
    /// Replace a nested map by its `inner` value (when present), otherwise
    /// drop the `strip` keys and reserved authoring keys from it.
    Flatten {
        field: FieldPath,
        #[serde(default)]
        inner: Option<String>,
        #[serde(default)]
        strip: Vec<String>,
    },
    /// Write the first present candidate list, as a list of field maps, to
    /// `target`. Candidates are tried in order; once one is found the rest are
    /// not looked at. The candidate itself is left in place.
    ProjectList {
        target: FieldPath,
        sources: Vec<FieldPath>,
    },
    /// Turn a list of group entries into a list of `{<group id>: [members]}`.
    GroupList {
        field: FieldPath,
        group_key: String,
        members: String,
    },
    /// Relabel keys of the map at `field`. Must come after whatever creates it.
    RenameKeys { field: FieldPath, table: RenameTable },
    /// Insert `value` at `field` when absent.
    DefaultIfAbsent { field: FieldPath, value: Value },
}

/// Mutable state threaded through one record's rule chain.
pub struct TransformContext<'a> {
    pub record_id: &'a str,
    pub opts: &'a UnwrapOptions,
    pub issues: &'a mut IssueReport,
}

impl TransformContext<'_> {
    fn mismatch(&mut self, field: &FieldPath, expected: &'static str, found: &Value) {
        self.issues.push(Issue::shape(
            self.record_id,
            &field.to_string(),
            expected,
            shape_of(found),
        ));
    }

    fn strip_reserved(&self, map: Map<String, Value>, extra: &[String]) -> Map<String, Value> {
        map.into_iter()
            .filter(|(k, _)| !self.opts.is_reserved(k) && !extra.iter().any(|e| e == k))
            .collect()
    }
}

impl Transform {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Merge { .. } => "merge",
            Transform::Flatten { .. } => "flatten",
            Transform::ProjectList { .. } => "project_list",
            Transform::GroupList { .. } => "group_list",
            Transform::RenameKeys { .. } => "rename_keys",
            Transform::DefaultIfAbsent { .. } => "default_if_absent",
        }
    }

    /// Apply to an owned record. Returns whether the record changed.
    pub fn apply(&self, record: &mut Map<String, Value>, ctx: &mut TransformContext<'_>) -> bool {
        match self {
            Transform::Merge {
                into,
                when,
                sources,
            } => merge(record, into, when, sources),
            Transform::Flatten {
                field,
                inner,
                strip,
            } => flatten(record, field, inner.as_deref(), strip, ctx),
            Transform::ProjectList { target, sources } => project_list(record, target, sources, ctx),
            Transform::GroupList {
                field,
                group_key,
                members,
            } => group_list(record, field, group_key, members, ctx),
            Transform::RenameKeys { field, table } => rename_keys(record, field, table, ctx),
            Transform::DefaultIfAbsent { field, value } => {
                if field.contains(record) {
                    return false;
                }
                field.insert(record, value.clone()).is_ok()
            }
        }
    }
}

fn merge(
    record: &mut Map<String, Value>,
    into: &FieldPath,
    when: &FieldPath,
    sources: &[MergeSource],
) -> bool {
    if !when.contains(record) || into.parent_mut(record).is_none() {
        return false;
    }
    let mut merged = Map::with_capacity(sources.len());
    for source in sources {
        let taken = FieldPath::parse(&source.from).remove(record);
        match (taken, &source.default) {
            (Some(value), _) => {
                merged.insert(source.to.clone(), value);
            }
            (None, Some(default)) => {
                merged.insert(source.to.clone(), default.clone());
            }
            (None, None) => {}
        }
    }
    into.insert(record, Value::Object(merged)).is_ok()
}

fn flatten(
    record: &mut Map<String, Value>,
    field: &FieldPath,
    inner: Option<&str>,
    strip: &[String],
    ctx: &mut TransformContext<'_>,
) -> bool {
    let Some(current) = field.get(record) else {
        return false;
    };
    let Value::Object(map) = current else {
        ctx.mismatch(field, "object", current);
        return false;
    };
    let replacement = match inner.and_then(|key| map.get(key)) {
        Some(inner_value) => inner_value.clone(),
        None => Value::Object(ctx.strip_reserved(map.clone(), strip)),
    };
    if field.get(record) == Some(&replacement) {
        return false;
    }
    field.insert(record, replacement).is_ok()
}

fn project_list(
    record: &mut Map<String, Value>,
    target: &FieldPath,
    sources: &[FieldPath],
    ctx: &mut TransformContext<'_>,
) -> bool {
    let Some((source, list)) = sources
        .iter()
        .find_map(|candidate| candidate.get(record).map(|value| (candidate, value)))
    else {
        return false;
    };
    let Value::Array(items) = list else {
        ctx.mismatch(source, "list", list);
        return false;
    };

    let mut projected = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) => projected.push(Value::Object(ctx.strip_reserved(map.clone(), &[]))),
            other => {
                ctx.mismatch(source, "list of objects", other);
                return false;
            }
        }
    }

    if target.parent_mut(record).is_none() {
        let found = target
            .segments()
            .first()
            .and_then(|first| record.get(first))
            .map(shape_of)
            .unwrap_or("nothing");
        ctx.issues.push(Issue::shape(
            ctx.record_id,
            &target.to_string(),
            "object parent",
            found,
        ));
        return false;
    }
    let projected = Value::Array(projected);
    if target.get(record) == Some(&projected) {
        return false;
    }
    target.insert(record, projected).is_ok()
}

fn group_list(
    record: &mut Map<String, Value>,
    field: &FieldPath,
    group_key: &str,
    members: &str,
    ctx: &mut TransformContext<'_>,
) -> bool {
    let Some(current) = field.get(record) else {
        return false;
    };
    let Value::Array(groups) = current else {
        ctx.mismatch(field, "list", current);
        return false;
    };
    if groups.iter().all(|group| is_grouped(group, group_key, members)) {
        return false;
    }

    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let Value::Object(group_map) = group else {
            ctx.mismatch(field, "list of objects", group);
            return false;
        };
        let Some(group_id) = group_map.get(group_key).and_then(group_label) else {
            let found = group_map.get(group_key).map(shape_of).unwrap_or("nothing");
            ctx.issues.push(Issue::shape(
                ctx.record_id,
                &format!("{field}.{group_key}"),
                "text",
                found,
            ));
            return false;
        };
        let member_maps = match group_map.get(members) {
            Some(Value::Array(items)) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(item_map) = item else {
                        ctx.mismatch(field, "list of objects", item);
                        return false;
                    };
                    maps.push(Value::Object(ctx.strip_reserved(item_map.clone(), &[])));
                }
                maps
            }
            None => Vec::new(),
            Some(other) => {
                ctx.mismatch(field, "list", other);
                return false;
            }
        };
        let mut single = Map::with_capacity(1);
        single.insert(group_id, Value::Array(member_maps));
        out.push(Value::Object(single));
    }
    field.insert(record, Value::Array(out)).is_ok()
}

/// `{"<id>": [...]}` – a group that has already been rewritten. A raw group
/// holding only its member list has the same shape and is not grouped.
fn is_grouped(value: &Value, group_key: &str, members: &str) -> bool {
    let Value::Object(map) = value else {
        return false;
    };
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, Value::Array(_))), None) => key != members && key != group_key,
        _ => false,
    }
}

fn group_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn rename_keys(
    record: &mut Map<String, Value>,
    field: &FieldPath,
    table: &RenameTable,
    ctx: &mut TransformContext<'_>,
) -> bool {
    let Some(current) = field.get(record) else {
        return false;
    };
    let Value::Object(map) = current else {
        ctx.mismatch(field, "object", current);
        return false;
    };
    if !map.keys().any(|k| table.label_for(k).is_some()) {
        return false;
    }
    let relabelled: Map<String, Value> = map
        .iter()
        .map(|(k, v)| {
            let key = table.label_for(k).map(str::to_string).unwrap_or_else(|| k.clone());
            (key, v.clone())
        })
        .collect();
    field.insert(record, Value::Object(relabelled)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn run(transform: &Transform, rec: &mut Map<String, Value>) -> (bool, IssueReport) {
        let opts = UnwrapOptions::default();
        let mut issues = IssueReport::new();
        let mut ctx = TransformContext {
            record_id: "rec-1",
            opts: &opts,
            issues: &mut issues,
        };
        let changed = transform.apply(rec, &mut ctx);
        (changed, issues)
    }

    fn items_merge() -> Transform {
        Transform::Merge {
            into: "items".into(),
            when: "itemAnchor".into(),
            sources: vec![
                MergeSource::new("itemAnchor", "anchor"),
                MergeSource::new("itemSide", "side"),
                MergeSource::new("itemDrink", "drink"),
                MergeSource::new("itemToy", "toy").or_default(json!(false)),
            ],
        }
    }

    #[test]
    fn merge_defaults_missing_toy_to_false() {
        let mut rec = record(json!({"id": "m1", "itemAnchor": "burger", "itemSide": "fries"}));
        let (changed, issues) = run(&items_merge(), &mut rec);

        assert!(changed);
        assert!(issues.is_empty());
        assert_eq!(
            rec,
            record(json!({"id": "m1", "items": {"anchor": "burger", "side": "fries", "toy": false}}))
        );
    }

    #[test]
    fn merge_without_trigger_is_noop() {
        let mut rec = record(json!({"itemSide": "fries"}));
        let (changed, _) = run(&items_merge(), &mut rec);
        assert!(!changed);
        assert_eq!(rec, record(json!({"itemSide": "fries"})));
    }

    #[test]
    fn flatten_prefers_inner_then_strips() {
        let mut rec = record(json!({"subcats": {"internalTitle": "x", "subcats": [1]}}));
        let promote = Transform::Flatten {
            field: "subcats".into(),
            inner: Some("subcats".into()),
            strip: vec![],
        };
        assert!(run(&promote, &mut rec).0);
        assert_eq!(rec["subcats"], json!([1]));

        let mut rec = record(json!({"product": {"internalTitle": "x", "name": "Fries"}}));
        let strip = Transform::Flatten {
            field: "product".into(),
            inner: None,
            strip: vec![],
        };
        assert!(run(&strip, &mut rec).0);
        assert_eq!(rec["product"], json!({"name": "Fries"}));
        assert!(!run(&strip, &mut rec).0);
    }

    #[test]
    fn flatten_on_scalar_reports_shape_mismatch() {
        let mut rec = record(json!({"product": "p-1"}));
        let t = Transform::Flatten {
            field: "product".into(),
            inner: None,
            strip: vec![],
        };
        let (changed, issues) = run(&t, &mut rec);
        assert!(!changed);
        assert_eq!(rec["product"], "p-1");
        let issue = issues.iter().next().unwrap();
        assert_eq!(
            issue.kind,
            IssueKind::ShapeMismatch {
                expected: "object",
                found: "text"
            }
        );
    }

    #[test]
    fn project_list_uses_first_present_source_only() {
        let t = Transform::ProjectList {
            target: "product.products".into(),
            sources: vec!["product.products".into(), "products".into()],
        };

        let mut own = record(json!({
            "product": {"products": [{"id": "a"}]},
            "products": [{"id": "outer"}]
        }));
        run(&t, &mut own);
        assert_eq!(own["product"]["products"], json!([{"id": "a"}]));
        assert_eq!(own["products"], json!([{"id": "outer"}]));

        let mut fallback = record(json!({"product": {}, "products": [{"id": "b"}]}));
        assert!(run(&t, &mut fallback).0);
        assert_eq!(
            fallback,
            record(json!({"product": {"products": [{"id": "b"}]}, "products": [{"id": "b"}]}))
        );
        assert!(!run(&t, &mut fallback).0);
    }

    #[test]
    fn project_list_without_target_parent_keeps_source() {
        let t = Transform::ProjectList {
            target: "product.products".into(),
            sources: vec!["product.products".into(), "products".into()],
        };
        let mut rec = record(json!({"products": [{"id": "b"}]}));
        let (changed, issues) = run(&t, &mut rec);
        assert!(!changed);
        assert_eq!(issues.len(), 1);
        assert_eq!(rec, record(json!({"products": [{"id": "b"}]})));
    }

    #[test]
    fn project_list_rejects_scalar_members() {
        let t = Transform::ProjectList {
            target: "products".into(),
            sources: vec!["products".into()],
        };
        let mut rec = record(json!({"products": [{"id": "a"}, 7]}));
        let (changed, issues) = run(&t, &mut rec);
        assert!(!changed);
        assert_eq!(issues.len(), 1);
        assert_eq!(rec["products"], json!([{"id": "a"}, 7]));
    }

    #[test]
    fn group_list_keys_by_group_id_in_order() {
        let t = Transform::GroupList {
            field: "configurable".into(),
            group_key: "id".into(),
            members: "configurableItems".into(),
        };
        let mut rec = record(json!({"configurable": [
            {"id": "A", "configurableItems": [{"n": 1}, {"n": 2}]},
            {"id": "B", "configurableItems": [{"n": 3}, {"n": 4}]}
        ]}));
        assert!(run(&t, &mut rec).0);
        assert_eq!(
            rec["configurable"],
            json!([{"A": [{"n": 1}, {"n": 2}]}, {"B": [{"n": 3}, {"n": 4}]}])
        );

        let again = rec.clone();
        assert!(!run(&t, &mut rec).0);
        assert_eq!(rec, again);
    }

    #[test]
    fn group_without_id_is_skipped() {
        let t = Transform::GroupList {
            field: "configurable".into(),
            group_key: "id".into(),
            members: "configurableItems".into(),
        };
        let mut rec = record(json!({"configurable": [{"configurableItems": []}, {"x": 1, "y": 2}]}));
        let before = rec.clone();
        let (changed, issues) = run(&t, &mut rec);
        assert!(!changed);
        assert_eq!(issues.len(), 1);
        assert_eq!(rec, before);
    }

    #[test]
    fn lone_member_list_without_id_is_reported() {
        let t = Transform::GroupList {
            field: "configurable".into(),
            group_key: "id".into(),
            members: "configurableItems".into(),
        };
        let mut rec = record(json!({"configurable": [{"configurableItems": [{"id": "x"}]}]}));
        let before = rec.clone();
        let (changed, issues) = run(&t, &mut rec);
        assert!(!changed);
        assert_eq!(issues.len(), 1);
        assert_eq!(rec, before);
    }

    #[test]
    fn rename_keys_relabels_in_place_order() {
        let t = Transform::RenameKeys {
            field: "items.drink".into(),
            table: RenameTable::drink_categories(),
        };
        let mut rec = record(json!({"items": {"drink": {"softDrinks": [1], "water": [2], "coffeeTea": [3]}}}));
        assert!(run(&t, &mut rec).0);
        let keys: Vec<_> = rec["items"]["drink"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["Soft Drinks", "water", "Coffee & Tea"]);
        assert!(!run(&t, &mut rec).0);
    }

    #[test]
    fn rename_keys_waits_for_parent() {
        let t = Transform::RenameKeys {
            field: "items.drink".into(),
            table: RenameTable::drink_categories(),
        };
        let mut rec = record(json!({"itemDrink": {"softDrinks": []}}));
        let (changed, issues) = run(&t, &mut rec);
        assert!(!changed);
        assert!(issues.is_empty());
    }

    #[test]
    fn default_if_absent_only_fills_gaps() {
        let t = Transform::DefaultIfAbsent {
            field: "available".into(),
            value: json!(true),
        };
        let mut rec = record(json!({"id": "x"}));
        assert!(run(&t, &mut rec).0);
        assert_eq!(rec["available"], json!(true));

        let mut rec = record(json!({"available": false}));
        assert!(!run(&t, &mut rec).0);
        assert_eq!(rec["available"], json!(false));
    }

    #[test]
    fn transforms_deserialize_from_tagged_json() {
        let t: Transform = serde_json::from_value(json!({
            "op": "rename_keys",
            "field": "items.drink",
            "table": {"softDrinks": "Soft Drinks"}
        }))
        .expect("deserialize");
        assert_eq!(t.name(), "rename_keys");
    }
}
