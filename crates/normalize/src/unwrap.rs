//! Reference unwrapping.
//!
//! Walks a typed entry and produces plain JSON in which every resolved
//! reference has been replaced by its target's inline field map. The output
//! type has no reference variant, so a reference surviving unwrapping is not
//! representable. Links that were never resolved (or that sit deeper than
//! [`UnwrapOptions::max_depth`]) are rendered as the delivery API's link JSON
//! and reported as [`IssueKind::UnresolvedReference`](crate::IssueKind).
//!
//! One shape gets special treatment: a field `k` whose target entry exists
//! only to hold a list under the same key `k` (plus authoring-only keys) is
//! replaced by that list, so the wrapper leaves no extra nesting level.
//!
//! The input entry is only borrowed.

use content::{Entry, FieldMap, FieldValue, Link};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::issue::{Issue, IssueReport};

/// Knobs for [`unwrap_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnwrapOptions {
    /// Reference hops followed before a reference is left as a stub. Should
    /// match the include depth the graph was fetched with.
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,

    /// Replace single-list container entries with their list.
    #[serde(default = "default_true")]
    pub promote_containers: bool,

    /// Authoring-only keys ignored when detecting containers and stripped by
    /// flatten transforms.
    #[serde(default = "default_reserved_keys")]
    pub reserved_keys: Vec<String>,
}

impl Default for UnwrapOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            promote_containers: true,
            reserved_keys: default_reserved_keys(),
        }
    }
}

impl UnwrapOptions {
    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.iter().any(|k| k == key)
    }
}

fn default_max_depth() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

fn default_reserved_keys() -> Vec<String> {
    vec!["internalTitle".to_string()]
}

/// An entry with every reference inlined.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwrappedEntry {
    /// The record's own `id` field when it has a textual one, else the
    /// source-assigned identifier.
    pub id: String,
    pub content_type: String,
    pub fields: Map<String, Value>,
    pub issues: IssueReport,
}

impl UnwrappedEntry {
    /// The field map as a record, guaranteed to carry an `id` (the
    /// source-assigned identifier is put first when the fields lack one).
    pub fn into_record(self) -> Map<String, Value> {
        if self.fields.contains_key("id") {
            return self.fields;
        }
        let mut record = Map::with_capacity(self.fields.len() + 1);
        record.insert("id".to_string(), Value::String(self.id));
        record.extend(self.fields);
        record
    }
}

struct Walker<'a> {
    opts: &'a UnwrapOptions,
    record_id: &'a str,
    issues: IssueReport,
}

/// Unwrap one entry.
///
/// ```rust
/// use content::{Entry, FieldValue, Link};
/// use normalize::{unwrap_entry, UnwrapOptions};
/// use serde_json::json;
///
/// let side = Entry::new("s1", "side").with_field("name", "Fries");
/// let meal = Entry::new("m1", "meal")
///     .with_field("side", side)
///     .with_field("toy", Link::entry("t9"));
///
/// let out = unwrap_entry(&meal, &UnwrapOptions::default());
/// assert_eq!(out.fields["side"], json!({"name": "Fries"}));
/// assert_eq!(out.fields["toy"]["sys"]["id"], "t9");
/// assert_eq!(out.issues.len(), 1);
/// ```
pub fn unwrap_entry(entry: &Entry, opts: &UnwrapOptions) -> UnwrappedEntry {
    let record_id = record_id_of(entry);
    let mut walker = Walker {
        opts,
        record_id: &record_id,
        issues: IssueReport::new(),
    };
    let fields = walker.map(&entry.fields, opts.max_depth, "");
    let issues = walker.issues;

    UnwrappedEntry {
        id: record_id,
        content_type: entry.content_type.clone(),
        fields,
        issues,
    }
}

/// Unwrap a batch, preserving order.
pub fn unwrap_entries(entries: &[Entry], opts: &UnwrapOptions) -> Vec<UnwrappedEntry> {
    entries.iter().map(|e| unwrap_entry(e, opts)).collect()
}

/// Unwrap a single value outside of any entry.
pub fn unwrap_value(value: &FieldValue, opts: &UnwrapOptions) -> (Value, IssueReport) {
    let mut walker = Walker {
        opts,
        record_id: "",
        issues: IssueReport::new(),
    };
    let out = walker.value(value, opts.max_depth, "");
    (out, walker.issues)
}

fn record_id_of(entry: &Entry) -> String {
    entry
        .fields
        .get("id")
        .and_then(FieldValue::as_text)
        .map(str::to_string)
        .unwrap_or_else(|| entry.id.clone())
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

impl Walker<'_> {
    fn map(&mut self, fields: &FieldMap, remaining: u8, path: &str) -> Map<String, Value> {
        let mut out = Map::with_capacity(fields.len());
        for (name, value) in fields.iter() {
            let field_path = child_path(path, name);
            let unwrapped = match self.container_list(name, value) {
                Some(list) if remaining > 0 => self.value(list, remaining - 1, &field_path),
                _ => self.value(value, remaining, &field_path),
            };
            out.insert(name.to_string(), unwrapped);
        }
        out
    }

    fn value(&mut self, value: &FieldValue, remaining: u8, path: &str) -> Value {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.value(item, remaining, path))
                    .collect(),
            ),
            FieldValue::Object(map) => Value::Object(self.map(map, remaining, path)),
            FieldValue::Reference(target) if remaining > 0 => {
                Value::Object(self.map(&target.fields, remaining - 1, path))
            }
            FieldValue::Reference(target) => self.stub(&target.link(), path),
            FieldValue::Stub(link) => self.stub(link, path),
        }
    }

    fn stub(&mut self, link: &Link, path: &str) -> Value {
        self.issues
            .push(Issue::unresolved(self.record_id, path, &link.id));
        link.to_json()
    }

    /// The inner list when `value` references a container entry for `name`.
    fn container_list<'v>(&self, name: &str, value: &'v FieldValue) -> Option<&'v FieldValue> {
        if !self.opts.promote_containers {
            return None;
        }
        let FieldValue::Reference(target) = value else {
            return None;
        };
        let inner = target.fields.get(name)?;
        if !matches!(inner, FieldValue::List(_)) {
            return None;
        }
        let only_reserved_besides = target
            .fields
            .keys()
            .all(|key| key == name || self.opts.is_reserved(key));
        only_reserved_besides.then_some(inner)
    }
}

/// Lift `record[key][key]` into `record[key]` when `record[key]` is a map
/// holding a list under `key` and nothing but reserved keys besides. Returns
/// whether anything changed. Used on already-unwrapped records.
pub fn promote_container_field(
    record: &mut Map<String, Value>,
    key: &str,
    opts: &UnwrapOptions,
) -> bool {
    let Some(Value::Object(wrapper)) = record.get(key) else {
        return false;
    };
    if !matches!(wrapper.get(key), Some(Value::Array(_))) {
        return false;
    }
    if !wrapper.keys().all(|k| k == key || opts.is_reserved(k)) {
        return false;
    }
    let Some(Value::Object(mut wrapper)) = record.remove(key) else {
        return false;
    };
    let inner = wrapper.remove(key).unwrap_or(Value::Null);
    record.insert(key.to_string(), inner);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;
    use serde_json::json;

    fn product(id: &str) -> Entry {
        Entry::new(id, "product")
            .with_field("id", id)
            .with_field("name", format!("Product {id}"))
    }

    fn contains_link_json(value: &Value) -> bool {
        match value {
            Value::Object(map) => {
                map.get("sys").and_then(|s| s.get("type")) == Some(&json!("Link"))
                    || map.values().any(contains_link_json)
            }
            Value::Array(items) => items.iter().any(contains_link_json),
            _ => false,
        }
    }

    #[test]
    fn references_become_inline_field_maps() {
        let entry = Entry::new("c1", "card")
            .with_field("id", "card-1")
            .with_field("product", product("p1"))
            .with_field(
                "products",
                vec![FieldValue::from(product("p2")), FieldValue::from(product("p3"))],
            );

        let out = unwrap_entry(&entry, &UnwrapOptions::default());
        assert_eq!(out.id, "card-1");
        assert_eq!(out.fields["product"], json!({"id": "p1", "name": "Product p1"}));
        assert_eq!(out.fields["products"][1]["id"], "p3");
        assert!(out.issues.is_empty());
        assert!(!contains_link_json(&Value::Object(out.fields)));
    }

    #[test]
    fn depth_bound_leaves_stub_and_reports() {
        let deep = Entry::new("a", "card")
            .with_field("next", Entry::new("b", "card").with_field("next", Entry::new("c", "card")));
        let out = unwrap_entry(&deep, &UnwrapOptions::default().with_max_depth(1));

        assert_eq!(out.fields["next"]["next"]["sys"]["id"], "c");
        let unresolved: Vec<_> = out.issues.iter().collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].field, "next.next");
        assert_eq!(
            unresolved[0].kind,
            IssueKind::UnresolvedReference {
                target: "c".into()
            }
        );
    }

    #[test]
    fn container_entry_is_promoted() {
        let wrapper = Entry::new("w1", "subcategoryWrapper")
            .with_field("internalTitle", "Burgers subcats")
            .with_field(
                "subcats",
                vec![FieldValue::from(Entry::new("s1", "category").with_field("id", "beef"))],
            );
        let category = Entry::new("cat", "category").with_field("subcats", wrapper);

        let out = unwrap_entry(&category, &UnwrapOptions::default());
        assert_eq!(out.fields["subcats"], json!([{"id": "beef"}]));
    }

    #[test]
    fn wrapper_with_real_fields_is_not_promoted() {
        let wrapper = Entry::new("w1", "group")
            .with_field("label", "Visible")
            .with_field("subcats", vec![FieldValue::from("x")]);
        let category = Entry::new("cat", "category").with_field("subcats", wrapper);

        let out = unwrap_entry(&category, &UnwrapOptions::default());
        assert_eq!(out.fields["subcats"], json!({"label": "Visible", "subcats": ["x"]}));
    }

    #[test]
    fn promotion_can_be_disabled() {
        let wrapper = Entry::new("w1", "wrapper").with_field("subcats", vec![FieldValue::from(1i64)]);
        let category = Entry::new("cat", "category").with_field("subcats", wrapper);
        let opts = UnwrapOptions {
            promote_containers: false,
            ..Default::default()
        };

        let out = unwrap_entry(&category, &opts);
        assert_eq!(out.fields["subcats"], json!({"subcats": [1]}));
    }

    #[test]
    fn unwrapping_twice_is_identical_and_input_untouched() {
        let entry = Entry::new("c1", "card")
            .with_field("product", product("p1"))
            .with_field("stub", Link::entry("gone"));
        let before = entry.clone();

        let first = unwrap_entry(&entry, &UnwrapOptions::default());
        let second = unwrap_entry(&entry, &UnwrapOptions::default());
        assert_eq!(first, second);
        assert_eq!(entry, before);
    }

    #[test]
    fn into_record_injects_source_id_first() {
        let entry = Entry::new("sys-7", "promo").with_field("title", "Half off");
        let record = unwrap_entry(&entry, &UnwrapOptions::default()).into_record();
        assert_eq!(record.keys().next().map(String::as_str), Some("id"));
        assert_eq!(record["id"], "sys-7");
    }

    #[test]
    fn promote_container_field_on_plain_record() {
        let opts = UnwrapOptions::default();
        let mut record = json!({"subcats": {"internalTitle": "x", "subcats": [1, 2]}})
            .as_object()
            .cloned()
            .unwrap();
        assert!(promote_container_field(&mut record, "subcats", &opts));
        assert_eq!(record["subcats"], json!([1, 2]));
        assert!(!promote_container_field(&mut record, "subcats", &opts));
    }
}
