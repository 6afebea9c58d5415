//! Turns a raw delivery response into an [`EntryCollection`].
//!
//! The response carries the requested entries in `items` and every linked
//! entry/asset the server chose to embed in `includes`. Links are resolved
//! against both tables, one hop at a time, until the include depth is used
//! up. A link that is out of depth, or whose target the server did not
//! embed, stays a [`FieldValue::Stub`].
//!
//! The depth counter strictly decreases on every hop, so a self-referencing
//! graph still terminates.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ContentError;
use crate::types::{
    plain_from_json, Entry, EntryCollection, EntryKind, FieldMap, FieldValue, Link, LinkType,
};

/// Delivery API cap on `include`.
pub const MAX_INCLUDE_DEPTH: u8 = 10;

struct LinkIndex<'a> {
    targets: HashMap<(LinkType, &'a str), &'a Value>,
}

impl<'a> LinkIndex<'a> {
    fn build(items: &'a [Value], includes: Option<&'a Value>) -> Self {
        let mut targets = HashMap::new();
        for raw in items {
            if let Some(id) = sys_str(raw, "id") {
                targets.insert((LinkType::Entry, id), raw);
            }
        }
        if let Some(includes) = includes {
            for (table, link_type) in [("Entry", LinkType::Entry), ("Asset", LinkType::Asset)] {
                let Some(Value::Array(rows)) = includes.get(table) else {
                    continue;
                };
                for raw in rows {
                    if let Some(id) = sys_str(raw, "id") {
                        targets.entry((link_type, id)).or_insert(raw);
                    }
                }
            }
        }
        Self { targets }
    }

    fn get(&self, link: &Link) -> Option<&'a Value> {
        self.targets
            .get(&(link.link_type, link.id.as_str()))
            .copied()
    }
}

/// Decode a delivery response resolved with the given include depth.
///
/// ```rust
/// use content::{decode_collection, FieldValue};
/// use serde_json::json;
///
/// let body = json!({
///     "total": 1, "skip": 0, "limit": 100,
///     "items": [{
///         "sys": {"id": "p1", "type": "Entry", "contentType": {"sys": {"id": "product"}}},
///         "fields": {"name": "Burger", "side": {"sys": {"type": "Link", "linkType": "Entry", "id": "s1"}}}
///     }],
///     "includes": {"Entry": [{
///         "sys": {"id": "s1", "type": "Entry", "contentType": {"sys": {"id": "side"}}},
///         "fields": {"name": "Fries"}
///     }]}
/// });
///
/// let collection = decode_collection(&body, 1).unwrap();
/// let side = collection.items[0].fields.get("side").unwrap();
/// assert!(matches!(side, FieldValue::Reference(entry) if entry.id == "s1"));
/// ```
pub fn decode_collection(body: &Value, include: u8) -> Result<EntryCollection, ContentError> {
    let root = body.as_object().ok_or(ContentError::NotAnObject)?;
    let items = match root.get("items") {
        Some(Value::Array(items)) => items,
        _ => return Err(ContentError::InvalidItems),
    };
    let include = include.min(MAX_INCLUDE_DEPTH);
    let index = LinkIndex::build(items, root.get("includes"));

    let mut stubs = 0usize;
    let mut decoded = Vec::with_capacity(items.len());
    for (position, raw) in items.iter().enumerate() {
        if raw.get("sys").is_none() {
            return Err(ContentError::MissingSys { index: position });
        }
        decoded.push(decode_entry(raw, include, &index, &mut stubs)?);
    }

    debug!(
        items = decoded.len(),
        include,
        stubs,
        "content.decode"
    );

    Ok(EntryCollection {
        total: counter(root, "total").unwrap_or(decoded.len() as u64),
        skip: counter(root, "skip").unwrap_or(0),
        limit: counter(root, "limit").unwrap_or(decoded.len() as u64),
        items: decoded,
        include,
    })
}

fn decode_entry(
    raw: &Value,
    remaining: u8,
    index: &LinkIndex<'_>,
    stubs: &mut usize,
) -> Result<Entry, ContentError> {
    let id = sys_str(raw, "id").ok_or(ContentError::MissingField("id"))?;
    let kind = match sys_str(raw, "type") {
        Some("Asset") => EntryKind::Asset,
        _ => EntryKind::Entry,
    };
    let content_type = match kind {
        EntryKind::Asset => "asset",
        EntryKind::Entry => raw
            .get("sys")
            .and_then(|sys| sys.get("contentType"))
            .and_then(|ct| ct.get("sys"))
            .and_then(|sys| sys.get("id"))
            .and_then(Value::as_str)
            .unwrap_or_default(),
    };

    let fields = match raw.get("fields") {
        Some(Value::Object(map)) => decode_map(map, remaining, index, stubs),
        _ => FieldMap::new(),
    };

    Ok(Entry {
        id: id.to_string(),
        content_type: content_type.to_string(),
        kind,
        fields,
    })
}

fn decode_map(
    map: &Map<String, Value>,
    remaining: u8,
    index: &LinkIndex<'_>,
    stubs: &mut usize,
) -> FieldMap {
    map.iter()
        .map(|(name, value)| (name.clone(), decode_value(value, remaining, index, stubs)))
        .collect()
}

fn decode_value(
    value: &Value,
    remaining: u8,
    index: &LinkIndex<'_>,
    stubs: &mut usize,
) -> FieldValue {
    if let Some(link) = as_link(value) {
        if remaining == 0 {
            *stubs += 1;
            return FieldValue::Stub(link);
        }
        return match index.get(&link) {
            Some(target) => match decode_entry(target, remaining - 1, index, stubs) {
                Ok(entry) => FieldValue::Reference(Box::new(entry)),
                Err(_) => {
                    *stubs += 1;
                    FieldValue::Stub(link)
                }
            },
            None => {
                *stubs += 1;
                FieldValue::Stub(link)
            }
        };
    }

    match value {
        Value::Array(items) => FieldValue::List(
            items
                .iter()
                .map(|item| decode_value(item, remaining, index, stubs))
                .collect(),
        ),
        Value::Object(map) => FieldValue::Object(decode_map(map, remaining, index, stubs)),
        other => plain_from_json(other),
    }
}

/// Recognises `{"sys": {"type": "Link", "linkType": .., "id": ..}}`.
fn as_link(value: &Value) -> Option<Link> {
    let sys = value.as_object()?.get("sys")?;
    if sys.get("type").and_then(Value::as_str) != Some("Link") {
        return None;
    }
    let link_type = LinkType::parse(sys.get("linkType")?.as_str()?)?;
    let id = sys.get("id")?.as_str()?;
    Some(Link {
        id: id.to_string(),
        link_type,
    })
}

fn sys_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get("sys")?.get(key)?.as_str()
}

fn counter(root: &Map<String, Value>, key: &str) -> Option<u64> {
    root.get(key).and_then(Value::as_u64)
}
