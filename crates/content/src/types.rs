//! Core data model for the entry graph.
//!
//! ```text
//! EntryCollection
//! ├── items: Vec<Entry>
//! │   └── Entry { id, content_type, kind, fields: FieldMap }
//! │       └── FieldMap: ordered (name -> FieldValue)
//! │           ├── Null | Bool | Number | Text
//! │           ├── Object(FieldMap)        structured JSON field
//! │           ├── List(Vec<FieldValue>)
//! │           ├── Reference(Box<Entry>)   link resolved within the include depth
//! │           └── Stub(Link)              link left unresolved
//! └── total / skip / limit
//! ```
//!
//! Whether a link was resolved is carried by the variant itself, so callers
//! never have to inspect a value's shape to find out.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

/// Whether an entry came from the entry or the asset table of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Entry,
    Asset,
}

/// Target table of an unresolved link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    Entry,
    Asset,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Entry => "Entry",
            LinkType::Asset => "Asset",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Entry" => Some(LinkType::Entry),
            "Asset" => Some(LinkType::Asset),
            _ => None,
        }
    }
}

/// Identifier-only pointer to another entry or asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub link_type: LinkType,
}

impl Link {
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link_type: LinkType::Entry,
        }
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link_type: LinkType::Asset,
        }
    }

    /// Renders the link the way the delivery API does.
    pub fn to_json(&self) -> Value {
        json!({
            "sys": {
                "type": "Link",
                "linkType": self.link_type.as_str(),
                "id": self.id,
            }
        })
    }
}

/// One record from the content source.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub content_type: String,
    pub kind: EntryKind,
    pub fields: FieldMap,
}

impl Entry {
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            kind: EntryKind::Entry,
            fields: FieldMap::new(),
        }
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: "asset".into(),
            kind: EntryKind::Asset,
            fields: FieldMap::new(),
        }
    }

    /// Builder-style field insertion, mostly useful in tests and fixtures.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    /// The link that points at this entry.
    pub fn link(&self) -> Link {
        Link {
            id: self.id.clone(),
            link_type: match self.kind {
                EntryKind::Entry => LinkType::Entry,
                EntryKind::Asset => LinkType::Asset,
            },
        }
    }
}

/// A field value. Resolution state is part of the type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Object(FieldMap),
    List(Vec<FieldValue>),
    Reference(Box<Entry>),
    Stub(Link),
}

impl FieldValue {
    /// Short shape name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "text",
            FieldValue::Object(_) => "object",
            FieldValue::List(_) => "list",
            FieldValue::Reference(_) => "reference",
            FieldValue::Stub(_) => "stub",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldValue::Null | FieldValue::Bool(_) | FieldValue::Number(_) | FieldValue::Text(_)
        )
    }

    /// True when no `Reference` or `Stub` appears anywhere below this value.
    pub fn is_plain(&self) -> bool {
        match self {
            FieldValue::Reference(_) | FieldValue::Stub(_) => false,
            FieldValue::List(items) => items.iter().all(FieldValue::is_plain),
            FieldValue::Object(map) => map.values().all(FieldValue::is_plain),
            _ => true,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<Entry> for FieldValue {
    fn from(value: Entry) -> Self {
        FieldValue::Reference(Box::new(value))
    }
}

impl From<Link> for FieldValue {
    fn from(value: Link) -> Self {
        FieldValue::Stub(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        FieldValue::List(value)
    }
}

impl From<FieldMap> for FieldValue {
    fn from(value: FieldMap) -> Self {
        FieldValue::Object(value)
    }
}

/// Ordered mapping from field name to value. Names are unique; inserting an
/// existing name replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A decoded delivery response.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryCollection {
    pub items: Vec<Entry>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    /// Include depth the graph was resolved with.
    pub include: u8,
}

impl EntryCollection {
    pub fn from_items(items: Vec<Entry>, include: u8) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            skip: 0,
            limit: total,
            include,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Converts a plain JSON value (no links) into a field value.
pub(crate) fn plain_from_json(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => FieldValue::Number(n.clone()),
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Array(items) => FieldValue::List(items.iter().map(plain_from_json).collect()),
        Value::Object(map) => FieldValue::Object(plain_map_from_json(map)),
    }
}

pub(crate) fn plain_map_from_json(map: &Map<String, Value>) -> FieldMap {
    map.iter()
        .map(|(k, v)| (k.clone(), plain_from_json(v)))
        .collect()
}
