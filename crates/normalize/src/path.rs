//! Dotted field paths (`product.products`) over plain JSON maps.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A location inside a record, one map key per segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Value at this path, if every intermediate segment is a map.
    pub fn get<'a>(&self, record: &'a Map<String, Value>) -> Option<&'a Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = record;
        for segment in parents {
            current = current.get(segment)?.as_object()?;
        }
        current.get(last)
    }

    /// The map that holds the last segment.
    pub fn parent_mut<'a>(&self, record: &'a mut Map<String, Value>) -> Option<&'a mut Map<String, Value>> {
        let (_, parents) = self.segments.split_last()?;
        let mut current = record;
        for segment in parents {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        Some(current)
    }

    pub fn contains(&self, record: &Map<String, Value>) -> bool {
        self.get(record).is_some()
    }

    pub fn remove(&self, record: &mut Map<String, Value>) -> Option<Value> {
        let last = self.segments.last()?;
        self.parent_mut(record)?.remove(last)
    }

    /// Insert at this path. Fails (returns the value back) when the parent is
    /// missing or is not a map; intermediate maps are never invented.
    pub fn insert(&self, record: &mut Map<String, Value>, value: Value) -> Result<(), Value> {
        let Some(last) = self.segments.last() else {
            return Err(value);
        };
        match self.parent_mut(record) {
            Some(parent) => {
                parent.insert(last.clone(), value);
                Ok(())
            }
            None => Err(value),
        }
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        FieldPath::parse(&value)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath::parse(value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Short shape name of a plain value, for diagnostics.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
