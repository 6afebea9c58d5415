//! The fetch seam between request handling and the delivery API.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use content::{decode_collection, EntryCollection};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::FetchError;
use crate::query::EntryQuery;

/// Anything that can list entries for a query.
///
/// Implementors only provide [`fetch_raw`](ContentSource::fetch_raw), the
/// undecoded response body. [`fetch`](ContentSource::fetch) decodes it into an
/// entry graph resolved to the query's include depth.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_raw(&self, query: &EntryQuery) -> Result<Value, FetchError>;

    async fn fetch(&self, query: &EntryQuery) -> Result<EntryCollection, FetchError> {
        let body = self.fetch_raw(query).await?;
        let collection = decode_collection(&body, query.include_depth())?;
        debug!(
            content_type = %query.content_type,
            items = collection.items.len(),
            include = collection.include,
            "delivery.decode"
        );
        Ok(collection)
    }
}

/// In-memory source serving canned response bodies by content type.
///
/// Field filters on a query are applied to `items` by string equality, which
/// is enough to serve by-id lookups. Unknown content types answer with an
/// empty collection. Every query seen is recorded.
#[derive(Debug, Default)]
pub struct StaticSource {
    bodies: HashMap<String, Value>,
    failures: HashMap<String, FetchError>,
    fail_all: Option<FetchError>,
    seen: Mutex<Vec<EntryQuery>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for every query on `content_type`.
    pub fn with_body(mut self, content_type: impl Into<String>, body: Value) -> Self {
        self.bodies.insert(content_type.into(), body);
        self
    }

    /// Fail every query on `content_type`.
    pub fn with_failure(mut self, content_type: impl Into<String>, error: FetchError) -> Self {
        self.failures.insert(content_type.into(), error);
        self
    }

    /// Fail every query.
    pub fn failing(error: FetchError) -> Self {
        Self {
            fail_all: Some(error),
            ..Self::default()
        }
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<EntryQuery> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, query: &EntryQuery) {
        match self.seen.lock() {
            Ok(mut seen) => seen.push(query.clone()),
            Err(poisoned) => poisoned.into_inner().push(query.clone()),
        }
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch_raw(&self, query: &EntryQuery) -> Result<Value, FetchError> {
        self.record(query);
        if let Some(error) = &self.fail_all {
            return Err(error.clone());
        }
        if let Some(error) = self.failures.get(&query.content_type) {
            return Err(error.clone());
        }
        let Some(body) = self.bodies.get(&query.content_type) else {
            return Ok(json!({"items": [], "total": 0, "skip": 0, "limit": 100}));
        };
        Ok(filter_items(body, &query.field_filters))
    }
}

fn filter_items(body: &Value, filters: &[(String, String)]) -> Value {
    if filters.is_empty() {
        return body.clone();
    }
    let mut body = body.clone();
    if let Some(Value::Array(items)) = body.get_mut("items") {
        items.retain(|item| {
            filters.iter().all(|(name, expected)| {
                match item.get("fields").and_then(|f| f.get(name)) {
                    Some(Value::String(actual)) => actual == expected,
                    Some(Value::Number(actual)) => actual.to_string() == *expected,
                    _ => false,
                }
            })
        });
        let total = items.len();
        body["total"] = json!(total);
    }
    body
}
