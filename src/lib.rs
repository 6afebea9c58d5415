//! Menufeed: menu content normalization for a headless CMS.
//!
//! This crate stitches the delivery client and the normalization engine
//! together so callers can go from "which endpoint" to client-ready JSON with
//! one call. The workspace crates do the real work:
//!
//! - `content` decodes delivery responses into a typed entry graph,
//! - `normalize` unwraps, transforms, builds category trees and indexes,
//! - `delivery` fetches (over HTTP or from memory).

pub mod config;

pub use content::{
    decode_collection, ContentError, Entry, EntryCollection, FieldMap, FieldValue, Link,
    MAX_INCLUDE_DEPTH,
};
pub use delivery::{
    CdaClient, ContentSource, DeliveryConfig, EntryQuery, FetchError, LocaleScope, StaticSource,
};
pub use normalize::{
    CategoryIndex, Issue, IssueKind, IssueReport, NormalizeError, NormalizedBatch, Normalizer,
    TransformRegistry, UnwrapOptions,
};

pub use crate::config::{ConfigLoadError, MenufeedConfig};

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use tracing::{info, warn};

/// Field on the category wrapper entry that holds the ordered categories.
pub const CATEGORY_LIST_FIELD: &str = "categories";

/// Content type of the category wrapper entry.
pub const CATEGORY_CONTENT_TYPE: &str = "wrapperForCategories";

/// Errors that can occur while serving one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Fetch(FetchError),
    Normalize(NormalizeError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Fetch(err) => write!(f, "fetch failure: {err}"),
            PipelineError::Normalize(err) => write!(f, "normalization failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Fetch(err) => Some(err),
            PipelineError::Normalize(err) => Some(err),
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(value: FetchError) -> Self {
        PipelineError::Fetch(value)
    }
}

impl From<NormalizeError> for PipelineError {
    fn from(value: NormalizeError) -> Self {
        PipelineError::Normalize(value)
    }
}

/// Every collection the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Categories,
    Cards,
    Products,
    Deals,
    Meals,
    Promos,
    Ingredients,
    Languages,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Categories,
        Endpoint::Cards,
        Endpoint::Products,
        Endpoint::Deals,
        Endpoint::Meals,
        Endpoint::Promos,
        Endpoint::Ingredients,
        Endpoint::Languages,
    ];

    /// Path segment and configuration key.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Categories => "categories",
            Endpoint::Cards => "cards",
            Endpoint::Products => "products",
            Endpoint::Deals => "deals",
            Endpoint::Meals => "meals",
            Endpoint::Promos => "promos",
            Endpoint::Ingredients => "ingredients",
            Endpoint::Languages => "languages",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Endpoint::Categories => CATEGORY_CONTENT_TYPE,
            Endpoint::Cards => "card",
            Endpoint::Products => "product",
            Endpoint::Deals => "deal",
            Endpoint::Meals => "meal",
            Endpoint::Promos => "promo",
            Endpoint::Ingredients => "ingredient",
            Endpoint::Languages => "language",
        }
    }

    /// Include depth fetched with when nothing overrides it. `None` leaves
    /// the delivery API default in place.
    pub fn default_include(self) -> Option<u8> {
        match self {
            Endpoint::Categories | Endpoint::Cards | Endpoint::Products => Some(6),
            _ => None,
        }
    }

    /// Categories come back as an id-keyed tree; everything else as a list.
    pub fn is_tree(self) -> bool {
        self == Endpoint::Categories
    }

    /// The listing query for this endpoint.
    pub fn query(self, include: Option<u8>, scope: &LocaleScope, language_field: &str) -> EntryQuery {
        let mut query = EntryQuery::new(self.content_type());
        if let Some(depth) = include {
            query = query.include(depth);
        }
        query.scoped(scope, language_field)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.name() == s)
            .ok_or_else(|| format!("unknown endpoint `{s}`"))
    }
}

/// Run the generic record pipeline over a fetched collection.
pub fn normalize_collection(collection: &EntryCollection, normalizer: &Normalizer) -> NormalizedBatch {
    normalizer.normalize_entries(&collection.items, Some(collection.include))
}

/// Build the keyed category tree from a fetched wrapper collection. The
/// first item is the wrapper.
pub fn build_category_index(
    collection: &EntryCollection,
    normalizer: &Normalizer,
) -> Result<CategoryIndex, PipelineError> {
    let index = normalizer.category_index(
        collection.items.first(),
        CATEGORY_LIST_FIELD,
        Some(collection.include),
    )?;
    Ok(index)
}

/// Fetch once, then normalize every item.
pub async fn fetch_and_normalize(
    source: &dyn ContentSource,
    query: &EntryQuery,
    normalizer: &Normalizer,
) -> Result<NormalizedBatch, PipelineError> {
    let start = Instant::now();
    let collection = fetch(source, query).await?;
    let batch = normalize_collection(&collection, normalizer);
    info!(
        content_type = %query.content_type,
        records = batch.records.len(),
        issues = batch.issues.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "pipeline.records"
    );
    Ok(batch)
}

/// Fetch the category wrapper, then build the keyed tree.
pub async fn fetch_categories(
    source: &dyn ContentSource,
    query: &EntryQuery,
    normalizer: &Normalizer,
) -> Result<CategoryIndex, PipelineError> {
    let start = Instant::now();
    let collection = fetch(source, query).await?;
    let index = build_category_index(&collection, normalizer).inspect_err(|err| {
        warn!(content_type = %query.content_type, error = %err, "pipeline.categories_failed");
    })?;
    info!(
        content_type = %query.content_type,
        categories = index.categories.len(),
        issues = index.issues.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "pipeline.categories"
    );
    Ok(index)
}

async fn fetch(source: &dyn ContentSource, query: &EntryQuery) -> Result<EntryCollection, PipelineError> {
    source.fetch(query).await.map_err(|err| {
        warn!(content_type = %query.content_type, error = %err, "pipeline.fetch_failed");
        PipelineError::Fetch(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.name().parse::<Endpoint>(), Ok(endpoint));
        }
        assert!("burgers".parse::<Endpoint>().is_err());
    }

    #[test]
    fn tree_shaped_endpoints_fetch_deep() {
        assert!(Endpoint::Categories.is_tree());
        assert_eq!(Endpoint::Categories.default_include(), Some(6));
        assert_eq!(Endpoint::Deals.default_include(), None);
        let query = Endpoint::Products.query(Some(6), &LocaleScope::language("fr"), "localeId");
        assert_eq!(query.content_type, "product");
        assert_eq!(query.include, Some(6));
        assert_eq!(query.field_filters, vec![("localeId".to_string(), "fr".to_string())]);
    }

    #[test]
    fn pipeline_error_keeps_source() {
        let err = PipelineError::from(FetchError::Transport("refused".into()));
        assert_eq!(err.to_string(), "fetch failure: delivery request failed: refused");
        assert!(err.source().is_some());
        let err = PipelineError::from(NormalizeError::MissingRoot);
        assert!(err.to_string().starts_with("normalization failure"));
    }
}
