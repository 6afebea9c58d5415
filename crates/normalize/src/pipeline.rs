use std::borrow::Cow;
use std::time::Instant;

use content::{Entry, FieldMap, FieldValue};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::category::build_categories;
use crate::error::NormalizeError;
use crate::indexer::index_records;
use crate::issue::IssueReport;
use crate::registry::TransformRegistry;
use crate::unwrap::{unwrap_entry, UnwrapOptions};

/// Ordered records produced from one batch of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub records: Vec<Map<String, Value>>,
    pub issues: IssueReport,
}

impl NormalizedBatch {
    pub fn into_value(self) -> Value {
        Value::Array(self.records.into_iter().map(Value::Object).collect())
    }
}

/// Category records keyed by id, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryIndex {
    pub categories: Map<String, Value>,
    pub issues: IssueReport,
}

impl CategoryIndex {
    pub fn into_value(self) -> Value {
        Value::Object(self.categories)
    }
}

/// Unwrapping options plus the rule registry: everything needed to turn
/// fetched entries into client records. Holds no per-request state and can
/// be shared freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalizer {
    pub options: UnwrapOptions,
    pub registry: TransformRegistry,
}

impl Normalizer {
    pub fn new(options: UnwrapOptions, registry: TransformRegistry) -> Self {
        Self { options, registry }
    }

    /// Standard rules with default options.
    pub fn standard() -> Self {
        Self::new(UnwrapOptions::default(), TransformRegistry::standard())
    }

    /// Options with the depth bound lowered to the include depth the graph
    /// was actually fetched with.
    fn options_for(&self, include: Option<u8>) -> UnwrapOptions {
        let mut opts = self.options.clone();
        if let Some(include) = include {
            opts.max_depth = opts.max_depth.min(include);
        }
        opts
    }

    /// Unwrap one entry and run its content type's rules.
    pub fn normalize_entry(&self, entry: &Entry, issues: &mut IssueReport) -> Map<String, Value> {
        self.normalize_with(entry, &self.options, issues)
    }

    fn normalize_with(
        &self,
        entry: &Entry,
        opts: &UnwrapOptions,
        issues: &mut IssueReport,
    ) -> Map<String, Value> {
        let mut unwrapped = unwrap_entry(entry, opts);
        let content_type = unwrapped.content_type.clone();
        let record_id = unwrapped.id.clone();
        issues.extend(std::mem::take(&mut unwrapped.issues));
        let record = unwrapped.into_record();
        self.registry
            .apply(&content_type, record, &record_id, opts, issues)
    }

    /// Normalize a batch, keeping input order. A broken record never stops
    /// the others.
    pub fn normalize_entries(&self, entries: &[Entry], include: Option<u8>) -> NormalizedBatch {
        let start = Instant::now();
        let opts = self.options_for(include);
        let mut issues = IssueReport::new();
        let records = entries
            .iter()
            .map(|entry| self.normalize_with(entry, &opts, &mut issues))
            .collect::<Vec<_>>();

        info!(
            records = records.len(),
            issues = issues.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "normalize.batch"
        );
        NormalizedBatch { records, issues }
    }

    /// Build the keyed category tree from the root wrapper entry.
    pub fn category_index(
        &self,
        root: Option<&Entry>,
        list_field: &str,
        include: Option<u8>,
    ) -> Result<CategoryIndex, NormalizeError> {
        let Some(root) = root else {
            warn!(list_field, "normalize.categories.missing_root");
            return Err(NormalizeError::MissingRoot);
        };
        let opts = self.options_for(include);
        let root = with_category_ids(root, list_field);
        let unwrapped = unwrap_entry(&root, &opts);
        let mut issues = unwrapped.issues;

        let tree = build_categories(unwrapped.fields, list_field, &opts)?;
        issues.extend(tree.issues);

        let indexed = index_records(tree.categories);
        issues.extend(indexed.issues);

        Ok(CategoryIndex {
            categories: indexed.records,
            issues,
        })
    }
}

/// Give every resolved category without an `id` field its entry id, the way
/// list records get theirs.
fn with_category_ids<'e>(root: &'e Entry, list_field: &str) -> Cow<'e, Entry> {
    let Some(FieldValue::List(items)) = root.fields.get(list_field) else {
        return Cow::Borrowed(root);
    };
    let lacks_id = |item: &FieldValue| {
        matches!(item, FieldValue::Reference(entry) if !entry.fields.contains_key("id"))
    };
    if !items.iter().any(lacks_id) {
        return Cow::Borrowed(root);
    }

    let items = items
        .iter()
        .map(|item| match item {
            FieldValue::Reference(entry) if lacks_id(item) => {
                let fields: FieldMap = std::iter::once(("id".to_string(), FieldValue::Text(entry.id.clone())))
                    .chain(entry.fields.iter().map(|(k, v)| (k.to_string(), v.clone())))
                    .collect();
                FieldValue::Reference(Box::new(Entry {
                    id: entry.id.clone(),
                    content_type: entry.content_type.clone(),
                    kind: entry.kind,
                    fields,
                }))
            }
            other => other.clone(),
        })
        .collect::<Vec<_>>();

    let mut patched = root.clone();
    patched.fields.insert(list_field, FieldValue::List(items));
    Cow::Owned(patched)
}
