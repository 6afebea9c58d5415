//! Folds an ordered batch of records into an id-keyed map.

use serde_json::{Map, Value};
use tracing::debug;

use crate::issue::{Issue, IssueKind, IssueReport};

/// Keyed records (in first-seen order) and the batch's indexing issues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedRecords {
    pub records: Map<String, Value>,
    pub issues: IssueReport,
}

impl IndexedRecords {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.records)
    }
}

/// Key each record by its `id`.
///
/// A repeated id replaces the earlier record (last write wins) and is
/// reported as [`IssueKind::DuplicateKey`]; the key keeps its original
/// position. Records without a textual or numeric `id` are dropped with
/// [`IssueKind::MissingId`].
///
/// ```rust
/// use normalize::index_records;
/// use serde_json::json;
///
/// let records = vec![
///     json!({"id": "b", "n": 1}).as_object().unwrap().clone(),
///     json!({"id": "a", "n": 2}).as_object().unwrap().clone(),
/// ];
/// let indexed = index_records(records);
/// assert_eq!(indexed.records.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// ```
pub fn index_records<I>(records: I) -> IndexedRecords
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut out = IndexedRecords::default();
    for (position, record) in records.into_iter().enumerate() {
        let key = match record.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                out.issues.push(Issue {
                    record_id: String::new(),
                    field: format!("[{position}].id"),
                    kind: IssueKind::MissingId,
                });
                continue;
            }
        };
        if out.records.insert(key.clone(), Value::Object(record)).is_some() {
            out.issues.push(Issue {
                record_id: key,
                field: "id".to_string(),
                kind: IssueKind::DuplicateKey,
            });
        }
    }
    debug!(
        records = out.records.len(),
        issues = out.issues.len(),
        "normalize.index"
    );
    out
}
