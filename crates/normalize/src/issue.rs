//! Non-fatal diagnostics raised while normalizing a batch.
//!
//! A malformed record never aborts its batch. The stage that hits the problem
//! leaves the value as it found it, logs the event and appends an [`Issue`]
//! so callers (and tests) can see exactly what was skipped.

use serde::Serialize;
use tracing::{debug, warn};

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// A link was still unresolved past the include depth; passed through as-is.
    UnresolvedReference { target: String },
    /// A transform found a value of the wrong shape and was skipped.
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Two records in one batch share an id; the later one won.
    DuplicateKey,
    /// A record had no usable `id` and could not be indexed.
    MissingId,
}

/// One diagnostic, tied to the record and field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub record_id: String,
    pub field: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    pub fn unresolved(record_id: &str, field: &str, target: &str) -> Self {
        Self {
            record_id: record_id.to_string(),
            field: field.to_string(),
            kind: IssueKind::UnresolvedReference {
                target: target.to_string(),
            },
        }
    }

    pub fn shape(record_id: &str, field: &str, expected: &'static str, found: &'static str) -> Self {
        Self {
            record_id: record_id.to_string(),
            field: field.to_string(),
            kind: IssueKind::ShapeMismatch { expected, found },
        }
    }

    fn log(&self) {
        match &self.kind {
            IssueKind::UnresolvedReference { target } => debug!(
                record_id = %self.record_id,
                field = %self.field,
                target = %target,
                "unresolved_reference"
            ),
            IssueKind::ShapeMismatch { expected, found } => warn!(
                record_id = %self.record_id,
                field = %self.field,
                expected,
                found,
                "shape_mismatch"
            ),
            IssueKind::DuplicateKey => warn!(
                record_id = %self.record_id,
                "duplicate_key"
            ),
            IssueKind::MissingId => warn!(
                field = %self.field,
                "missing_id"
            ),
        }
    }
}

/// Ordered collection of the issues one stage produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueReport {
    issues: Vec<Issue>,
}

impl IssueReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record an issue.
    pub fn push(&mut self, issue: Issue) {
        issue.log();
        self.issues.push(issue);
    }

    pub fn extend(&mut self, other: IssueReport) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    pub fn count_where(&self, pred: impl Fn(&IssueKind) -> bool) -> usize {
        self.issues.iter().filter(|i| pred(&i.kind)).count()
    }
}

impl IntoIterator for IssueReport {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}
