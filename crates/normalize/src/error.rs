use thiserror::Error;

/// Fatal normalization failures. Per-record problems are reported as
/// [`Issue`](crate::Issue)s instead and never abort a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no root entry to build from")]
    MissingRoot,
    #[error("root entry has no `{0}` field")]
    MissingListField(String),
    #[error("root field `{field}` is {found}, expected a list")]
    InvalidListField { field: String, found: &'static str },
}
