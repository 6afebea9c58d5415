//! Error types produced while decoding a delivery response.
//!
//! Decoding only fails when the response is structurally unusable (no `items`
//! array, an item without `sys`). Links that cannot be resolved are never an
//! error: they decode into [`FieldValue::Stub`](crate::FieldValue::Stub).
use thiserror::Error;

/// Errors that can occur while turning a delivery response into an entry graph.
///
/// # Examples
///
/// ```rust
/// use content::ContentError;
///
/// let err = ContentError::MissingSys { index: 3 };
/// assert_eq!(err.to_string(), "item 3 has no sys block");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    /// The response body was not a JSON object.
    #[error("delivery response is not a JSON object")]
    NotAnObject,

    /// The response has no `items` array.
    #[error("delivery response has no items array")]
    InvalidItems,

    /// An item (or include) lacks the `sys` block carrying its identity.
    #[error("item {index} has no sys block")]
    MissingSys { index: usize },

    /// A `sys` block lacks a required attribute.
    #[error("sys block is missing `{0}`")]
    MissingField(&'static str),
}
