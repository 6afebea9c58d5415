//! Menufeed normalization.
//!
//! Turns the typed content graph from `content` into the flat JSON records a
//! menu client consumes. Everything here is a pure function of its input:
//! the same entries always produce the same records, and feeding a record
//! back through the rules changes nothing.
//!
//! ## Stages
//!
//! 1. **Unwrap** - [`unwrap_entry`] collapses every resolved reference into
//!    its field map and promotes single-list containers. Unresolved links are
//!    kept as link objects and reported.
//! 2. **Transform** - the [`TransformRegistry`] runs the content type's
//!    [`Transform`] chain: merge loose fields into groups, flatten wrappers,
//!    project product lists, group configurables, relabel drink categories.
//! 3. **Build** - [`build_categories`] reshapes the category tree and
//!    [`index_records`] keys the result by id.
//!
//! [`Normalizer`] strings the stages together. Problems that affect a single
//! field are collected in an [`IssueReport`] rather than failing the batch;
//! only a missing category root is a [`NormalizeError`].
//!
//! ## Example
//!
//! ```
//! use content::Entry;
//! use normalize::{unwrap_entry, UnwrapOptions};
//! use serde_json::json;
//!
//! let burger = Entry::new("b1", "product").with_field("id", "burger");
//! let meal = Entry::new("m1", "meal").with_field("itemAnchor", burger);
//!
//! let unwrapped = unwrap_entry(&meal, &UnwrapOptions::default());
//! assert_eq!(unwrapped.fields["itemAnchor"], json!({"id": "burger"}));
//! assert!(unwrapped.issues.is_empty());
//! ```

mod category;
mod error;
mod indexer;
mod issue;
mod path;
mod pipeline;
mod registry;
mod transform;
mod unwrap;

pub use crate::category::{apply_next_view, build_categories, CategoryTree, NEXT_VIEW_NONE};
pub use crate::error::NormalizeError;
pub use crate::indexer::{index_records, IndexedRecords};
pub use crate::issue::{Issue, IssueKind, IssueReport};
pub use crate::path::FieldPath;
pub use crate::pipeline::{CategoryIndex, NormalizedBatch, Normalizer};
pub use crate::registry::{TransformRegistry, STANDARD_CONTENT_TYPES};
pub use crate::transform::{MergeSource, RenameTable, Transform, TransformContext};
pub use crate::unwrap::{
    promote_container_field, unwrap_entries, unwrap_entry, unwrap_value, UnwrapOptions,
    UnwrappedEntry,
};
