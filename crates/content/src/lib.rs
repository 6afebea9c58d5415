//! Menufeed content model.
//!
//! This is where fetched content enters the pipeline. A headless CMS returns
//! entries with their references either embedded (up to the requested
//! include depth) or left as identifier-only links. We decode that response
//! into a typed graph so the normalization stages can tell resolved from
//! unresolved references by variant, not by poking at JSON shapes.
//!
//! ## What we do here
//!
//! - **Model the graph** - [`Entry`], [`FieldMap`], [`FieldValue`], [`Link`].
//! - **Decode responses** - [`decode_collection`] resolves links against the
//!   response's `items` and `includes`, bounded by the include depth.
//! - **Never fail on stubs** - an unresolvable link becomes
//!   [`FieldValue::Stub`]; only a structurally broken response is an error.
//!
//! ## Example
//!
//! ```
//! use content::{decode_collection, FieldValue};
//! use serde_json::json;
//!
//! let body = json!({"items": [{
//!     "sys": {"id": "deal-1", "type": "Entry", "contentType": {"sys": {"id": "deal"}}},
//!     "fields": {"id": "deal-1", "price": 4}
//! }]});
//!
//! let collection = decode_collection(&body, 1).unwrap();
//! assert_eq!(collection.items[0].content_type, "deal");
//! assert_eq!(collection.items[0].fields.get("price"), Some(&FieldValue::from(4i64)));
//! ```

mod decode;
mod error;
mod types;

pub use crate::decode::{decode_collection, MAX_INCLUDE_DEPTH};
pub use crate::error::ContentError;
pub use crate::types::{Entry, EntryCollection, EntryKind, FieldMap, FieldValue, Link, LinkType};
