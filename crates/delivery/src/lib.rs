//! Menufeed delivery collaborator.
//!
//! Everything that talks to the headless CMS lives behind [`ContentSource`]:
//! build an [`EntryQuery`], fetch, and get back a decoded
//! [`EntryCollection`](content::EntryCollection). The rest of the pipeline
//! never sees HTTP.
//!
//! - [`CdaClient`] calls the real delivery API with `reqwest`.
//! - [`StaticSource`] serves canned bodies for tests and offline runs.
//!
//! ```
//! use delivery::{ContentSource, EntryQuery, LocaleScope, StaticSource};
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let source = StaticSource::new().with_body("deal", json!({"items": []}));
//! let query = EntryQuery::new("deal").scoped(&LocaleScope::locale("fr-CA"), "localeId");
//! let deals = source.fetch(&query).await.unwrap();
//! assert!(deals.is_empty());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod client;
mod config;
mod error;
mod query;
mod source;

pub use crate::client::CdaClient;
pub use crate::config::{DeliveryConfig, DeliveryConfigError, DEFAULT_BASE_URL, DEFAULT_ENVIRONMENT};
pub use crate::error::FetchError;
pub use crate::query::{EntryQuery, LocaleScope, DEFAULT_INCLUDE, DEFAULT_LANGUAGE_FIELD};
pub use crate::source::{ContentSource, StaticSource};
