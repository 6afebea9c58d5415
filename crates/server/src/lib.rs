//! Menufeed Server - HTTP API for normalized menu content
//!
//! Every route fetches from the delivery API once, runs the normalization
//! pipeline and answers with client-ready JSON. Nothing is cached between
//! requests.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness check
//! - `GET /api/categories` - Category tree keyed by id
//! - `GET /api/{locale}/categories[/{lang}]` - Locale scoped category tree
//! - `GET /api/cards|products|deals|meals|promos|ingredients|languages` - Normalized records
//! - `GET /api/{lang}/products`, `GET /api/{lang}/meals` - Language scoped records
//! - `GET /api/{locale}/languages` - Locale scoped languages
//! - `GET /api/product/type/{id}` - Products under a parent type
//! - `GET /api/product/{id}`, `/api/deal/{id}`, `/api/promo/{id}` - Raw delivery response
//!
//! Failures answer with `{"error": {"code", "message"}}`: `502` when the
//! delivery API or normalization fails, `404` for unknown routes.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
