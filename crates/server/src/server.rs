//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with every menu endpoint
//! - Middleware stack (request ids, logging, timeout, compression, CORS)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{categories, collections, health, raw};
use crate::state::ServerState;
use axum::http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use menufeed::Endpoint;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// The second path segment is a literal (`/api/products`) or a scope
/// (`/api/{scope}/products`); static segments win. Within `{scope}` routes
/// the value means a locale code or a language family, depending on the
/// route.
///
/// Middleware, outermost first:
/// 1. Tracing
/// 2. Request ID
/// 3. Request logging
/// 4. CORS
/// 5. Compression
/// 6. Timeout
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([
                ORIGIN,
                HeaderName::from_static("x-requested-with"),
                CONTENT_TYPE,
                ACCEPT,
            ])
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check));

    let menu_routes = Router::new()
        // Category tree
        .route("/api/categories", get(categories::list_categories))
        .route(
            "/api/categories/{scope}",
            get(categories::categories_for_locale),
        )
        .route(
            "/api/{scope}/categories",
            get(categories::categories_for_locale),
        )
        .route(
            "/api/{scope}/categories/{lang}",
            get(categories::categories_for_locale_and_language),
        )
        // Listings
        .route("/api/cards", collections::listing(Endpoint::Cards))
        .route("/api/products", collections::listing(Endpoint::Products))
        .route("/api/deals", collections::listing(Endpoint::Deals))
        .route("/api/meals", collections::listing(Endpoint::Meals))
        .route("/api/promos", collections::listing(Endpoint::Promos))
        .route("/api/ingredients", collections::listing(Endpoint::Ingredients))
        .route("/api/languages", collections::listing(Endpoint::Languages))
        .route(
            "/api/{scope}/products",
            collections::listing_by_language(Endpoint::Products),
        )
        .route(
            "/api/{scope}/meals",
            collections::listing_by_language(Endpoint::Meals),
        )
        .route(
            "/api/{scope}/languages",
            collections::listing_by_locale(Endpoint::Languages),
        )
        .route(
            "/api/product/type/{id}",
            get(collections::products_by_type),
        )
        // Raw lookups
        .route("/api/product/{id}", raw::by_id(Endpoint::Products))
        .route("/api/deal/{id}", raw::by_id(Endpoint::Deals))
        .route("/api/promo/{id}", raw::by_id(Endpoint::Promos));

    Router::new()
        .merge(public_routes)
        .merge(menu_routes)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_id))
                .layer(from_fn(log_requests))
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    state.config.timeout(),
                )),
        )
        .with_state(state)
}

/// Start the Menufeed HTTP server
///
/// Sets up JSON logging, builds shared state (delivery client, pipeline
/// rules) and serves until SIGTERM or Ctrl+C.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    let state = Arc::new(ServerState::new(config.clone())?);
    let app = build_router(state);
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        %addr,
        space_id = %config.delivery.space_id,
        environment = %config.delivery.environment,
        pipeline_file = config.pipeline_file.as_deref().unwrap_or("-"),
        "server_starting"
    );
    tracing::info!(
        timeout_secs = config.timeout_secs,
        cors = config.enable_cors,
        "server_settings"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
