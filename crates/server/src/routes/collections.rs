//! Record listings. Every collection route runs the same pipeline; only the
//! endpoint and how the path scope is read differ.

use super::with_issue_count;
use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, MethodRouter};
use menufeed::{fetch_and_normalize, Endpoint, EntryQuery, LocaleScope};
use std::sync::Arc;

/// Field on product entries that points at their parent product type.
pub const PARENT_REF_FIELD: &str = "parentRef";

/// `GET /api/<endpoint>`
pub fn listing(endpoint: Endpoint) -> MethodRouter<Arc<ServerState>> {
    get(move |State(state): State<Arc<ServerState>>| async move {
        let query = state.query(endpoint, &LocaleScope::none());
        records(&state, &query).await
    })
}

/// `GET /api/{lang}/<endpoint>`: the scope is a language family code.
pub fn listing_by_language(endpoint: Endpoint) -> MethodRouter<Arc<ServerState>> {
    get(
        move |State(state): State<Arc<ServerState>>, Path(scope): Path<String>| async move {
            let query = state.query(endpoint, &LocaleScope::language(scope));
            records(&state, &query).await
        },
    )
}

/// `GET /api/{locale}/<endpoint>`: the scope is a locale code.
pub fn listing_by_locale(endpoint: Endpoint) -> MethodRouter<Arc<ServerState>> {
    get(
        move |State(state): State<Arc<ServerState>>, Path(scope): Path<String>| async move {
            let query = state.query(endpoint, &LocaleScope::locale(scope));
            records(&state, &query).await
        },
    )
}

/// `GET /api/product/type/{id}`: products whose parent reference is `id`.
pub async fn products_by_type(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<Response> {
    let query = state
        .query(Endpoint::Products, &LocaleScope::none())
        .field(PARENT_REF_FIELD, id);
    records(&state, &query).await
}

async fn records(state: &ServerState, query: &EntryQuery) -> ServerResult<Response> {
    let batch = fetch_and_normalize(state.source.as_ref(), query, &state.normalizer).await?;
    let issues = batch.issues.len();
    Ok(with_issue_count(batch.into_value(), issues))
}
