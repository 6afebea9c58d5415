use super::with_issue_count;
use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::Response;
use menufeed::{fetch_categories, Endpoint, LocaleScope};
use std::sync::Arc;

/// `GET /api/categories`
pub async fn list_categories(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    categories(&state, LocaleScope::none()).await
}

/// `GET /api/{locale}/categories` and the older `GET /api/categories/{locale}`.
pub async fn categories_for_locale(
    State(state): State<Arc<ServerState>>,
    Path(scope): Path<String>,
) -> ServerResult<Response> {
    categories(&state, LocaleScope::locale(scope)).await
}

/// `GET /api/{locale}/categories/{lang}`
pub async fn categories_for_locale_and_language(
    State(state): State<Arc<ServerState>>,
    Path((scope, lang)): Path<(String, String)>,
) -> ServerResult<Response> {
    categories(&state, LocaleScope::locale(scope).with_language(lang)).await
}

async fn categories(state: &ServerState, scope: LocaleScope) -> ServerResult<Response> {
    let query = state.query(Endpoint::Categories, &scope);
    let index = fetch_categories(state.source.as_ref(), &query, &state.normalizer).await?;
    let issues = index.issues.len();
    Ok(with_issue_count(index.into_value(), issues))
}
