use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::routing::{get, MethodRouter};
use axum::Json;
use menufeed::{Endpoint, EntryQuery};
use std::sync::Arc;

/// Field holding the client-facing id on every entry.
pub const ID_FIELD: &str = "id";

/// `GET /api/<kind>/{id}`: the delivery response for entries whose `id`
/// field matches, passed through without normalization.
pub fn by_id(endpoint: Endpoint) -> MethodRouter<Arc<ServerState>> {
    get(
        move |State(state): State<Arc<ServerState>>, Path(id): Path<String>| async move {
            let query = EntryQuery::new(endpoint.content_type()).field(ID_FIELD, id);
            let body = state.source.fetch_raw(&query).await?;
            ServerResult::Ok(Json(body))
        },
    )
}
