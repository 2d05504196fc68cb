//! Portfolio listing

use crate::{
    AppState,
    auth::RequestScope,
    error::Result,
    models::{ApiResponse, ViewQuery},
};
use atelier::WorksView;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_works))
}

/// Every series in scope with its artworks, newest series first
async fn list_works(
    State(state): State<AppState>,
    request: RequestScope,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ApiResponse<WorksView>>> {
    let kind = query.kind()?;
    debug!(user = %request.caller.user_id, view = ?kind, "Listing works");

    let works = state.registry.list_works(&request.scope, kind).await?;
    Ok(Json(ApiResponse::new(works)))
}
