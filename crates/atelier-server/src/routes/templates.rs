//! System template catalogue

use crate::{
    AppState,
    auth::Caller,
    error::Result,
    models::{ApiResponse, CreatedResponse},
};
use atelier::{SeriesId, SeriesView};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{debug, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/works", get(list_templates))
        .route("/series/{id}/copy", post(copy_template))
}

/// Published template series, visible to every caller
async fn list_templates(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApiResponse<Vec<SeriesView>>>> {
    debug!(user = %caller.user_id, "Listing templates");

    let templates = state.registry.list_templates().await?;
    Ok(Json(ApiResponse::new(templates)))
}

/// Copy a template into a new draft series owned by the caller
async fn copy_template(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let template_id = SeriesId(id);
    let series_id = state
        .registry
        .copy_template(&template_id, caller.user_id)
        .await?;

    info!(user = %caller.user_id, template = %template_id, series = %series_id, "Copied template");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            CreatedResponse {
                id: series_id.to_string(),
            },
            format!("Template {} copied", template_id),
        )),
    ))
}
