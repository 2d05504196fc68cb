//! Artwork lifecycle routes

use crate::{
    AppState,
    auth::RequestScope,
    error::Result,
    models::{ApiResponse, LockRequest, RevisionResponse, UnpublishResponse, ViewQuery},
};
use atelier::{ArtworkId, ArtworkPatch, ArtworkView};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::{debug, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/{id}/draft", post(ensure_draft))
        .route("/{id}/publish", post(publish_artwork))
        .route("/{id}/unpublish", post(unpublish_artwork))
        .route("/{id}/lock", put(set_lock))
}

async fn get_artwork(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ApiResponse<ArtworkView>>> {
    let kind = query.kind()?;
    debug!(artwork = %id, view = ?kind, "Reading artwork");

    let view = state
        .registry
        .artwork_view(&request.scope, &ArtworkId(id), kind)
        .await?;
    Ok(Json(ApiResponse::new(view)))
}

async fn update_artwork(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Json(patch): Json<ArtworkPatch>,
) -> Result<Json<ApiResponse<RevisionResponse>>> {
    let revision_id = state
        .registry
        .update_artwork(&request.scope, &ArtworkId(id), &patch)
        .await?;
    Ok(Json(ApiResponse::new(RevisionResponse { revision_id })))
}

async fn delete_artwork(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = ArtworkId(id);
    state.registry.delete_artwork(&request.scope, &id).await?;

    info!(user = %request.caller.user_id, artwork = %id, "Deleted artwork");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_draft(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RevisionResponse>>> {
    let revision_id = state
        .registry
        .ensure_artwork_draft(&request.scope, &ArtworkId(id))
        .await?;
    Ok(Json(ApiResponse::new(RevisionResponse { revision_id })))
}

async fn publish_artwork(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RevisionResponse>>> {
    let id = ArtworkId(id);
    let revision_id = state.registry.publish_artwork(&request.scope, &id).await?;
    Ok(Json(ApiResponse::with_message(
        RevisionResponse { revision_id },
        format!("Artwork {} published", id),
    )))
}

async fn unpublish_artwork(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UnpublishResponse>>> {
    let id = ArtworkId(id);
    let pointers = state
        .registry
        .unpublish_artwork(&request.scope, &id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        pointers.into(),
        format!("Artwork {} unpublished", id),
    )))
}

async fn set_lock(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Json(body): Json<LockRequest>,
) -> Result<StatusCode> {
    state
        .registry
        .set_artwork_lock(&request.scope, &ArtworkId(id), body.locked)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
