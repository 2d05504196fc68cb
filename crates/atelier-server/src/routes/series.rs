//! Series lifecycle routes and the batch operations on a series' artworks

use crate::{
    AppState,
    auth::RequestScope,
    error::{ApiError, Result},
    models::{
        ApiResponse, CreatedResponse, DeletedResponse, DiscardRequest, LockRequest,
        ReorderRequest, RevisionResponse, UnpublishResponse, ViewQuery,
    },
};
use atelier::{NewArtwork, NewSeries, SeriesId, SeriesPatch, SeriesView};
use atelier_registry::{DiscardOutcome, ReorderOutcome};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::{debug, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_series))
        .route(
            "/{id}",
            get(get_series).put(update_series).delete(delete_series),
        )
        .route("/{id}/draft", post(ensure_draft))
        .route("/{id}/publish", post(publish_series))
        .route("/{id}/unpublish", post(unpublish_series))
        .route("/{id}/lock", put(set_lock))
        .route(
            "/{id}/artworks",
            post(create_artwork).delete(delete_series_artworks),
        )
        .route("/{id}/artworks/reorder", put(reorder_artworks))
        .route("/{id}/artworks/discard-drafts", post(discard_drafts))
}

async fn create_series(
    State(state): State<AppState>,
    request: RequestScope,
    Json(body): Json<NewSeries>,
) -> Result<impl IntoResponse> {
    let id = state.registry.create_series(&request.scope, &body).await?;

    info!(user = %request.caller.user_id, series = %id, "Created series");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CreatedResponse { id: id.to_string() })),
    ))
}

async fn get_series(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ApiResponse<SeriesView>>> {
    let kind = query.kind()?;
    debug!(series = %id, view = ?kind, "Reading series");

    let view = state
        .registry
        .series_view(&request.scope, &SeriesId(id), kind)
        .await?;
    Ok(Json(ApiResponse::new(view)))
}

async fn update_series(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Json(patch): Json<SeriesPatch>,
) -> Result<Json<ApiResponse<RevisionResponse>>> {
    let revision_id = state
        .registry
        .update_series(&request.scope, &SeriesId(id), &patch)
        .await?;
    Ok(Json(ApiResponse::new(RevisionResponse { revision_id })))
}

async fn delete_series(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = SeriesId(id);
    state.registry.delete_series(&request.scope, &id).await?;

    info!(user = %request.caller.user_id, series = %id, "Deleted series");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_draft(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RevisionResponse>>> {
    let revision_id = state
        .registry
        .ensure_series_draft(&request.scope, &SeriesId(id))
        .await?;
    Ok(Json(ApiResponse::new(RevisionResponse { revision_id })))
}

async fn publish_series(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RevisionResponse>>> {
    let id = SeriesId(id);
    let revision_id = state.registry.publish_series(&request.scope, &id).await?;
    Ok(Json(ApiResponse::with_message(
        RevisionResponse { revision_id },
        format!("Series {} published", id),
    )))
}

async fn unpublish_series(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UnpublishResponse>>> {
    let id = SeriesId(id);
    let pointers = state.registry.unpublish_series(&request.scope, &id).await?;
    Ok(Json(ApiResponse::with_message(
        pointers.into(),
        format!("Series {} unpublished", id),
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
        .set_series_lock(&request.scope, &SeriesId(id), body.locked)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_artwork(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Json(body): Json<NewArtwork>,
) -> Result<impl IntoResponse> {
    let series_id = SeriesId(id);
    let artwork_id = state
        .registry
        .create_artwork(&request.scope, &series_id, &body)
        .await?;

    info!(series = %series_id, artwork = %artwork_id, "Created artwork");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CreatedResponse {
            id: artwork_id.to_string(),
        })),
    ))
}

async fn delete_series_artworks(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let deleted = state
        .registry
        .delete_series_artworks(&request.scope, &SeriesId(id))
        .await?;
    Ok(Json(ApiResponse::new(DeletedResponse { deleted })))
}

async fn reorder_artworks(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<ApiResponse<ReorderOutcome>>> {
    let outcome = state
        .registry
        .reorder_artworks(&request.scope, &SeriesId(id), &body.artwork_ids)
        .await?;
    Ok(Json(ApiResponse::new(outcome)))
}

/// Discard pending drafts; the body is optional
async fn discard_drafts(
    State(state): State<AppState>,
    request: RequestScope,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<DiscardOutcome>>> {
    let selection: DiscardRequest = if body.iter().all(u8::is_ascii_whitespace) {
        DiscardRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(&format!("Invalid discard request: {}", e)))?
    };

    let outcome = state
        .registry
        .discard_artwork_drafts(&request.scope, &SeriesId(id), &selection.artwork_ids)
        .await?;
    Ok(Json(ApiResponse::new(outcome)))
}
