//! Publish/unpublish state machine
//!
//! Publishing promotes the draft to the published snapshot and clears the
//! draft pointer. Unpublishing removes visibility without losing content:
//! if there is no separate draft, the published revision is demoted to it.
//! Revisions no longer referenced by either pointer are deleted.

use crate::draft::{
    ensure_artwork_draft, ensure_artwork_unlocked, ensure_series_draft, ensure_series_unlocked,
};
use crate::error::Result;
use crate::storage::{RevisionTable, artworks, purge_revisions, series};
use crate::tenancy::Scope;
use atelier::{ArtworkId, RevisionId, RevisionPointers, RevisionState, SeriesId};
use sqlx::SqliteConnection;
use tracing::{debug, info};

/// Promote the series draft to the published snapshot.
///
/// Publishing with nothing pending does not clone and re-publish: it returns
/// the live revision id unchanged, so repeated publishes never churn ids.
pub(crate) async fn publish_series(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &SeriesId,
) -> Result<RevisionId> {
    let mut target = series::load_series(conn, scope, id).await?;
    ensure_series_unlocked(&target)?;

    if let RevisionState::PublishedOnly { published } = target.pointers.state() {
        // Nothing pending. Collapse an in-sync draft pointer and keep the snapshot.
        if target.pointers.draft.is_some() {
            let next = RevisionPointers::published_only(published.clone());
            series::swap_series_pointers(conn, &mut target, next).await?;
        }
        debug!(series_id = %id, revision_id = %published, "Series already published");
        return Ok(published);
    }

    let draft = ensure_series_draft(conn, &mut target).await?;
    let before = target.pointers.clone();
    let next = RevisionPointers::publish(draft.id.clone());
    series::swap_series_pointers(conn, &mut target, next).await?;
    purge_revisions(conn, RevisionTable::Series, &before.released_by(&target.pointers)).await?;

    info!(series_id = %id, revision_id = %draft.id, "Published series");
    Ok(draft.id)
}

pub(crate) async fn unpublish_series(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &SeriesId,
) -> Result<RevisionPointers> {
    let mut target = series::load_series(conn, scope, id).await?;
    ensure_series_unlocked(&target)?;

    let before = target.pointers.clone();
    let next = before.unpublish();
    if next != before {
        series::swap_series_pointers(conn, &mut target, next).await?;
        purge_revisions(conn, RevisionTable::Series, &before.released_by(&target.pointers)).await?;
        info!(series_id = %id, "Unpublished series");
    }
    Ok(target.pointers)
}

/// Promote the artwork draft to the published snapshot.
///
/// Like [`publish_series`], a publish with no pending edit is a no-op that
/// returns the live revision id without cloning it.
pub(crate) async fn publish_artwork(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &ArtworkId,
) -> Result<RevisionId> {
    let mut target = artworks::load_artwork(conn, scope, id).await?;
    ensure_artwork_unlocked(&target)?;

    if let RevisionState::PublishedOnly { published } = target.pointers.state() {
        if target.pointers.draft.is_some() {
            let next = RevisionPointers::published_only(published.clone());
            artworks::swap_artwork_pointers(conn, &mut target, next).await?;
        }
        debug!(artwork_id = %id, revision_id = %published, "Artwork already published");
        return Ok(published);
    }

    let draft = ensure_artwork_draft(conn, &mut target).await?;
    let before = target.pointers.clone();
    let next = RevisionPointers::publish(draft.id.clone());
    artworks::swap_artwork_pointers(conn, &mut target, next).await?;
    purge_revisions(conn, RevisionTable::Artwork, &before.released_by(&target.pointers)).await?;

    info!(artwork_id = %id, revision_id = %draft.id, "Published artwork");
    Ok(draft.id)
}

pub(crate) async fn unpublish_artwork(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &ArtworkId,
) -> Result<RevisionPointers> {
    let mut target = artworks::load_artwork(conn, scope, id).await?;
    ensure_artwork_unlocked(&target)?;

    let before = target.pointers.clone();
    let next = before.unpublish();
    if next != before {
        artworks::swap_artwork_pointers(conn, &mut target, next).await?;
        purge_revisions(conn, RevisionTable::Artwork, &before.released_by(&target.pointers)).await?;
        info!(artwork_id = %id, "Unpublished artwork");
    }
    Ok(target.pointers)
}
