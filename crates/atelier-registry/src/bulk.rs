//! Batch operations over the artworks of one series

use crate::draft::ensure_series_unlocked;
use crate::error::Result;
use crate::storage::{RevisionTable, artworks, purge_artworks, purge_revisions, series};
use crate::tenancy::Scope;
use atelier::{ArtworkId, RevisionState, SeriesId, validate_order};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::{debug, info};

/// Counts reported by a bulk discard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardOutcome {
    pub updated: u64,
    pub skipped: u64,
}

/// Counts reported by a reorder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOutcome {
    pub updated: u64,
    pub ignored: u64,
}

/// Drop pending drafts of artworks that have published content to fall back to.
///
/// Only diverged artworks are touched; unpublished artworks and artworks
/// without a pending edit are skipped. An empty `only` selects every artwork
/// of the series.
pub(crate) async fn discard_artwork_drafts(
    conn: &mut SqliteConnection,
    scope: &Scope,
    series_id: &SeriesId,
    only: &[ArtworkId],
) -> Result<DiscardOutcome> {
    let parent = series::load_series(conn, scope, series_id).await?;
    ensure_series_unlocked(&parent)?;

    let wanted: HashSet<&ArtworkId> = only.iter().collect();
    let mut outcome = DiscardOutcome::default();

    for mut artwork in artworks::list_artworks(conn, scope, &parent.id).await? {
        if !wanted.is_empty() && !wanted.contains(&artwork.id) {
            continue;
        }

        let RevisionState::Diverged { draft, .. } = artwork.pointers.state() else {
            outcome.skipped += 1;
            continue;
        };

        let next = artwork.pointers.discard_draft();
        artworks::swap_artwork_pointers(conn, &mut artwork, next).await?;
        purge_revisions(conn, RevisionTable::Artwork, &[draft.clone()]).await?;
        debug!(artwork_id = %artwork.id, revision_id = %draft, "Discarded draft");
        outcome.updated += 1;
    }

    info!(
        series_id = %series_id,
        updated = outcome.updated,
        skipped = outcome.skipped,
        "Discarded artwork drafts"
    );
    Ok(outcome)
}

/// Assign sort indices 0..n in the given order.
///
/// Ids outside the series or scope are ignored rather than rejected.
pub(crate) async fn reorder_artworks(
    conn: &mut SqliteConnection,
    scope: &Scope,
    series_id: &SeriesId,
    order: &[ArtworkId],
) -> Result<ReorderOutcome> {
    validate_order(order)?;
    let parent = series::load_series(conn, scope, series_id).await?;
    ensure_series_unlocked(&parent)?;

    let mut outcome = ReorderOutcome::default();
    for (position, id) in order.iter().enumerate() {
        if artworks::set_sort_index(conn, scope, &parent.id, id, position as i64).await? {
            outcome.updated += 1;
        } else {
            debug!(series_id = %series_id, artwork_id = %id, "Ignoring foreign artwork in reorder");
            outcome.ignored += 1;
        }
    }
    series::touch_series(conn, &parent.id).await?;

    info!(series_id = %series_id, updated = outcome.updated, ignored = outcome.ignored, "Reordered artworks");
    Ok(outcome)
}

/// Delete every artwork of a series with all revisions they own
pub(crate) async fn delete_series_artworks(
    conn: &mut SqliteConnection,
    scope: &Scope,
    series_id: &SeriesId,
) -> Result<u64> {
    let parent = series::load_series(conn, scope, series_id).await?;
    ensure_series_unlocked(&parent)?;

    let ids: Vec<ArtworkId> = artworks::list_artworks(conn, scope, &parent.id)
        .await?
        .into_iter()
        .map(|artwork| artwork.id)
        .collect();
    let removed = purge_artworks(conn, &ids).await?;

    info!(series_id = %series_id, removed, "Deleted series artworks");
    Ok(removed)
}
