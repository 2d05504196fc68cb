//! Draft resolver
//!
//! Guarantees that an identity has an editable draft revision. When the only
//! live content is published, the published revision is deep-cloned first
//! (copy-on-write) so edits never reach the live snapshot. Must run inside
//! the caller's transaction.

use crate::error::{RegistryError, Result};
use crate::storage::{artworks, series};
use atelier::{Artwork, ArtworkRevision, RevisionState, Series, SeriesRevision};
use sqlx::SqliteConnection;
use tracing::debug;

pub(crate) fn ensure_series_unlocked(series: &Series) -> Result<()> {
    if series.locked {
        return Err(RegistryError::Locked(format!("Series {}", series.id)));
    }
    Ok(())
}

pub(crate) fn ensure_artwork_unlocked(artwork: &Artwork) -> Result<()> {
    if artwork.locked {
        return Err(RegistryError::Locked(format!("Artwork {}", artwork.id)));
    }
    Ok(())
}

/// Load or create the editable draft of a series
pub(crate) async fn ensure_series_draft(
    conn: &mut SqliteConnection,
    target: &mut Series,
) -> Result<SeriesRevision> {
    let draft = match target.pointers.state() {
        RevisionState::DraftOnly { draft } | RevisionState::Diverged { draft, .. } => {
            return series::load_series_revision(conn, &draft).await;
        }
        RevisionState::PublishedOnly { published } => {
            let source = series::load_series_revision(conn, &published).await?;
            let draft = source.duplicate();
            debug!(series_id = %target.id, from = %published, to = %draft.id, "Cloning published series revision");
            draft
        }
        RevisionState::Empty => SeriesRevision::empty(target.id.clone()),
    };

    series::insert_series_revision(conn, &draft).await?;
    let next = target.pointers.with_draft(draft.id.clone());
    series::swap_series_pointers(conn, target, next).await?;
    Ok(draft)
}

/// Load or create the editable draft of an artwork
pub(crate) async fn ensure_artwork_draft(
    conn: &mut SqliteConnection,
    target: &mut Artwork,
) -> Result<ArtworkRevision> {
    let draft = match target.pointers.state() {
        RevisionState::DraftOnly { draft } | RevisionState::Diverged { draft, .. } => {
            return artworks::load_artwork_revision(conn, &draft).await;
        }
        RevisionState::PublishedOnly { published } => {
            let source = artworks::load_artwork_revision(conn, &published).await?;
            let draft = source.duplicate();
            debug!(artwork_id = %target.id, from = %published, to = %draft.id, "Cloning published artwork revision");
            draft
        }
        RevisionState::Empty => ArtworkRevision::empty(target.id.clone()),
    };

    artworks::insert_artwork_revision(conn, &draft).await?;
    let next = target.pointers.with_draft(draft.id.clone());
    artworks::swap_artwork_pointers(conn, target, next).await?;
    Ok(draft)
}
