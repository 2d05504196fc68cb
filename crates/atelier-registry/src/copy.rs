//! Template duplication
//!
//! Deep-copies a published system series and its artworks into a new
//! user-owned graph. Every row of the copy (identities, revisions, text and
//! media) gets a fresh id, and the copy starts in draft state.

use crate::error::{RegistryError, Result};
use crate::storage::{artworks, series};
use crate::tenancy::Scope;
use atelier::{Artwork, ArtworkRevision, RevisionPointers, Series, SeriesId};
use sqlx::SqliteConnection;
use tracing::{debug, info};

pub(crate) async fn copy_template(
    conn: &mut SqliteConnection,
    target: &Scope,
    template_id: &SeriesId,
) -> Result<SeriesId> {
    let source_scope = Scope::templates();
    let template = series::load_series(conn, &source_scope, template_id)
        .await
        .map_err(|e| match e {
            RegistryError::NotFound(_) => RegistryError::NotFound(format!("Template {}", template_id)),
            other => other,
        })?;
    let published = template.pointers.published.clone().ok_or_else(|| {
        RegistryError::NotFound(format!("Template {} has no published content", template_id))
    })?;

    if let Some(existing) = series::find_copy_of(conn, target, template_id).await? {
        return Err(RegistryError::Conflict(format!(
            "template {} was already copied as series {}",
            template_id, existing
        )));
    }

    let source_revision = series::load_series_revision(conn, &published).await?;

    let mut copy = Series::new(target.owner(), template.locked);
    copy.copied_from = Some(template.id.clone());
    let revision = source_revision.duplicate_for(copy.id.clone());
    copy.pointers = RevisionPointers::draft_only(revision.id.clone());

    series::insert_series(conn, &copy).await?;
    series::insert_series_revision(conn, &revision).await?;

    let items = artworks::list_artworks(conn, &source_scope, &template.id).await?;
    for item in &items {
        let source = artworks::load_optional_artwork_revision(conn, item.pointers.published.as_ref()).await?;

        let mut artwork = Artwork::new(copy.id.clone(), copy.owner, item.sort_index);
        artwork.locked = item.locked;
        artwork.sold = false;

        let revision = match source {
            Some(source) => source.duplicate_for(artwork.id.clone()),
            None => ArtworkRevision::empty(artwork.id.clone()),
        };
        artwork.pointers = RevisionPointers::draft_only(revision.id.clone());

        artworks::insert_artwork(conn, &artwork).await?;
        artworks::insert_artwork_revision(conn, &revision).await?;
        debug!(from = %item.id, to = %artwork.id, "Copied template artwork");
    }

    info!(
        template_id = %template_id,
        series_id = %copy.id,
        artworks = items.len(),
        "Copied template series"
    );
    Ok(copy.id)
}
