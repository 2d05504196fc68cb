//! Loading identities with their live revisions for projection

use crate::error::Result;
use crate::storage::{artworks, series};
use crate::tenancy::Scope;
use atelier::{
    Artwork, ArtworkId, ArtworkRecord, Series, SeriesId, SeriesRecord, SeriesView, ViewKind,
    WorksView, project_series,
};
use sqlx::SqliteConnection;

async fn artwork_record(conn: &mut SqliteConnection, artwork: Artwork) -> Result<ArtworkRecord> {
    let draft =
        artworks::load_optional_artwork_revision(conn, artwork.pointers.draft.as_ref()).await?;
    let published = if artwork.pointers.published == artwork.pointers.draft {
        draft.clone()
    } else {
        artworks::load_optional_artwork_revision(conn, artwork.pointers.published.as_ref()).await?
    };
    Ok(ArtworkRecord {
        artwork,
        draft,
        published,
    })
}

async fn series_record(
    conn: &mut SqliteConnection,
    scope: &Scope,
    identity: Series,
) -> Result<SeriesRecord> {
    let draft = series::load_optional_series_revision(conn, identity.pointers.draft.as_ref()).await?;
    let published = if identity.pointers.published == identity.pointers.draft {
        draft.clone()
    } else {
        series::load_optional_series_revision(conn, identity.pointers.published.as_ref()).await?
    };

    let mut items = Vec::new();
    for artwork in artworks::list_artworks(conn, scope, &identity.id).await? {
        items.push(artwork_record(conn, artwork).await?);
    }

    Ok(SeriesRecord {
        series: identity,
        draft,
        published,
        items,
    })
}

pub(crate) async fn load_series_record(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &SeriesId,
) -> Result<SeriesRecord> {
    let identity = series::load_series(conn, scope, id).await?;
    series_record(conn, scope, identity).await
}

pub(crate) async fn load_artwork_record(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &ArtworkId,
) -> Result<ArtworkRecord> {
    let artwork = artworks::load_artwork(conn, scope, id).await?;
    artwork_record(conn, artwork).await
}

pub(crate) async fn list_works(
    conn: &mut SqliteConnection,
    scope: &Scope,
    kind: ViewKind,
) -> Result<WorksView> {
    let mut works = WorksView::default();
    for identity in series::list_series(conn, scope).await? {
        let record = series_record(conn, scope, identity).await?;
        works.series.push(project_series(&record, kind));
    }
    Ok(works)
}

/// Published templates with their published artworks only
pub(crate) async fn list_templates(conn: &mut SqliteConnection) -> Result<Vec<SeriesView>> {
    let scope = Scope::templates();
    let mut templates = Vec::new();
    for identity in series::list_series(conn, &scope).await? {
        if !identity.pointers.state().is_published() {
            continue;
        }
        let mut record = series_record(conn, &scope, identity).await?;
        record
            .items
            .retain(|item| item.artwork.pointers.state().is_published());
        templates.push(project_series(&record, ViewKind::Published));
    }
    Ok(templates)
}
