//! Creation and field mutation of identities

use crate::draft::{
    ensure_artwork_draft, ensure_artwork_unlocked, ensure_series_draft, ensure_series_unlocked,
};
use crate::error::Result;
use crate::storage::{RevisionTable, artworks, media, series};
use crate::tenancy::Scope;
use atelier::{
    Artwork, ArtworkId, ArtworkPatch, ArtworkRevision, NewArtwork, NewSeries, Owner, RevisionId,
    RevisionPointers, Series, SeriesId, SeriesPatch, SeriesRevision, Validate,
};
use sqlx::SqliteConnection;
use tracing::debug;

/// Initial pointers: user content starts as a draft, templates start published
fn initial_pointers(owner: Owner, revision: RevisionId) -> RevisionPointers {
    match owner {
        Owner::User(_) => RevisionPointers::draft_only(revision),
        Owner::System => RevisionPointers::published_only(revision),
    }
}

pub(crate) async fn create_series(
    conn: &mut SqliteConnection,
    scope: &Scope,
    request: &NewSeries,
) -> Result<SeriesId> {
    request.validate()?;

    let mut identity = Series::new(scope.owner(), request.id_locked);
    let mut revision = SeriesRevision::empty(identity.id.clone());
    revision.image = request.image.clone().map(|image| image.into_image());
    revision.i18n = request.i18n.clone();
    identity.pointers = initial_pointers(identity.owner, revision.id.clone());

    series::insert_series(conn, &identity).await?;
    series::insert_series_revision(conn, &revision).await?;

    debug!(series_id = %identity.id, owner = %identity.owner.kind(), "Created series");
    Ok(identity.id)
}

pub(crate) async fn create_artwork(
    conn: &mut SqliteConnection,
    scope: &Scope,
    series_id: &SeriesId,
    request: &NewArtwork,
) -> Result<ArtworkId> {
    request.validate()?;
    let parent = series::load_series(conn, scope, series_id).await?;

    let sort_index = match request.sort_index {
        Some(index) => index,
        None => artworks::next_sort_index(conn, &parent.id).await?,
    };
    let mut identity = Artwork::new(parent.id.clone(), parent.owner, sort_index);
    identity.locked = request.id_locked;
    identity.sold = request.sold;

    let mut revision = ArtworkRevision::empty(identity.id.clone());
    revision.fields = request.fields.clone();
    revision.image = request.image.clone().map(|image| image.into_image());
    revision.i18n = request.i18n.clone();
    identity.pointers = initial_pointers(identity.owner, revision.id.clone());

    artworks::insert_artwork(conn, &identity).await?;
    artworks::insert_artwork_revision(conn, &revision).await?;
    series::touch_series(conn, &parent.id).await?;

    debug!(artwork_id = %identity.id, series_id = %parent.id, sort_index, "Created artwork");
    Ok(identity.id)
}

/// Apply a partial update to the series draft; returns the draft revision id
pub(crate) async fn update_series(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &SeriesId,
    patch: &SeriesPatch,
) -> Result<RevisionId> {
    patch.validate()?;
    let mut target = series::load_series(conn, scope, id).await?;
    ensure_series_unlocked(&target)?;

    let draft = ensure_series_draft(conn, &mut target).await?;

    if let Some(image) = &patch.image {
        media::upsert_revision_image(conn, RevisionTable::Series, &draft.id, draft.image.as_ref(), image)
            .await?;
    }
    if let Some(i18n) = &patch.i18n {
        for (lang, text) in i18n {
            series::upsert_series_text(conn, &draft.id, lang, text).await?;
        }
    }
    series::touch_series(conn, &target.id).await?;

    Ok(draft.id)
}

/// Apply a partial update to an artwork.
///
/// Identity flags are written to the identity row and show in both views;
/// content fields land on the draft revision.
pub(crate) async fn update_artwork(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &ArtworkId,
    patch: &ArtworkPatch,
) -> Result<RevisionId> {
    patch.validate()?;
    let mut target = artworks::load_artwork(conn, scope, id).await?;
    ensure_artwork_unlocked(&target)?;

    if patch.touches_identity() {
        if let Some(sort_index) = patch.sort_index {
            target.sort_index = sort_index;
        }
        if let Some(locked) = patch.id_locked {
            target.locked = locked;
        }
        if let Some(sold) = patch.sold {
            target.sold = sold;
        }
        artworks::update_artwork_identity(conn, &target).await?;
    }

    let draft = ensure_artwork_draft(conn, &mut target).await?;

    if patch.touches_fields() {
        let mut fields = draft.fields.clone();
        patch.apply_fields(&mut fields);
        artworks::update_artwork_fields(conn, &draft.id, &fields).await?;
    }
    if let Some(image) = &patch.image {
        media::upsert_revision_image(conn, RevisionTable::Artwork, &draft.id, draft.image.as_ref(), image)
            .await?;
    }
    if let Some(i18n) = &patch.i18n {
        for (lang, text) in i18n {
            artworks::upsert_artwork_text(conn, &draft.id, lang, text).await?;
        }
    }

    Ok(draft.id)
}

/// Toggle the lock flag; the lock precondition does not apply here
pub(crate) async fn set_series_lock(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &SeriesId,
    locked: bool,
) -> Result<()> {
    let target = series::load_series(conn, scope, id).await?;
    series::set_series_lock(conn, &target.id, locked).await
}

pub(crate) async fn set_artwork_lock(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &ArtworkId,
    locked: bool,
) -> Result<()> {
    let mut target = artworks::load_artwork(conn, scope, id).await?;
    target.locked = locked;
    artworks::update_artwork_identity(conn, &target).await
}
