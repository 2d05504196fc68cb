//! Artwork identities and artwork revisions

use super::{format_timestamp, media, parse_timestamp};
use crate::error::{RegistryError, Result};
use crate::tenancy::Scope;
use atelier::{
    Artwork, ArtworkFields, ArtworkId, ArtworkRevision, ArtworkText, Owner, RevisionId,
    RevisionPointers, SeriesId,
};
use sqlx::{Row, SqliteConnection, sqlite::SqliteRow};
use std::collections::BTreeMap;
use time::OffsetDateTime;

const ARTWORK_COLUMNS: &str = "id, series_id, owner_kind, user_id, sort_index, id_locked, sold, \
     draft_revision_id, published_revision_id, version, created_at, updated_at";

fn artwork_from_row(row: &SqliteRow) -> Result<Artwork> {
    let kind: String = row.get("owner_kind");
    let owner = Owner::from_columns(&kind, row.get("user_id"))
        .map_err(|e| RegistryError::storage("Corrupt artwork owner", e))?;

    Ok(Artwork {
        id: ArtworkId(row.get("id")),
        series_id: SeriesId(row.get("series_id")),
        owner,
        sort_index: row.get("sort_index"),
        locked: row.get::<i64, _>("id_locked") != 0,
        sold: row.get::<i64, _>("sold") != 0,
        pointers: RevisionPointers {
            draft: row.get::<Option<String>, _>("draft_revision_id").map(RevisionId),
            published: row
                .get::<Option<String>, _>("published_revision_id")
                .map(RevisionId),
        },
        version: row.get("version"),
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

pub(crate) async fn insert_artwork(conn: &mut SqliteConnection, artwork: &Artwork) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO artwork ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        ARTWORK_COLUMNS
    ))
    .bind(artwork.id.as_ref())
    .bind(artwork.series_id.as_ref())
    .bind(artwork.owner.kind().as_str())
    .bind(artwork.owner.user_id().map(|u| u.0))
    .bind(artwork.sort_index)
    .bind(artwork.locked)
    .bind(artwork.sold)
    .bind(artwork.pointers.draft.as_ref().map(|id| id.as_ref()))
    .bind(artwork.pointers.published.as_ref().map(|id| id.as_ref()))
    .bind(artwork.version)
    .bind(format_timestamp(artwork.created_at)?)
    .bind(format_timestamp(artwork.updated_at)?)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to insert artwork", e))?;
    Ok(())
}

/// Load an artwork visible in `scope`
pub(crate) async fn load_artwork(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &ArtworkId,
) -> Result<Artwork> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM artwork WHERE id = ? AND owner_kind = ? AND user_id IS ?",
        ARTWORK_COLUMNS
    ))
    .bind(id.as_ref())
    .bind(scope.kind_column())
    .bind(scope.user_column())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RegistryError::lookup(format!("Artwork {}", id), e))?;

    artwork_from_row(&row)
}

/// Artworks of a series visible in `scope`, in display order
pub(crate) async fn list_artworks(
    conn: &mut SqliteConnection,
    scope: &Scope,
    series_id: &SeriesId,
) -> Result<Vec<Artwork>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM artwork WHERE series_id = ? AND owner_kind = ? AND user_id IS ? \
         ORDER BY sort_index ASC, created_at ASC, rowid ASC",
        ARTWORK_COLUMNS
    ))
    .bind(series_id.as_ref())
    .bind(scope.kind_column())
    .bind(scope.user_column())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to list artworks", e))?;

    rows.iter().map(artwork_from_row).collect()
}

/// Ids of every artwork attached to a series, regardless of owner
pub(crate) async fn artwork_ids_of_series(
    conn: &mut SqliteConnection,
    series_id: &SeriesId,
) -> Result<Vec<ArtworkId>> {
    let rows = sqlx::query("SELECT id FROM artwork WHERE series_id = ?")
        .bind(series_id.as_ref())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to list series artworks", e))?;

    Ok(rows
        .iter()
        .map(|row| ArtworkId(row.get::<String, _>("id")))
        .collect())
}

/// Next free position at the end of a series
pub(crate) async fn next_sort_index(
    conn: &mut SqliteConnection,
    series_id: &SeriesId,
) -> Result<i64> {
    let row = sqlx::query("SELECT COALESCE(MAX(sort_index) + 1, 0) AS next FROM artwork WHERE series_id = ?")
        .bind(series_id.as_ref())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to compute sort index", e))?;
    Ok(row.get("next"))
}

/// Compare-and-swap the revision pointers of an artwork
pub(crate) async fn swap_artwork_pointers(
    conn: &mut SqliteConnection,
    artwork: &mut Artwork,
    next: RevisionPointers,
) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    let result = sqlx::query(
        "UPDATE artwork SET draft_revision_id = ?, published_revision_id = ?, \
         version = version + 1, updated_at = ? WHERE id = ? AND version = ?",
    )
    .bind(next.draft.as_ref().map(|id| id.as_ref()))
    .bind(next.published.as_ref().map(|id| id.as_ref()))
    .bind(format_timestamp(now)?)
    .bind(artwork.id.as_ref())
    .bind(artwork.version)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to update artwork pointers", e))?;

    if result.rows_affected() == 0 {
        return Err(RegistryError::Conflict(format!(
            "artwork {} was modified concurrently",
            artwork.id
        )));
    }

    artwork.pointers = next;
    artwork.version += 1;
    artwork.updated_at = now;
    Ok(())
}

/// Write the identity-level flags shared by both views
pub(crate) async fn update_artwork_identity(
    conn: &mut SqliteConnection,
    artwork: &Artwork,
) -> Result<()> {
    sqlx::query(
        "UPDATE artwork SET sort_index = ?, id_locked = ?, sold = ?, updated_at = ? WHERE id = ?",
    )
    .bind(artwork.sort_index)
    .bind(artwork.locked)
    .bind(artwork.sold)
    .bind(format_timestamp(OffsetDateTime::now_utc())?)
    .bind(artwork.id.as_ref())
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to update artwork", e))?;
    Ok(())
}

/// Set the position of one artwork; returns false if it is not in the series/scope
pub(crate) async fn set_sort_index(
    conn: &mut SqliteConnection,
    scope: &Scope,
    series_id: &SeriesId,
    id: &ArtworkId,
    sort_index: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE artwork SET sort_index = ? \
         WHERE id = ? AND series_id = ? AND owner_kind = ? AND user_id IS ?",
    )
    .bind(sort_index)
    .bind(id.as_ref())
    .bind(series_id.as_ref())
    .bind(scope.kind_column())
    .bind(scope.user_column())
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to reorder artwork", e))?;
    Ok(result.rows_affected() > 0)
}

/// Persist a revision with its media row and text rows
pub(crate) async fn insert_artwork_revision(
    conn: &mut SqliteConnection,
    revision: &ArtworkRevision,
) -> Result<()> {
    if let Some(image) = &revision.image {
        media::insert_image(conn, image).await?;
    }

    sqlx::query(
        r#"
        INSERT INTO artwork_revision (id, artwork_id, year, medium, size_cm, price, image_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(revision.id.as_ref())
    .bind(revision.artwork_id.as_ref())
    .bind(&revision.fields.year)
    .bind(&revision.fields.medium)
    .bind(&revision.fields.size_cm)
    .bind(&revision.fields.price)
    .bind(revision.image.as_ref().map(|image| image.id.as_ref()))
    .bind(format_timestamp(revision.created_at)?)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to insert artwork revision", e))?;

    for (lang, text) in &revision.i18n {
        upsert_artwork_text(conn, &revision.id, lang, text).await?;
    }
    Ok(())
}

pub(crate) async fn load_artwork_revision(
    conn: &mut SqliteConnection,
    id: &RevisionId,
) -> Result<ArtworkRevision> {
    let row = sqlx::query(
        r#"
        SELECT r.id, r.artwork_id, r.year, r.medium, r.size_cm, r.price, r.created_at,
               i.id AS image_id, i.original_path AS image_original_path,
               i.webp_path AS image_webp_path, i.avif_path AS image_avif_path
        FROM artwork_revision r
        LEFT JOIN image i ON i.id = r.image_id
        WHERE r.id = ?
        "#,
    )
    .bind(id.as_ref())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RegistryError::lookup(format!("Artwork revision {}", id), e))?;

    let texts = sqlx::query(
        "SELECT lang, title, description, notes FROM artwork_i18n_revision WHERE revision_id = ?",
    )
    .bind(id.as_ref())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to load artwork text", e))?;

    let i18n: BTreeMap<String, ArtworkText> = texts
        .iter()
        .map(|row| {
            (
                row.get("lang"),
                ArtworkText {
                    title: row.get("title"),
                    description: row.get("description"),
                    notes: row.get("notes"),
                },
            )
        })
        .collect();

    Ok(ArtworkRevision {
        id: RevisionId(row.get("id")),
        artwork_id: ArtworkId(row.get("artwork_id")),
        fields: ArtworkFields {
            year: row.get("year"),
            medium: row.get("medium"),
            size_cm: row.get("size_cm"),
            price: row.get("price"),
        },
        image: media::image_from_row(&row),
        i18n,
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

pub(crate) async fn load_optional_artwork_revision(
    conn: &mut SqliteConnection,
    id: Option<&RevisionId>,
) -> Result<Option<ArtworkRevision>> {
    match id {
        Some(id) => load_artwork_revision(conn, id).await.map(Some),
        None => Ok(None),
    }
}

pub(crate) async fn update_artwork_fields(
    conn: &mut SqliteConnection,
    revision_id: &RevisionId,
    fields: &ArtworkFields,
) -> Result<()> {
    sqlx::query("UPDATE artwork_revision SET year = ?, medium = ?, size_cm = ?, price = ? WHERE id = ?")
        .bind(&fields.year)
        .bind(&fields.medium)
        .bind(&fields.size_cm)
        .bind(&fields.price)
        .bind(revision_id.as_ref())
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to update artwork fields", e))?;
    Ok(())
}

/// Insert or overwrite the text of one language
pub(crate) async fn upsert_artwork_text(
    conn: &mut SqliteConnection,
    revision_id: &RevisionId,
    lang: &str,
    text: &ArtworkText,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artwork_i18n_revision (revision_id, lang, title, description, notes)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (revision_id, lang) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            notes = excluded.notes
        "#,
    )
    .bind(revision_id.as_ref())
    .bind(lang)
    .bind(&text.title)
    .bind(&text.description)
    .bind(&text.notes)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to upsert artwork text", e))?;
    Ok(())
}
