//! Series identities and series revisions

use super::{format_timestamp, media, parse_timestamp};
use crate::error::{RegistryError, Result};
use crate::tenancy::Scope;
use atelier::{
    Owner, RevisionId, RevisionPointers, Series, SeriesId, SeriesRevision, SeriesText,
};
use sqlx::{Row, SqliteConnection, sqlite::SqliteRow};
use std::collections::BTreeMap;
use time::OffsetDateTime;

const SERIES_COLUMNS: &str = "id, owner_kind, user_id, id_locked, draft_revision_id, \
     published_revision_id, copied_from, version, created_at, updated_at";

fn series_from_row(row: &SqliteRow) -> Result<Series> {
    let kind: String = row.get("owner_kind");
    let owner = Owner::from_columns(&kind, row.get("user_id"))
        .map_err(|e| RegistryError::storage("Corrupt series owner", e))?;

    Ok(Series {
        id: SeriesId(row.get("id")),
        owner,
        locked: row.get::<i64, _>("id_locked") != 0,
        pointers: RevisionPointers {
            draft: row.get::<Option<String>, _>("draft_revision_id").map(RevisionId),
            published: row
                .get::<Option<String>, _>("published_revision_id")
                .map(RevisionId),
        },
        copied_from: row.get::<Option<String>, _>("copied_from").map(SeriesId),
        version: row.get("version"),
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

pub(crate) async fn insert_series(conn: &mut SqliteConnection, series: &Series) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO series ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        SERIES_COLUMNS
    ))
    .bind(series.id.as_ref())
    .bind(series.owner.kind().as_str())
    .bind(series.owner.user_id().map(|u| u.0))
    .bind(series.locked)
    .bind(series.pointers.draft.as_ref().map(|id| id.as_ref()))
    .bind(series.pointers.published.as_ref().map(|id| id.as_ref()))
    .bind(series.copied_from.as_ref().map(|id| id.as_ref()))
    .bind(series.version)
    .bind(format_timestamp(series.created_at)?)
    .bind(format_timestamp(series.updated_at)?)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to insert series", e))?;
    Ok(())
}

/// Load a series visible in `scope`; anything else is reported as not found
pub(crate) async fn load_series(
    conn: &mut SqliteConnection,
    scope: &Scope,
    id: &SeriesId,
) -> Result<Series> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM series WHERE id = ? AND owner_kind = ? AND user_id IS ?",
        SERIES_COLUMNS
    ))
    .bind(id.as_ref())
    .bind(scope.kind_column())
    .bind(scope.user_column())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RegistryError::lookup(format!("Series {}", id), e))?;

    series_from_row(&row)
}

/// All series of a scope, newest first
pub(crate) async fn list_series(conn: &mut SqliteConnection, scope: &Scope) -> Result<Vec<Series>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM series WHERE owner_kind = ? AND user_id IS ? \
         ORDER BY created_at DESC, rowid DESC",
        SERIES_COLUMNS
    ))
    .bind(scope.kind_column())
    .bind(scope.user_column())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to list series", e))?;

    rows.iter().map(series_from_row).collect()
}

/// A series in `scope` previously copied from `template`, if any
pub(crate) async fn find_copy_of(
    conn: &mut SqliteConnection,
    scope: &Scope,
    template: &SeriesId,
) -> Result<Option<SeriesId>> {
    let row = sqlx::query(
        "SELECT id FROM series WHERE copied_from = ? AND owner_kind = ? AND user_id IS ? LIMIT 1",
    )
    .bind(template.as_ref())
    .bind(scope.kind_column())
    .bind(scope.user_column())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to check template copies", e))?;

    Ok(row.map(|row| SeriesId(row.get("id"))))
}

/// Compare-and-swap the revision pointers of a series.
///
/// Succeeds only if nobody changed the row since `series` was loaded; on
/// success `series` reflects the stored state.
pub(crate) async fn swap_series_pointers(
    conn: &mut SqliteConnection,
    series: &mut Series,
    next: RevisionPointers,
) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    let result = sqlx::query(
        "UPDATE series SET draft_revision_id = ?, published_revision_id = ?, \
         version = version + 1, updated_at = ? WHERE id = ? AND version = ?",
    )
    .bind(next.draft.as_ref().map(|id| id.as_ref()))
    .bind(next.published.as_ref().map(|id| id.as_ref()))
    .bind(format_timestamp(now)?)
    .bind(series.id.as_ref())
    .bind(series.version)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to update series pointers", e))?;

    if result.rows_affected() == 0 {
        return Err(RegistryError::Conflict(format!(
            "series {} was modified concurrently",
            series.id
        )));
    }

    series.pointers = next;
    series.version += 1;
    series.updated_at = now;
    Ok(())
}

pub(crate) async fn set_series_lock(
    conn: &mut SqliteConnection,
    id: &SeriesId,
    locked: bool,
) -> Result<()> {
    sqlx::query("UPDATE series SET id_locked = ?, updated_at = ? WHERE id = ?")
        .bind(locked)
        .bind(format_timestamp(OffsetDateTime::now_utc())?)
        .bind(id.as_ref())
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to update series lock", e))?;
    Ok(())
}

pub(crate) async fn touch_series(conn: &mut SqliteConnection, id: &SeriesId) -> Result<()> {
    sqlx::query("UPDATE series SET updated_at = ? WHERE id = ?")
        .bind(format_timestamp(OffsetDateTime::now_utc())?)
        .bind(id.as_ref())
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to touch series", e))?;
    Ok(())
}

/// Persist a revision with its media row and text rows
pub(crate) async fn insert_series_revision(
    conn: &mut SqliteConnection,
    revision: &SeriesRevision,
) -> Result<()> {
    if let Some(image) = &revision.image {
        media::insert_image(conn, image).await?;
    }

    sqlx::query(
        "INSERT INTO series_revision (id, series_id, image_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(revision.id.as_ref())
    .bind(revision.series_id.as_ref())
    .bind(revision.image.as_ref().map(|image| image.id.as_ref()))
    .bind(format_timestamp(revision.created_at)?)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to insert series revision", e))?;

    for (lang, text) in &revision.i18n {
        upsert_series_text(conn, &revision.id, lang, text).await?;
    }
    Ok(())
}

pub(crate) async fn load_series_revision(
    conn: &mut SqliteConnection,
    id: &RevisionId,
) -> Result<SeriesRevision> {
    let row = sqlx::query(
        r#"
        SELECT r.id, r.series_id, r.created_at,
               i.id AS image_id, i.original_path AS image_original_path,
               i.webp_path AS image_webp_path, i.avif_path AS image_avif_path
        FROM series_revision r
        LEFT JOIN image i ON i.id = r.image_id
        WHERE r.id = ?
        "#,
    )
    .bind(id.as_ref())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RegistryError::lookup(format!("Series revision {}", id), e))?;

    let texts = sqlx::query(
        "SELECT lang, title, description_serie, year FROM series_i18n_revision WHERE revision_id = ?",
    )
    .bind(id.as_ref())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to load series text", e))?;

    let i18n: BTreeMap<String, SeriesText> = texts
        .iter()
        .map(|row| {
            (
                row.get("lang"),
                SeriesText {
                    title: row.get("title"),
                    description_serie: row.get("description_serie"),
                    year: row.get("year"),
                },
            )
        })
        .collect();

    Ok(SeriesRevision {
        id: RevisionId(row.get("id")),
        series_id: SeriesId(row.get("series_id")),
        image: media::image_from_row(&row),
        i18n,
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

pub(crate) async fn load_optional_series_revision(
    conn: &mut SqliteConnection,
    id: Option<&RevisionId>,
) -> Result<Option<SeriesRevision>> {
    match id {
        Some(id) => load_series_revision(conn, id).await.map(Some),
        None => Ok(None),
    }
}

/// Insert or overwrite the text of one language
pub(crate) async fn upsert_series_text(
    conn: &mut SqliteConnection,
    revision_id: &RevisionId,
    lang: &str,
    text: &SeriesText,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO series_i18n_revision (revision_id, lang, title, description_serie, year)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (revision_id, lang) DO UPDATE SET
            title = excluded.title,
            description_serie = excluded.description_serie,
            year = excluded.year
        "#,
    )
    .bind(revision_id.as_ref())
    .bind(lang)
    .bind(&text.title)
    .bind(&text.description_serie)
    .bind(&text.year)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to upsert series text", e))?;
    Ok(())
}
