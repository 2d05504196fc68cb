//! Row-level access to the relational store
//!
//! Every function here takes a `&mut SqliteConnection` so that callers can
//! compose several steps inside one transaction.

use crate::error::{RegistryError, Result};
use atelier::{ArtworkId, RevisionId, SeriesId};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tracing::debug;

pub(crate) mod artworks;
pub(crate) mod media;
pub(crate) mod series;
pub mod sqlite_storage;

pub use sqlite_storage::SqliteStorage;

/// Fixed-width RFC 3339 so text ordering matches time ordering
pub(crate) fn format_timestamp(ts: OffsetDateTime) -> Result<String> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
    );
    ts.to_offset(UtcOffset::UTC)
        .format(format)
        .map_err(|e| RegistryError::storage("Failed to format timestamp", e))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<OffsetDateTime> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
    );
    PrimitiveDateTime::parse(value, format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| RegistryError::storage("Failed to parse timestamp", e))
}

/// The two revision families and their child text tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RevisionTable {
    Series,
    Artwork,
}

impl RevisionTable {
    pub(crate) fn revisions(self) -> &'static str {
        match self {
            RevisionTable::Series => "series_revision",
            RevisionTable::Artwork => "artwork_revision",
        }
    }

    pub(crate) fn texts(self) -> &'static str {
        match self {
            RevisionTable::Series => "series_i18n_revision",
            RevisionTable::Artwork => "artwork_i18n_revision",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            RevisionTable::Series => "series_id",
            RevisionTable::Artwork => "artwork_id",
        }
    }
}

fn push_id_list<'a>(builder: &mut QueryBuilder<'a, Sqlite>, ids: &'a [RevisionId]) {
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.as_ref());
    }
    separated.push_unseparated(")");
}

/// Delete revisions together with their text rows and media rows
pub(crate) async fn purge_revisions(
    conn: &mut SqliteConnection,
    table: RevisionTable,
    ids: &[RevisionId],
) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut select = QueryBuilder::<Sqlite>::new(format!(
        "SELECT image_id FROM {} WHERE image_id IS NOT NULL AND id IN (",
        table.revisions()
    ));
    push_id_list(&mut select, ids);
    let image_ids: Vec<String> = select
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to collect revision media", e))?
        .iter()
        .map(|row| row.get::<String, _>("image_id"))
        .collect();

    let mut texts = QueryBuilder::<Sqlite>::new(format!(
        "DELETE FROM {} WHERE revision_id IN (",
        table.texts()
    ));
    push_id_list(&mut texts, ids);
    texts
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to delete localized text", e))?;

    let mut revisions =
        QueryBuilder::<Sqlite>::new(format!("DELETE FROM {} WHERE id IN (", table.revisions()));
    push_id_list(&mut revisions, ids);
    revisions
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to delete revisions", e))?;

    media::delete_images(conn, &image_ids).await?;

    debug!(
        table = table.revisions(),
        revisions = ids.len(),
        images = image_ids.len(),
        "Purged revisions"
    );
    Ok(())
}

/// Every revision an identity ever owned, live or not
async fn owned_revisions(
    conn: &mut SqliteConnection,
    table: RevisionTable,
    owner_id: &str,
) -> Result<Vec<RevisionId>> {
    let rows = sqlx::query(&format!(
        "SELECT id FROM {} WHERE {} = ?",
        table.revisions(),
        table.owner_column()
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to list owned revisions", e))?;

    Ok(rows
        .iter()
        .map(|row| RevisionId(row.get::<String, _>("id")))
        .collect())
}

/// Cascade-delete artworks and everything they own; returns rows removed
pub(crate) async fn purge_artworks(
    conn: &mut SqliteConnection,
    ids: &[ArtworkId],
) -> Result<u64> {
    let mut removed = 0;
    for id in ids {
        let revisions = owned_revisions(conn, RevisionTable::Artwork, id.as_ref()).await?;
        purge_revisions(conn, RevisionTable::Artwork, &revisions).await?;

        removed += sqlx::query("DELETE FROM artwork WHERE id = ?")
            .bind(id.as_ref())
            .execute(&mut *conn)
            .await
            .map_err(|e| RegistryError::storage("Failed to delete artwork", e))?
            .rows_affected();
    }
    Ok(removed)
}

/// Cascade-delete a series, its artworks and every revision either owned
pub(crate) async fn purge_series(conn: &mut SqliteConnection, id: &SeriesId) -> Result<u64> {
    let artwork_ids = artworks::artwork_ids_of_series(conn, id).await?;
    let artworks_removed = purge_artworks(conn, &artwork_ids).await?;

    let revisions = owned_revisions(conn, RevisionTable::Series, id.as_ref()).await?;
    purge_revisions(conn, RevisionTable::Series, &revisions).await?;

    sqlx::query("DELETE FROM series WHERE id = ?")
        .bind(id.as_ref())
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to delete series", e))?;

    Ok(artworks_removed)
}
