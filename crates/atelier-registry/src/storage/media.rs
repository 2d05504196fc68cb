//! Media reference rows

use super::RevisionTable;
use crate::error::{RegistryError, Result};
use atelier::{Image, ImageId, ImageInput, RevisionId};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, sqlite::SqliteRow};

pub(crate) async fn insert_image(conn: &mut SqliteConnection, image: &Image) -> Result<()> {
    sqlx::query(
        "INSERT INTO image (id, original_path, webp_path, avif_path) VALUES (?, ?, ?, ?)",
    )
    .bind(image.id.as_ref())
    .bind(&image.original_path)
    .bind(&image.webp_path)
    .bind(&image.avif_path)
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to insert image", e))?;
    Ok(())
}

/// Read the `image_*` columns of a revision joined with its image row
pub(crate) fn image_from_row(row: &SqliteRow) -> Option<Image> {
    let id: Option<String> = row.get("image_id");
    id.map(|id| Image {
        id: ImageId(id),
        original_path: row.get("image_original_path"),
        webp_path: row.get("image_webp_path"),
        avif_path: row.get("image_avif_path"),
    })
}

/// Apply a media descriptor to a draft revision.
///
/// An existing row is updated in place; otherwise a new row is inserted and
/// linked to the revision.
pub(crate) async fn upsert_revision_image(
    conn: &mut SqliteConnection,
    table: RevisionTable,
    revision_id: &RevisionId,
    current: Option<&Image>,
    input: &ImageInput,
) -> Result<Image> {
    if let Some(existing) = current {
        let updated = Image {
            id: existing.id.clone(),
            original_path: input.original_path.clone(),
            webp_path: input.webp_path.clone(),
            avif_path: input.avif_path.clone(),
        };
        sqlx::query("UPDATE image SET original_path = ?, webp_path = ?, avif_path = ? WHERE id = ?")
            .bind(&updated.original_path)
            .bind(&updated.webp_path)
            .bind(&updated.avif_path)
            .bind(updated.id.as_ref())
            .execute(&mut *conn)
            .await
            .map_err(|e| RegistryError::storage("Failed to update image", e))?;
        return Ok(updated);
    }

    let image = input.clone().into_image();
    insert_image(conn, &image).await?;
    sqlx::query(&format!(
        "UPDATE {} SET image_id = ? WHERE id = ?",
        table.revisions()
    ))
    .bind(image.id.as_ref())
    .bind(revision_id.as_ref())
    .execute(&mut *conn)
    .await
    .map_err(|e| RegistryError::storage("Failed to link image", e))?;

    Ok(image)
}

pub(crate) async fn delete_images(conn: &mut SqliteConnection, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM image WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");

    builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| RegistryError::storage("Failed to delete images", e))?;
    Ok(())
}
