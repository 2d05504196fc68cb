//! High-level registry interface for versioned works

use crate::bulk::{self, DiscardOutcome, ReorderOutcome};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::storage::{self, SqliteStorage, artworks, series};
use crate::tenancy::Scope;
use crate::{copy, draft, mutation, publish, read};
use async_trait::async_trait;
use atelier::{
    ArtworkId, ArtworkPatch, ArtworkView, NewArtwork, NewSeries, RevisionId, RevisionPointers,
    SeriesId, SeriesPatch, SeriesView, UserId, ViewKind, WorksView, project_artwork,
    project_series,
};
use sqlx::{Sqlite, Transaction};
use std::future::Future;
use tracing::{info, warn};

/// Versioning engine for series and artworks
#[async_trait]
pub trait WorksRegistry: Send + Sync {
    // === Series ===

    /// Create a series with its first revision
    async fn create_series(&self, scope: &Scope, request: &NewSeries) -> Result<SeriesId>;

    /// Edit the series draft, cloning the published revision if needed
    async fn update_series(
        &self,
        scope: &Scope,
        id: &SeriesId,
        patch: &SeriesPatch,
    ) -> Result<RevisionId>;

    /// Make sure an editable draft exists and return its id
    async fn ensure_series_draft(&self, scope: &Scope, id: &SeriesId) -> Result<RevisionId>;

    async fn set_series_lock(&self, scope: &Scope, id: &SeriesId, locked: bool) -> Result<()>;

    /// Publish the pending draft; without one, return the live revision id
    async fn publish_series(&self, scope: &Scope, id: &SeriesId) -> Result<RevisionId>;

    async fn unpublish_series(&self, scope: &Scope, id: &SeriesId) -> Result<RevisionPointers>;

    /// Delete a series, its artworks and every revision they own
    async fn delete_series(&self, scope: &Scope, id: &SeriesId) -> Result<()>;

    async fn series_view(&self, scope: &Scope, id: &SeriesId, kind: ViewKind)
    -> Result<SeriesView>;

    // === Artworks ===

    async fn create_artwork(
        &self,
        scope: &Scope,
        series_id: &SeriesId,
        request: &NewArtwork,
    ) -> Result<ArtworkId>;

    async fn update_artwork(
        &self,
        scope: &Scope,
        id: &ArtworkId,
        patch: &ArtworkPatch,
    ) -> Result<RevisionId>;

    async fn ensure_artwork_draft(&self, scope: &Scope, id: &ArtworkId) -> Result<RevisionId>;

    async fn set_artwork_lock(&self, scope: &Scope, id: &ArtworkId, locked: bool) -> Result<()>;

    /// Publish the pending draft; without one, return the live revision id
    async fn publish_artwork(&self, scope: &Scope, id: &ArtworkId) -> Result<RevisionId>;

    async fn unpublish_artwork(&self, scope: &Scope, id: &ArtworkId)
    -> Result<RevisionPointers>;

    async fn delete_artwork(&self, scope: &Scope, id: &ArtworkId) -> Result<()>;

    async fn artwork_view(
        &self,
        scope: &Scope,
        id: &ArtworkId,
        kind: ViewKind,
    ) -> Result<ArtworkView>;

    // === Batch ===

    /// Assign sort indices following `order`
    async fn reorder_artworks(
        &self,
        scope: &Scope,
        series_id: &SeriesId,
        order: &[ArtworkId],
    ) -> Result<ReorderOutcome>;

    /// Discard pending drafts; an empty `only` targets the whole series
    async fn discard_artwork_drafts(
        &self,
        scope: &Scope,
        series_id: &SeriesId,
        only: &[ArtworkId],
    ) -> Result<DiscardOutcome>;

    async fn delete_series_artworks(&self, scope: &Scope, series_id: &SeriesId) -> Result<u64>;

    // === Listing and templates ===

    async fn list_works(&self, scope: &Scope, kind: ViewKind) -> Result<WorksView>;

    async fn list_templates(&self) -> Result<Vec<SeriesView>>;

    /// Deep-copy a published template into a new draft series owned by `user`
    async fn copy_template(&self, template_id: &SeriesId, user: UserId) -> Result<SeriesId>;
}

/// Default implementation of the works registry
pub struct Registry {
    storage: SqliteStorage,
    config: RegistryConfig,
}

impl Registry {
    /// Create a new registry with the given storage backend
    pub fn new(storage: SqliteStorage, config: RegistryConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Run `work` under the transaction timeout.
    ///
    /// On expiry the future is dropped, which drops its transaction and rolls
    /// it back.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.transaction_timeout, work).await {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(operation, error = %e, "Registry operation failed");
                }
                result
            }
            Err(_) => {
                warn!(operation, timeout = ?self.config.transaction_timeout, "Transaction timed out");
                Err(RegistryError::Timeout {
                    operation,
                    timeout: self.config.transaction_timeout,
                })
            }
        }
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.storage.begin().await
    }
}

async fn commit(tx: Transaction<'static, Sqlite>) -> Result<()> {
    tx.commit()
        .await
        .map_err(|e| RegistryError::storage("Failed to commit transaction", e))
}

#[async_trait]
impl WorksRegistry for Registry {
    async fn create_series(&self, scope: &Scope, request: &NewSeries) -> Result<SeriesId> {
        self.bounded("create_series", async {
            let mut tx = self.begin().await?;
            let id = mutation::create_series(&mut tx, scope, request).await?;
            commit(tx).await?;
            info!(series_id = %id, "Series created");
            Ok(id)
        })
        .await
    }

    async fn update_series(
        &self,
        scope: &Scope,
        id: &SeriesId,
        patch: &SeriesPatch,
    ) -> Result<RevisionId> {
        self.bounded("update_series", async {
            let mut tx = self.begin().await?;
            let revision = mutation::update_series(&mut tx, scope, id, patch).await?;
            commit(tx).await?;
            Ok(revision)
        })
        .await
    }

    async fn ensure_series_draft(&self, scope: &Scope, id: &SeriesId) -> Result<RevisionId> {
        self.bounded("ensure_series_draft", async {
            let mut tx = self.begin().await?;
            let mut target = series::load_series(&mut tx, scope, id).await?;
            draft::ensure_series_unlocked(&target)?;
            let revision = draft::ensure_series_draft(&mut tx, &mut target).await?;
            commit(tx).await?;
            Ok(revision.id)
        })
        .await
    }

    async fn set_series_lock(&self, scope: &Scope, id: &SeriesId, locked: bool) -> Result<()> {
        self.bounded("set_series_lock", async {
            let mut tx = self.begin().await?;
            mutation::set_series_lock(&mut tx, scope, id, locked).await?;
            commit(tx).await?;
            info!(series_id = %id, locked, "Series lock changed");
            Ok(())
        })
        .await
    }

    async fn publish_series(&self, scope: &Scope, id: &SeriesId) -> Result<RevisionId> {
        self.bounded("publish_series", async {
            let mut tx = self.begin().await?;
            let revision = publish::publish_series(&mut tx, scope, id).await?;
            commit(tx).await?;
            Ok(revision)
        })
        .await
    }

    async fn unpublish_series(&self, scope: &Scope, id: &SeriesId) -> Result<RevisionPointers> {
        self.bounded("unpublish_series", async {
            let mut tx = self.begin().await?;
            let pointers = publish::unpublish_series(&mut tx, scope, id).await?;
            commit(tx).await?;
            Ok(pointers)
        })
        .await
    }

    async fn delete_series(&self, scope: &Scope, id: &SeriesId) -> Result<()> {
        self.bounded("delete_series", async {
            let mut tx = self.begin().await?;
            let target = series::load_series(&mut tx, scope, id).await?;
            let artworks_removed = storage::purge_series(&mut tx, &target.id).await?;
            commit(tx).await?;
            info!(series_id = %id, artworks_removed, "Series deleted");
            Ok(())
        })
        .await
    }

    async fn series_view(
        &self,
        scope: &Scope,
        id: &SeriesId,
        kind: ViewKind,
    ) -> Result<SeriesView> {
        self.bounded("series_view", async {
            let mut tx = self.begin().await?;
            let record = read::load_series_record(&mut tx, scope, id).await?;
            commit(tx).await?;
            Ok(project_series(&record, kind))
        })
        .await
    }

    async fn create_artwork(
        &self,
        scope: &Scope,
        series_id: &SeriesId,
        request: &NewArtwork,
    ) -> Result<ArtworkId> {
        self.bounded("create_artwork", async {
            let mut tx = self.begin().await?;
            let id = mutation::create_artwork(&mut tx, scope, series_id, request).await?;
            commit(tx).await?;
            info!(artwork_id = %id, series_id = %series_id, "Artwork created");
            Ok(id)
        })
        .await
    }

    async fn update_artwork(
        &self,
        scope: &Scope,
        id: &ArtworkId,
        patch: &ArtworkPatch,
    ) -> Result<RevisionId> {
        self.bounded("update_artwork", async {
            let mut tx = self.begin().await?;
            let revision = mutation::update_artwork(&mut tx, scope, id, patch).await?;
            commit(tx).await?;
            Ok(revision)
        })
        .await
    }

    async fn ensure_artwork_draft(&self, scope: &Scope, id: &ArtworkId) -> Result<RevisionId> {
        self.bounded("ensure_artwork_draft", async {
            let mut tx = self.begin().await?;
            let mut target = artworks::load_artwork(&mut tx, scope, id).await?;
            draft::ensure_artwork_unlocked(&target)?;
            let revision = draft::ensure_artwork_draft(&mut tx, &mut target).await?;
            commit(tx).await?;
            Ok(revision.id)
        })
        .await
    }

    async fn set_artwork_lock(&self, scope: &Scope, id: &ArtworkId, locked: bool) -> Result<()> {
        self.bounded("set_artwork_lock", async {
            let mut tx = self.begin().await?;
            mutation::set_artwork_lock(&mut tx, scope, id, locked).await?;
            commit(tx).await?;
            info!(artwork_id = %id, locked, "Artwork lock changed");
            Ok(())
        })
        .await
    }

    async fn publish_artwork(&self, scope: &Scope, id: &ArtworkId) -> Result<RevisionId> {
        self.bounded("publish_artwork", async {
            let mut tx = self.begin().await?;
            let revision = publish::publish_artwork(&mut tx, scope, id).await?;
            commit(tx).await?;
            Ok(revision)
        })
        .await
    }

    async fn unpublish_artwork(
        &self,
        scope: &Scope,
        id: &ArtworkId,
    ) -> Result<RevisionPointers> {
        self.bounded("unpublish_artwork", async {
            let mut tx = self.begin().await?;
            let pointers = publish::unpublish_artwork(&mut tx, scope, id).await?;
            commit(tx).await?;
            Ok(pointers)
        })
        .await
    }

    async fn delete_artwork(&self, scope: &Scope, id: &ArtworkId) -> Result<()> {
        self.bounded("delete_artwork", async {
            let mut tx = self.begin().await?;
            let target = artworks::load_artwork(&mut tx, scope, id).await?;
            storage::purge_artworks(&mut tx, std::slice::from_ref(&target.id)).await?;
            commit(tx).await?;
            info!(artwork_id = %id, "Artwork deleted");
            Ok(())
        })
        .await
    }

    async fn artwork_view(
        &self,
        scope: &Scope,
        id: &ArtworkId,
        kind: ViewKind,
    ) -> Result<ArtworkView> {
        self.bounded("artwork_view", async {
            let mut tx = self.begin().await?;
            let record = read::load_artwork_record(&mut tx, scope, id).await?;
            commit(tx).await?;
            Ok(project_artwork(&record, kind))
        })
        .await
    }

    async fn reorder_artworks(
        &self,
        scope: &Scope,
        series_id: &SeriesId,
        order: &[ArtworkId],
    ) -> Result<ReorderOutcome> {
        self.bounded("reorder_artworks", async {
            let mut tx = self.begin().await?;
            let outcome = bulk::reorder_artworks(&mut tx, scope, series_id, order).await?;
            commit(tx).await?;
            Ok(outcome)
        })
        .await
    }

    async fn discard_artwork_drafts(
        &self,
        scope: &Scope,
        series_id: &SeriesId,
        only: &[ArtworkId],
    ) -> Result<DiscardOutcome> {
        self.bounded("discard_artwork_drafts", async {
            let mut tx = self.begin().await?;
            let outcome = bulk::discard_artwork_drafts(&mut tx, scope, series_id, only).await?;
            commit(tx).await?;
            Ok(outcome)
        })
        .await
    }

    async fn delete_series_artworks(&self, scope: &Scope, series_id: &SeriesId) -> Result<u64> {
        self.bounded("delete_series_artworks", async {
            let mut tx = self.begin().await?;
            let removed = bulk::delete_series_artworks(&mut tx, scope, series_id).await?;
            commit(tx).await?;
            Ok(removed)
        })
        .await
    }

    async fn list_works(&self, scope: &Scope, kind: ViewKind) -> Result<WorksView> {
        self.bounded("list_works", async {
            let mut tx = self.begin().await?;
            let works = read::list_works(&mut tx, scope, kind).await?;
            commit(tx).await?;
            Ok(works)
        })
        .await
    }

    async fn list_templates(&self) -> Result<Vec<SeriesView>> {
        self.bounded("list_templates", async {
            let mut tx = self.begin().await?;
            let templates = read::list_templates(&mut tx).await?;
            commit(tx).await?;
            Ok(templates)
        })
        .await
    }

    async fn copy_template(&self, template_id: &SeriesId, user: UserId) -> Result<SeriesId> {
        self.bounded("copy_template", async {
            let mut tx = self.begin().await?;
            let id = copy::copy_template(&mut tx, &Scope::user(user), template_id).await?;
            commit(tx).await?;
            Ok(id)
        })
        .await
    }
}
