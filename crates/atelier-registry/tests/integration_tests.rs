//! Integration tests for atelier-registry

use atelier::*;
use atelier_registry::*;
use sqlx::Row;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

async fn setup() -> (TempDir, Registry) {
    let temp_dir = tempdir().unwrap();
    let db_path = format!("sqlite:{}/test.db", temp_dir.path().display());
    let storage = SqliteStorage::new(&db_path).await.unwrap();
    (temp_dir, Registry::new(storage, RegistryConfig::default()))
}

fn series_request(title: &str) -> NewSeries {
    let mut i18n = BTreeMap::new();
    i18n.insert(
        "en".to_string(),
        SeriesText {
            title: title.to_string(),
            ..SeriesText::default()
        },
    );
    NewSeries {
        id_locked: false,
        image: None,
        i18n,
    }
}

fn artwork_request(title: &str, medium: &str) -> NewArtwork {
    let mut i18n = BTreeMap::new();
    i18n.insert(
        "en".to_string(),
        ArtworkText {
            title: title.to_string(),
            ..ArtworkText::default()
        },
    );
    NewArtwork {
        fields: ArtworkFields {
            medium: medium.to_string(),
            ..ArtworkFields::default()
        },
        i18n,
        ..NewArtwork::default()
    }
}

fn medium_patch(medium: &str) -> ArtworkPatch {
    ArtworkPatch {
        medium: Some(medium.to_string()),
        ..ArtworkPatch::default()
    }
}

fn admin() -> Scope {
    Scope::system(AccessDecision::Allowed).unwrap()
}

async fn count(registry: &Registry, sql: &str) -> i64 {
    sqlx::query(sql)
        .fetch_one(registry.storage().pool())
        .await
        .unwrap()
        .get::<i64, _>(0)
}

#[tokio::test]
async fn test_user_creation_starts_as_draft_only() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));

    let series_id = registry
        .create_series(&scope, &series_request("Ocean"))
        .await
        .unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();

    let view = registry
        .series_view(&scope, &series_id, ViewKind::Draft)
        .await
        .unwrap();
    assert_eq!(view.meta.view, MetaView::Draft);
    assert!(!view.meta.published);
    assert!(view.meta.has_draft);
    assert!(view.meta.published_revision_id.is_none());
    assert_eq!(view.i18n["en"].title, "Ocean");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].id, artwork_id);
    assert_eq!(view.items[0].medium, "oil");

    let published = registry
        .series_view(&scope, &series_id, ViewKind::Published)
        .await
        .unwrap();
    assert!(published.i18n.is_empty());
    assert_eq!(published.items[0].medium, "");
}

#[tokio::test]
async fn test_system_creation_starts_published() {
    let (_dir, registry) = setup().await;
    let series_id = registry
        .create_series(&admin(), &series_request("Template"))
        .await
        .unwrap();

    let view = registry
        .series_view(&admin(), &series_id, ViewKind::Draft)
        .await
        .unwrap();
    assert_eq!(view.meta.view, MetaView::Published);
    assert!(view.meta.published);
    assert!(!view.meta.has_draft);
    assert!(view.meta.draft_revision_id.is_none());
}

#[tokio::test]
async fn test_creation_validates_payload_before_storage() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));

    let result = registry.create_series(&scope, &series_request("  ")).await;
    assert!(matches!(result, Err(RegistryError::Validation(DomainError::MissingTitle { .. }))));

    let mut request = series_request("Ocean");
    request.image = Some(ImageInput::new(""));
    let result = registry.create_series(&scope, &request).await;
    assert!(matches!(result, Err(RegistryError::Validation(DomainError::MissingOriginalPath))));

    assert_eq!(count(&registry, "SELECT COUNT(*) FROM series").await, 0);
}

#[tokio::test]
async fn test_publish_then_read_published_view() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();

    registry.update_artwork(&scope, &artwork_id, &medium_patch("acrylic")).await.unwrap();
    let draft_id = registry.ensure_artwork_draft(&scope, &artwork_id).await.unwrap();

    let published_id = registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    assert_eq!(published_id, draft_id);

    let view = registry
        .artwork_view(&scope, &artwork_id, ViewKind::Published)
        .await
        .unwrap();
    assert_eq!(view.medium, "acrylic");
    assert_eq!(view.i18n["en"].title, "Wave");
    assert_eq!(view.meta.view, MetaView::Published);
    assert_eq!(view.meta.published_revision_id, Some(draft_id));
    assert!(view.meta.draft_revision_id.is_none());
}

#[tokio::test]
async fn test_publish_then_unpublish_restores_draft() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();

    let before = registry.artwork_view(&scope, &artwork_id, ViewKind::Draft).await.unwrap();
    let published_id = registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    let pointers = registry.unpublish_artwork(&scope, &artwork_id).await.unwrap();

    assert_eq!(pointers.draft, Some(published_id));
    assert_eq!(pointers.published, None);

    let after = registry.artwork_view(&scope, &artwork_id, ViewKind::Draft).await.unwrap();
    assert_eq!(after.medium, before.medium);
    assert_eq!(after.i18n, before.i18n);
    assert_eq!(after.meta.view, MetaView::Draft);
}

#[tokio::test]
async fn test_copy_on_write_keeps_published_content() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();
    let p1 = registry.publish_artwork(&scope, &artwork_id).await.unwrap();

    let d1 = registry
        .update_artwork(&scope, &artwork_id, &medium_patch("bronze"))
        .await
        .unwrap();
    assert_ne!(d1, p1);

    let draft = registry.artwork_view(&scope, &artwork_id, ViewKind::Draft).await.unwrap();
    assert_eq!(draft.medium, "bronze");
    assert_eq!(draft.i18n["en"].title, "Wave");
    assert_eq!(draft.meta.published_revision_id, Some(p1.clone()));
    assert_eq!(draft.meta.draft_revision_id, Some(d1.clone()));
    assert!(draft.meta.has_draft);

    let published = registry
        .artwork_view(&scope, &artwork_id, ViewKind::Published)
        .await
        .unwrap();
    assert_eq!(published.medium, "oil");

    // a second edit reuses the same draft
    let again = registry
        .update_artwork(&scope, &artwork_id, &medium_patch("marble"))
        .await
        .unwrap();
    assert_eq!(again, d1);
}

#[tokio::test]
async fn test_copy_on_write_clones_media_row() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let mut request = series_request("Ocean");
    request.image = Some(ImageInput::new("/img/ocean.jpg"));
    let series_id = registry.create_series(&scope, &request).await.unwrap();
    registry.publish_series(&scope, &series_id).await.unwrap();

    let patch = SeriesPatch {
        image: Some(ImageInput {
            original_path: "/img/storm.jpg".to_string(),
            webp_path: Some("/img/storm.webp".to_string()),
            avif_path: None,
        }),
        i18n: None,
    };
    registry.update_series(&scope, &series_id, &patch).await.unwrap();

    let published = registry
        .series_view(&scope, &series_id, ViewKind::Published)
        .await
        .unwrap();
    assert_eq!(published.image.unwrap().original, "/img/ocean.jpg");

    let draft = registry.series_view(&scope, &series_id, ViewKind::Draft).await.unwrap();
    let image = draft.image.unwrap();
    assert_eq!(image.original, "/img/storm.jpg");
    assert_eq!(image.webp, "/img/storm.webp");
    assert_eq!(image.avif, "");

    assert_eq!(count(&registry, "SELECT COUNT(*) FROM image").await, 2);
}

#[tokio::test]
async fn test_i18n_upsert_by_language() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();

    let mut i18n = BTreeMap::new();
    i18n.insert(
        "en".to_string(),
        SeriesText {
            title: "Sea".to_string(),
            description_serie: "Blue".to_string(),
            year: "2020".to_string(),
        },
    );
    i18n.insert(
        "fr".to_string(),
        SeriesText {
            title: "Mer".to_string(),
            ..SeriesText::default()
        },
    );
    let patch = SeriesPatch {
        image: None,
        i18n: Some(i18n),
    };
    registry.update_series(&scope, &series_id, &patch).await.unwrap();

    let view = registry.series_view(&scope, &series_id, ViewKind::Draft).await.unwrap();
    assert_eq!(view.i18n.len(), 2);
    assert_eq!(view.i18n["en"].title, "Sea");
    assert_eq!(view.i18n["en"].description_serie, "Blue");
    assert_eq!(view.i18n["fr"].title, "Mer");
}

#[tokio::test]
async fn test_locked_identity_rejects_mutation() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();

    registry.set_artwork_lock(&scope, &artwork_id, true).await.unwrap();
    let result = registry.update_artwork(&scope, &artwork_id, &medium_patch("bronze")).await;
    assert!(matches!(result, Err(RegistryError::Locked(_))));
    assert!(matches!(
        registry.publish_artwork(&scope, &artwork_id).await,
        Err(RegistryError::Locked(_))
    ));

    registry.set_artwork_lock(&scope, &artwork_id, false).await.unwrap();
    registry.update_artwork(&scope, &artwork_id, &medium_patch("bronze")).await.unwrap();

    registry.set_series_lock(&scope, &series_id, true).await.unwrap();
    assert!(matches!(
        registry.update_series(&scope, &series_id, &SeriesPatch::default()).await,
        Err(RegistryError::Locked(_))
    ));
    assert!(matches!(
        registry.unpublish_series(&scope, &series_id).await,
        Err(RegistryError::Locked(_))
    ));
    assert!(matches!(
        registry.reorder_artworks(&scope, &series_id, &[artwork_id.clone()]).await,
        Err(RegistryError::Locked(_))
    ));
    assert!(matches!(
        registry.discard_artwork_drafts(&scope, &series_id, &[]).await,
        Err(RegistryError::Locked(_))
    ));
}

#[tokio::test]
async fn test_tenancy_hides_foreign_identities() {
    let (_dir, registry) = setup().await;
    let alice = Scope::user(UserId(1));
    let bob = Scope::user(UserId(2));
    let series_id = registry.create_series(&alice, &series_request("Ocean")).await.unwrap();

    assert!(matches!(
        registry.series_view(&bob, &series_id, ViewKind::Draft).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.publish_series(&bob, &series_id).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.series_view(&admin(), &series_id, ViewKind::Draft).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        Scope::system(AccessDecision::Denied),
        Err(RegistryError::AccessDenied(_))
    ));
    assert!(registry.list_works(&bob, ViewKind::Draft).await.unwrap().series.is_empty());
}

#[tokio::test]
async fn test_repeated_publish_keeps_revision_id() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();

    let first = registry.publish_series(&scope, &series_id).await.unwrap();
    let second = registry.publish_series(&scope, &series_id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM series_revision").await, 1);
}

#[tokio::test]
async fn test_publish_supersedes_old_snapshot() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();

    let p1 = registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    registry.update_artwork(&scope, &artwork_id, &medium_patch("bronze")).await.unwrap();
    let p2 = registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    assert_ne!(p1, p2);

    let view = registry
        .artwork_view(&scope, &artwork_id, ViewKind::Published)
        .await
        .unwrap();
    assert_eq!(view.medium, "bronze");
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_revision").await, 1);
}

#[tokio::test]
async fn test_unpublish_with_pending_draft_keeps_draft() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();
    registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    let draft = registry
        .update_artwork(&scope, &artwork_id, &medium_patch("bronze"))
        .await
        .unwrap();

    let pointers = registry.unpublish_artwork(&scope, &artwork_id).await.unwrap();
    assert_eq!(pointers.draft, Some(draft));
    assert_eq!(pointers.published, None);

    let view = registry.artwork_view(&scope, &artwork_id, ViewKind::Draft).await.unwrap();
    assert_eq!(view.medium, "bronze");
}

#[tokio::test]
async fn test_copy_template_example() {
    let (_dir, registry) = setup().await;
    let template_id = registry
        .create_series(&admin(), &series_request("Ocean"))
        .await
        .unwrap();
    let template_artwork = registry
        .create_artwork(&admin(), &template_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();

    let user = Scope::user(UserId(42));
    let copy_id = registry.copy_template(&template_id, UserId(42)).await.unwrap();
    assert_ne!(copy_id, template_id);

    let view = registry.series_view(&user, &copy_id, ViewKind::Draft).await.unwrap();
    assert!(view.meta.published_revision_id.is_none());
    assert!(view.meta.draft_revision_id.is_some());
    assert_eq!(view.i18n["en"].title, "Ocean");
    assert_eq!(view.items.len(), 1);

    let item = &view.items[0];
    assert_ne!(item.id, template_artwork);
    assert!(item.meta.published_revision_id.is_none());
    assert_eq!(item.medium, "oil");
    assert!(!item.sold);
}

#[tokio::test]
async fn test_copy_template_is_disjoint() {
    let (_dir, registry) = setup().await;
    let mut request = series_request("Ocean");
    request.image = Some(ImageInput::new("/img/ocean.jpg"));
    let template_id = registry.create_series(&admin(), &request).await.unwrap();
    let mut art = artwork_request("Wave", "oil");
    art.image = Some(ImageInput::new("/img/wave.jpg"));
    art.sold = true;
    registry.create_artwork(&admin(), &template_id, &art).await.unwrap();

    let template_before = registry
        .series_view(&admin(), &template_id, ViewKind::Published)
        .await
        .unwrap();
    let copy_id = registry.copy_template(&template_id, UserId(42)).await.unwrap();
    let user = Scope::user(UserId(42));
    let copy = registry.series_view(&user, &copy_id, ViewKind::Draft).await.unwrap();

    let template_ids: HashSet<String> = [
        template_before.meta.published_revision_id.clone().map(|r| r.0),
        template_before.items[0].meta.published_revision_id.clone().map(|r| r.0),
        Some(template_before.items[0].id.0.clone()),
    ]
    .into_iter()
    .flatten()
    .collect();
    for id in [
        copy.meta.draft_revision_id.clone().map(|r| r.0),
        copy.items[0].meta.draft_revision_id.clone().map(|r| r.0),
        Some(copy.items[0].id.0.clone()),
    ]
    .into_iter()
    .flatten()
    {
        assert!(!template_ids.contains(&id));
    }
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM image").await, 4);

    // editing and deleting the copy leaves the template untouched
    registry
        .update_artwork(&user, &copy.items[0].id, &medium_patch("bronze"))
        .await
        .unwrap();
    registry.delete_series(&user, &copy_id).await.unwrap();

    let template_after = registry
        .series_view(&admin(), &template_id, ViewKind::Published)
        .await
        .unwrap();
    assert_eq!(template_after.items[0].medium, "oil");
    assert_eq!(template_after.image, template_before.image);
    assert_eq!(template_after.items[0].image, template_before.items[0].image);
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM image").await, 2);
}

#[tokio::test]
async fn test_copy_template_requires_published_content() {
    let (_dir, registry) = setup().await;
    let template_id = registry
        .create_series(&admin(), &series_request("Ocean"))
        .await
        .unwrap();
    registry.unpublish_series(&admin(), &template_id).await.unwrap();

    assert!(matches!(
        registry.copy_template(&template_id, UserId(42)).await,
        Err(RegistryError::NotFound(_))
    ));

    // user series are never templates
    let user = Scope::user(UserId(7));
    let own = registry.create_series(&user, &series_request("Mine")).await.unwrap();
    registry.publish_series(&user, &own).await.unwrap();
    assert!(matches!(
        registry.copy_template(&own, UserId(42)).await,
        Err(RegistryError::NotFound(_))
    ));
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM series WHERE user_id = 42").await, 0);
}

#[tokio::test]
async fn test_copy_template_twice_conflicts() {
    let (_dir, registry) = setup().await;
    let template_id = registry
        .create_series(&admin(), &series_request("Ocean"))
        .await
        .unwrap();

    let copy_id = registry.copy_template(&template_id, UserId(42)).await.unwrap();
    assert!(matches!(
        registry.copy_template(&template_id, UserId(42)).await,
        Err(RegistryError::Conflict(_))
    ));

    // another tenant may still copy it
    registry.copy_template(&template_id, UserId(43)).await.unwrap();

    // after deleting the copy, copying again succeeds
    registry.delete_series(&Scope::user(UserId(42)), &copy_id).await.unwrap();
    registry.copy_template(&template_id, UserId(42)).await.unwrap();
}

#[tokio::test]
async fn test_bulk_discard_never_touches_unpublished() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();

    // diverged
    let diverged = registry
        .create_artwork(&scope, &series_id, &artwork_request("A", "oil"))
        .await
        .unwrap();
    registry.publish_artwork(&scope, &diverged).await.unwrap();
    registry.update_artwork(&scope, &diverged, &medium_patch("bronze")).await.unwrap();

    // draft only
    let draft_only = registry
        .create_artwork(&scope, &series_id, &artwork_request("B", "ink"))
        .await
        .unwrap();

    // published only
    let published_only = registry
        .create_artwork(&scope, &series_id, &artwork_request("C", "clay"))
        .await
        .unwrap();
    registry.publish_artwork(&scope, &published_only).await.unwrap();

    let outcome = registry
        .discard_artwork_drafts(&scope, &series_id, &[])
        .await
        .unwrap();
    assert_eq!(outcome, DiscardOutcome { updated: 1, skipped: 2 });

    let a = registry.artwork_view(&scope, &diverged, ViewKind::Draft).await.unwrap();
    assert_eq!(a.medium, "oil");
    assert!(!a.meta.has_draft);

    let b = registry.artwork_view(&scope, &draft_only, ViewKind::Draft).await.unwrap();
    assert_eq!(b.medium, "ink");
    assert!(b.meta.draft_revision_id.is_some());

    // the discarded draft revision is gone
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_revision").await, 3);
}

#[tokio::test]
async fn test_bulk_discard_respects_selection() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();

    let mut ids = Vec::new();
    for title in ["A", "B"] {
        let id = registry
            .create_artwork(&scope, &series_id, &artwork_request(title, "oil"))
            .await
            .unwrap();
        registry.publish_artwork(&scope, &id).await.unwrap();
        registry.update_artwork(&scope, &id, &medium_patch("bronze")).await.unwrap();
        ids.push(id);
    }

    let outcome = registry
        .discard_artwork_drafts(&scope, &series_id, &ids[..1])
        .await
        .unwrap();
    assert_eq!(outcome, DiscardOutcome { updated: 1, skipped: 0 });

    let untouched = registry.artwork_view(&scope, &ids[1], ViewKind::Draft).await.unwrap();
    assert_eq!(untouched.medium, "bronze");
}

#[tokio::test]
async fn test_reorder_full_permutation() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();

    let mut ids = Vec::new();
    for title in ["A", "B", "C"] {
        ids.push(
            registry
                .create_artwork(&scope, &series_id, &artwork_request(title, "oil"))
                .await
                .unwrap(),
        );
    }
    let order = vec![ids[2].clone(), ids[0].clone(), ids[1].clone()];

    let outcome = registry.reorder_artworks(&scope, &series_id, &order).await.unwrap();
    assert_eq!(outcome, ReorderOutcome { updated: 3, ignored: 0 });

    let view = registry.series_view(&scope, &series_id, ViewKind::Draft).await.unwrap();
    let listed: Vec<ArtworkId> = view.items.iter().map(|item| item.id.clone()).collect();
    assert_eq!(listed, order);
    let indices: Vec<i64> = view.items.iter().map(|item| item.sort_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_reorder_ignores_foreign_ids() {
    let (_dir, registry) = setup().await;
    let alice = Scope::user(UserId(1));
    let bob = Scope::user(UserId(2));
    let series_id = registry.create_series(&alice, &series_request("Ocean")).await.unwrap();
    let own = registry
        .create_artwork(&alice, &series_id, &artwork_request("A", "oil"))
        .await
        .unwrap();

    let other_series = registry.create_series(&bob, &series_request("Other")).await.unwrap();
    let foreign = registry
        .create_artwork(&bob, &other_series, &artwork_request("B", "oil"))
        .await
        .unwrap();

    let outcome = registry
        .reorder_artworks(&alice, &series_id, &[foreign.clone(), own.clone()])
        .await
        .unwrap();
    assert_eq!(outcome, ReorderOutcome { updated: 1, ignored: 1 });

    let view = registry.artwork_view(&alice, &own, ViewKind::Draft).await.unwrap();
    assert_eq!(view.sort_index, 1);
    let untouched = registry.artwork_view(&bob, &foreign, ViewKind::Draft).await.unwrap();
    assert_eq!(untouched.sort_index, 0);

    assert!(matches!(
        registry.reorder_artworks(&alice, &series_id, &[own.clone(), own.clone()]).await,
        Err(RegistryError::Validation(DomainError::DuplicateInOrder(_)))
    ));
}

#[tokio::test]
async fn test_delete_cascades_every_owned_row() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let mut request = series_request("Ocean");
    request.image = Some(ImageInput::new("/img/ocean.jpg"));
    let series_id = registry.create_series(&scope, &request).await.unwrap();

    let mut art = artwork_request("Wave", "oil");
    art.image = Some(ImageInput::new("/img/wave.jpg"));
    let artwork_id = registry.create_artwork(&scope, &series_id, &art).await.unwrap();
    registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    registry.update_artwork(&scope, &artwork_id, &medium_patch("bronze")).await.unwrap();
    registry.publish_series(&scope, &series_id).await.unwrap();

    registry.delete_artwork(&scope, &artwork_id).await.unwrap();
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_revision").await, 0);
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_i18n_revision").await, 0);
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM image").await, 1);

    registry.delete_series(&scope, &series_id).await.unwrap();
    for table in ["series", "series_revision", "series_i18n_revision", "artwork", "image"] {
        assert_eq!(
            count(&registry, &format!("SELECT COUNT(*) FROM {}", table)).await,
            0,
            "{} not empty",
            table
        );
    }

    assert!(matches!(
        registry.delete_series(&scope, &series_id).await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_series_artworks_counts() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    for title in ["A", "B"] {
        registry
            .create_artwork(&scope, &series_id, &artwork_request(title, "oil"))
            .await
            .unwrap();
    }

    assert_eq!(registry.delete_series_artworks(&scope, &series_id).await.unwrap(), 2);
    let view = registry.series_view(&scope, &series_id, ViewKind::Draft).await.unwrap();
    assert!(view.items.is_empty());
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_revision").await, 0);
}

#[tokio::test]
async fn test_list_works_and_templates() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let first = registry.create_series(&scope, &series_request("First")).await.unwrap();
    let second = registry.create_series(&scope, &series_request("Second")).await.unwrap();

    let works = registry.list_works(&scope, ViewKind::Draft).await.unwrap();
    let ids: Vec<SeriesId> = works.series.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec![second, first]);

    let template_id = registry
        .create_series(&admin(), &series_request("Template"))
        .await
        .unwrap();
    registry
        .create_artwork(&admin(), &template_id, &artwork_request("Live", "oil"))
        .await
        .unwrap();
    let hidden = registry
        .create_artwork(&admin(), &template_id, &artwork_request("Hidden", "oil"))
        .await
        .unwrap();
    registry.unpublish_artwork(&admin(), &hidden).await.unwrap();

    let unpublished = registry
        .create_series(&admin(), &series_request("Unpublished"))
        .await
        .unwrap();
    registry.unpublish_series(&admin(), &unpublished).await.unwrap();

    let templates = registry.list_templates().await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, template_id);
    assert_eq!(templates[0].items.len(), 1);
    assert_eq!(templates[0].items[0].i18n["en"].title, "Live");
}

#[tokio::test]
async fn test_artwork_identity_fields_show_in_both_views() {
    let (_dir, registry) = setup().await;
    let scope = Scope::user(UserId(1));
    let series_id = registry.create_series(&scope, &series_request("Ocean")).await.unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();
    registry.publish_artwork(&scope, &artwork_id).await.unwrap();

    let patch = ArtworkPatch {
        sold: Some(true),
        sort_index: Some(5),
        ..ArtworkPatch::default()
    };
    registry.update_artwork(&scope, &artwork_id, &patch).await.unwrap();

    let published = registry
        .artwork_view(&scope, &artwork_id, ViewKind::Published)
        .await
        .unwrap();
    assert!(published.sold);
    assert_eq!(published.sort_index, 5);
    assert_eq!(published.medium, "oil");
}

#[tokio::test]
async fn test_zero_timeout_rolls_back() {
    let temp_dir = tempdir().unwrap();
    let db_path = format!("sqlite:{}/test.db", temp_dir.path().display());
    let storage = SqliteStorage::new(&db_path).await.unwrap();
    let registry = Registry::new(storage, RegistryConfig::with_timeout(Duration::ZERO));

    let result = registry
        .create_series(&Scope::user(UserId(1)), &series_request("Ocean"))
        .await;
    assert!(matches!(result, Err(RegistryError::Timeout { .. })));
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM series").await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_edits_conflict_and_leave_no_orphans() {
    let (_dir, registry) = setup().await;
    let registry = Arc::new(registry);
    let scope = Scope::user(UserId(7));
    let series_id = registry
        .create_series(&scope, &series_request("Ocean"))
        .await
        .unwrap();
    let artwork_id = registry
        .create_artwork(&scope, &series_id, &artwork_request("Wave", "oil"))
        .await
        .unwrap();
    registry.publish_artwork(&scope, &artwork_id).await.unwrap();

    let mut successes = 0;
    let mut conflicts = 0;
    for round in 0..10 {
        // every round races the copy-on-write clone of a published-only artwork
        let handles: Vec<_> = (0..4)
            .map(|writer| {
                let registry = Arc::clone(&registry);
                let artwork_id = artwork_id.clone();
                tokio::spawn(async move {
                    let patch = medium_patch(&format!("ink {}-{}", round, writer));
                    registry.update_artwork(&scope, &artwork_id, &patch).await
                })
            })
            .collect();

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(RegistryError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        registry.publish_artwork(&scope, &artwork_id).await.unwrap();
    }

    assert!(successes >= 10);
    assert!(conflicts > 0);
    // only the live published revision survives; losing clones never persisted
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_revision").await, 1);
}

#[tokio::test]
async fn test_copy_template_failure_rolls_back_whole_graph() {
    let (_dir, registry) = setup().await;
    let mut request = series_request("Ocean");
    request.image = Some(ImageInput::new("/img/ocean.jpg"));
    let template_id = registry.create_series(&admin(), &request).await.unwrap();

    let mut first = artwork_request("Wave", "oil");
    first.image = Some(ImageInput::new("/img/wave.jpg"));
    registry.create_artwork(&admin(), &template_id, &first).await.unwrap();
    let mut second = artwork_request("Foam", "ink");
    second.image = Some(ImageInput::new("/img/foam.jpg"));
    let broken = registry
        .create_artwork(&admin(), &template_id, &second)
        .await
        .unwrap();

    // the second artwork now points at a revision that does not exist
    sqlx::query("UPDATE artwork SET published_revision_id = ? WHERE id = ?")
        .bind("missing-revision")
        .bind(broken.as_ref())
        .execute(registry.storage().pool())
        .await
        .unwrap();

    let result = registry.copy_template(&template_id, UserId(42)).await;
    assert!(result.is_err());

    assert_eq!(
        count(&registry, "SELECT COUNT(*) FROM series WHERE owner_kind = 'user'").await,
        0
    );
    assert_eq!(
        count(&registry, "SELECT COUNT(*) FROM artwork WHERE owner_kind = 'user'").await,
        0
    );
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM series_revision").await, 1);
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM artwork_revision").await, 2);
    assert_eq!(
        count(&registry, "SELECT COUNT(*) FROM series_i18n_revision").await,
        1
    );
    assert_eq!(count(&registry, "SELECT COUNT(*) FROM image").await, 3);

    let works = registry
        .list_works(&Scope::user(UserId(42)), ViewKind::Draft)
        .await
        .unwrap();
    assert!(works.series.is_empty());
}
