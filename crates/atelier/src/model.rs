//! Identities, revisions, localized text and media references

use crate::ids::{ArtworkId, ImageId, RevisionId, SeriesId};
use crate::owner::Owner;
use crate::state::RevisionPointers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A stored image with its derived formats.
///
/// Every revision references its own row; rows are cloned, never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub original_path: String,
    pub webp_path: Option<String>,
    pub avif_path: Option<String>,
}

impl Image {
    pub fn new(
        original_path: impl Into<String>,
        webp_path: Option<String>,
        avif_path: Option<String>,
    ) -> Self {
        Self {
            id: ImageId::generate(),
            original_path: original_path.into(),
            webp_path,
            avif_path,
        }
    }

    /// Copy the paths into a row with a fresh id
    pub fn duplicate(&self) -> Self {
        Self {
            id: ImageId::generate(),
            ..self.clone()
        }
    }
}

/// Language-specific text of a series revision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesText {
    pub title: String,

    #[serde(
        default,
        rename(serialize = "descriptionSerie", deserialize = "description_serie"),
        alias = "descriptionSerie"
    )]
    pub description_serie: String,

    #[serde(default)]
    pub year: String,
}

/// Language-specific text of an artwork revision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkText {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub notes: String,
}

/// Free-text scalar content of an artwork revision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkFields {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default, alias = "sizeCM")]
    pub size_cm: String,
    #[serde(default)]
    pub price: String,
}

/// Content snapshot of a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRevision {
    pub id: RevisionId,
    pub series_id: SeriesId,
    pub image: Option<Image>,
    /// Localized text keyed by language code
    pub i18n: BTreeMap<String, SeriesText>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SeriesRevision {
    pub fn empty(series_id: SeriesId) -> Self {
        Self {
            id: RevisionId::generate(),
            series_id,
            image: None,
            i18n: BTreeMap::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Deep copy into a new revision of the same series.
    ///
    /// The copy gets a fresh id, its own media row and its own text rows, so
    /// editing it can never reach the source snapshot.
    pub fn duplicate(&self) -> Self {
        Self {
            id: RevisionId::generate(),
            series_id: self.series_id.clone(),
            image: self.image.as_ref().map(Image::duplicate),
            i18n: self.i18n.clone(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Deep copy attached to another series
    pub fn duplicate_for(&self, series_id: SeriesId) -> Self {
        Self {
            series_id,
            ..self.duplicate()
        }
    }
}

/// Content snapshot of an artwork
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtworkRevision {
    pub id: RevisionId,
    pub artwork_id: ArtworkId,
    pub fields: ArtworkFields,
    pub image: Option<Image>,
    pub i18n: BTreeMap<String, ArtworkText>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ArtworkRevision {
    pub fn empty(artwork_id: ArtworkId) -> Self {
        Self {
            id: RevisionId::generate(),
            artwork_id,
            fields: ArtworkFields::default(),
            image: None,
            i18n: BTreeMap::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Deep copy into a new revision of the same artwork
    pub fn duplicate(&self) -> Self {
        Self {
            id: RevisionId::generate(),
            artwork_id: self.artwork_id.clone(),
            fields: self.fields.clone(),
            image: self.image.as_ref().map(Image::duplicate),
            i18n: self.i18n.clone(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Deep copy attached to another artwork
    pub fn duplicate_for(&self, artwork_id: ArtworkId) -> Self {
        Self {
            artwork_id,
            ..self.duplicate()
        }
    }
}

/// Series identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub owner: Owner,
    pub locked: bool,
    pub pointers: RevisionPointers,
    /// Template this series was copied from
    pub copied_from: Option<SeriesId>,
    /// Bumped on every pointer change; guards against lost updates
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Series {
    pub fn new(owner: Owner, locked: bool) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: SeriesId::generate(),
            owner,
            locked,
            pointers: RevisionPointers::default(),
            copied_from: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Artwork identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub series_id: SeriesId,
    pub owner: Owner,
    pub sort_index: i64,
    pub locked: bool,
    pub sold: bool,
    pub pointers: RevisionPointers,
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Artwork {
    pub fn new(series_id: SeriesId, owner: Owner, sort_index: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: ArtworkId::generate(),
            series_id,
            owner,
            sort_index,
            locked: false,
            sold: false,
            pointers: RevisionPointers::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An artwork identity together with its live revisions
#[derive(Debug, Clone)]
pub struct ArtworkRecord {
    pub artwork: Artwork,
    pub draft: Option<ArtworkRevision>,
    pub published: Option<ArtworkRevision>,
}

/// A series identity with its live revisions and ordered artworks
#[derive(Debug, Clone)]
pub struct SeriesRecord {
    pub series: Series,
    pub draft: Option<SeriesRevision>,
    pub published: Option<SeriesRevision>,
    pub items: Vec<ArtworkRecord>,
}
