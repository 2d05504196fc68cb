//! Read projections of identities
//!
//! The draft view shows what an editor is working on: the pending draft if
//! there is one, otherwise the live content. The published view shows only
//! the published snapshot. Both carry a [`RevisionMeta`] block describing
//! the pointer state.

use crate::error::DomainError;
use crate::ids::{ArtworkId, RevisionId, SeriesId};
use crate::model::{
    Artwork, ArtworkRecord, ArtworkRevision, ArtworkText, Image, Series, SeriesRecord,
    SeriesRevision, SeriesText,
};
use crate::state::RevisionPointers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Which projection to render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Draft,
    Published,
}

impl FromStr for ViewKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ViewKind::Draft),
            "published" => Ok(ViewKind::Published),
            other => Err(DomainError::UnknownView(other.to_string())),
        }
    }
}

/// Summary of the pointer state, reported as `meta.view`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaView {
    Draft,
    Published,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionMeta {
    pub view: MetaView,
    pub published: bool,
    pub has_draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_revision_id: Option<RevisionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_revision_id: Option<RevisionId>,
}

impl RevisionMeta {
    pub fn from_pointers(pointers: &RevisionPointers) -> Self {
        let state = pointers.state();
        let view = if state.has_draft() {
            MetaView::Draft
        } else if state.is_published() {
            MetaView::Published
        } else {
            MetaView::Empty
        };

        Self {
            view,
            published: state.is_published(),
            has_draft: state.has_draft(),
            draft_revision_id: pointers.draft.clone(),
            published_revision_id: pointers.published.clone(),
        }
    }
}

/// Media paths as rendered to clients; missing formats become empty strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub original: String,
    pub webp: String,
    pub avif: String,
}

impl From<&Image> for ImageRef {
    fn from(image: &Image) -> Self {
        Self {
            original: image.original_path.clone(),
            webp: image.webp_path.clone().unwrap_or_default(),
            avif: image.avif_path.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkView {
    pub id: ArtworkId,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub id_locked: bool,
    pub sold: bool,
    pub sort_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub meta: RevisionMeta,
    pub i18n: BTreeMap<String, ArtworkText>,
    pub year: String,
    pub medium: String,
    #[serde(rename = "sizeCM")]
    pub size_cm: String,
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub id: SeriesId,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub id_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub meta: RevisionMeta,
    pub i18n: BTreeMap<String, SeriesText>,
    pub items: Vec<ArtworkView>,
}

/// Every series of a scope, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorksView {
    pub series: Vec<SeriesView>,
}

fn pick<'a, R>(
    pointers: &RevisionPointers,
    draft: Option<&'a R>,
    published: Option<&'a R>,
    kind: ViewKind,
) -> Option<&'a R> {
    match kind {
        ViewKind::Published => published,
        ViewKind::Draft => {
            let state = pointers.state();
            if state.has_draft() {
                draft
            } else if state.is_published() {
                published
            } else {
                None
            }
        }
    }
}

fn artwork_view(artwork: &Artwork, revision: Option<&ArtworkRevision>) -> ArtworkView {
    let mut view = ArtworkView {
        id: artwork.id.clone(),
        id_locked: artwork.locked,
        sold: artwork.sold,
        sort_index: artwork.sort_index,
        image: None,
        meta: RevisionMeta::from_pointers(&artwork.pointers),
        i18n: BTreeMap::new(),
        year: String::new(),
        medium: String::new(),
        size_cm: String::new(),
        price: String::new(),
    };

    if let Some(rev) = revision {
        view.image = rev.image.as_ref().map(ImageRef::from);
        view.i18n = rev.i18n.clone();
        view.year = rev.fields.year.clone();
        view.medium = rev.fields.medium.clone();
        view.size_cm = rev.fields.size_cm.clone();
        view.price = rev.fields.price.clone();
    }

    view
}

fn series_view(series: &Series, revision: Option<&SeriesRevision>, items: Vec<ArtworkView>) -> SeriesView {
    SeriesView {
        id: series.id.clone(),
        id_locked: series.locked,
        image: revision.and_then(|rev| rev.image.as_ref()).map(ImageRef::from),
        meta: RevisionMeta::from_pointers(&series.pointers),
        i18n: revision.map(|rev| rev.i18n.clone()).unwrap_or_default(),
        items,
    }
}

/// Render one artwork in the requested view
pub fn project_artwork(record: &ArtworkRecord, kind: ViewKind) -> ArtworkView {
    let revision = pick(
        &record.artwork.pointers,
        record.draft.as_ref(),
        record.published.as_ref(),
        kind,
    );
    artwork_view(&record.artwork, revision)
}

/// Render a series and its artworks in the requested view
pub fn project_series(record: &SeriesRecord, kind: ViewKind) -> SeriesView {
    let revision = pick(
        &record.series.pointers,
        record.draft.as_ref(),
        record.published.as_ref(),
        kind,
    );
    let items = record
        .items
        .iter()
        .map(|item| project_artwork(item, kind))
        .collect();
    series_view(&record.series, revision, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use crate::owner::Owner;

    fn artwork_record(medium_draft: Option<&str>, medium_published: Option<&str>) -> ArtworkRecord {
        let mut artwork = Artwork::new(SeriesId::from("s"), Owner::User(UserId(1)), 0);
        let make = |medium: &str| {
            let mut rev = ArtworkRevision::empty(artwork.id.clone());
            rev.fields.medium = medium.to_string();
            rev
        };
        let draft = medium_draft.map(make);
        let published = medium_published.map(make);
        artwork.pointers = RevisionPointers {
            draft: draft.as_ref().map(|r| r.id.clone()),
            published: published.as_ref().map(|r| r.id.clone()),
        };
        ArtworkRecord {
            artwork,
            draft,
            published,
        }
    }

    #[test]
    fn draft_view_prefers_draft_and_published_view_stays_strict() {
        let record = artwork_record(Some("bronze"), Some("oil"));
        assert_eq!(project_artwork(&record, ViewKind::Draft).medium, "bronze");
        assert_eq!(project_artwork(&record, ViewKind::Published).medium, "oil");

        let meta = project_artwork(&record, ViewKind::Draft).meta;
        assert_eq!(meta.view, MetaView::Draft);
        assert!(meta.published);
        assert!(meta.has_draft);
    }

    #[test]
    fn draft_view_falls_back_to_published() {
        let record = artwork_record(None, Some("oil"));
        let view = project_artwork(&record, ViewKind::Draft);
        assert_eq!(view.medium, "oil");
        assert_eq!(view.meta.view, MetaView::Published);
        assert!(!view.meta.has_draft);
    }

    #[test]
    fn published_view_of_unpublished_artwork_is_empty() {
        let record = artwork_record(Some("oil"), None);
        let view = project_artwork(&record, ViewKind::Published);
        assert_eq!(view.medium, "");
        assert!(view.i18n.is_empty());
        assert_eq!(view.meta.view, MetaView::Draft);
        assert!(!view.meta.published);
    }

    #[test]
    fn in_sync_pointers_report_no_draft() {
        let mut record = artwork_record(None, Some("oil"));
        record.artwork.pointers.draft = record.artwork.pointers.published.clone();
        let meta = project_artwork(&record, ViewKind::Draft).meta;
        assert!(!meta.has_draft);
        assert_eq!(meta.view, MetaView::Published);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let meta = RevisionMeta::from_pointers(&RevisionPointers::default());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["view"], "empty");
        assert_eq!(json["hasDraft"], false);
        assert!(json.get("draftRevisionId").is_none());
    }

    #[test]
    fn view_kind_parses_query_values() {
        assert_eq!("published".parse::<ViewKind>().unwrap(), ViewKind::Published);
        assert!("latest".parse::<ViewKind>().is_err());
    }
}
