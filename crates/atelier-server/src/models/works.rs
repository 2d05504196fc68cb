//! Request and response bodies for series and artwork endpoints

use atelier::{ArtworkId, RevisionId, RevisionPointers, ViewKind};
use serde::{Deserialize, Serialize};

/// `?view=` selector for read endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub view: Option<String>,
}

impl ViewQuery {
    /// Parse the requested view, defaulting to the draft view
    pub fn kind(&self) -> atelier::Result<ViewKind> {
        match self.view.as_deref() {
            None | Some("") => Ok(ViewKind::default()),
            Some(view) => view.parse(),
        }
    }
}

/// Id of a newly created identity
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Revision produced or selected by a write
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionResponse {
    pub revision_id: RevisionId,
}

/// Pointers left behind by an unpublish
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpublishResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_revision_id: Option<RevisionId>,
    pub published: bool,
}

impl From<RevisionPointers> for UnpublishResponse {
    fn from(pointers: RevisionPointers) -> Self {
        Self {
            published: pointers.published.is_some(),
            draft_revision_id: pointers.draft,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    #[serde(alias = "artwork_ids")]
    pub artwork_ids: Vec<ArtworkId>,
}

/// Optional selection for a draft discard; empty means every artwork
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardRequest {
    #[serde(default, alias = "artwork_ids")]
    pub artwork_ids: Vec<ArtworkId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
