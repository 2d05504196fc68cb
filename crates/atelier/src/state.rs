//! Draft/published pointer state machine
//!
//! An identity holds two optional revision pointers. The lifecycle state is
//! never stored; it is derived from the pointers once per operation through
//! [`RevisionPointers::state`], and every transition is a pure function that
//! returns the next pointer pair.

use crate::ids::RevisionId;
use serde::{Deserialize, Serialize};

/// The two live revision pointers of an identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionPointers {
    pub draft: Option<RevisionId>,
    pub published: Option<RevisionId>,
}

/// Lifecycle state derived from the pointers.
///
/// Both pointers set to the same revision ("in sync") is reported as
/// [`RevisionState::PublishedOnly`]: the shared revision is published and
/// therefore immutable, so there is no editable draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionState {
    Empty,
    PublishedOnly { published: RevisionId },
    DraftOnly { draft: RevisionId },
    Diverged { draft: RevisionId, published: RevisionId },
}

impl RevisionState {
    /// The revision that may be edited in place, if any
    pub fn editable_draft(&self) -> Option<&RevisionId> {
        match self {
            RevisionState::DraftOnly { draft } | RevisionState::Diverged { draft, .. } => {
                Some(draft)
            }
            RevisionState::Empty | RevisionState::PublishedOnly { .. } => None,
        }
    }

    pub fn published(&self) -> Option<&RevisionId> {
        match self {
            RevisionState::PublishedOnly { published }
            | RevisionState::Diverged { published, .. } => Some(published),
            RevisionState::Empty | RevisionState::DraftOnly { .. } => None,
        }
    }

    pub fn has_draft(&self) -> bool {
        self.editable_draft().is_some()
    }

    pub fn is_published(&self) -> bool {
        self.published().is_some()
    }

    /// Revision shown by the draft view: the pending draft, else the live one
    pub fn draft_view_source(&self) -> Option<&RevisionId> {
        self.editable_draft().or_else(|| self.published())
    }
}

impl RevisionPointers {
    /// Pointers of a freshly created identity holding only a draft
    pub fn draft_only(draft: RevisionId) -> Self {
        Self {
            draft: Some(draft),
            published: None,
        }
    }

    /// Pointers of a freshly created identity holding only published content
    pub fn published_only(published: RevisionId) -> Self {
        Self {
            draft: None,
            published: Some(published),
        }
    }

    pub fn state(&self) -> RevisionState {
        match (&self.draft, &self.published) {
            (None, None) => RevisionState::Empty,
            (Some(draft), None) => RevisionState::DraftOnly {
                draft: draft.clone(),
            },
            (None, Some(published)) => RevisionState::PublishedOnly {
                published: published.clone(),
            },
            (Some(draft), Some(published)) if draft == published => {
                RevisionState::PublishedOnly {
                    published: published.clone(),
                }
            }
            (Some(draft), Some(published)) => RevisionState::Diverged {
                draft: draft.clone(),
                published: published.clone(),
            },
        }
    }

    /// Point the draft at a newly created (or cloned) revision
    pub fn with_draft(&self, draft: RevisionId) -> Self {
        Self {
            draft: Some(draft),
            published: self.published.clone(),
        }
    }

    /// Promote `draft` to the published snapshot and clear the draft pointer
    pub fn publish(draft: RevisionId) -> Self {
        Self::published_only(draft)
    }

    /// Remove visibility.
    ///
    /// Without a separate draft the published content is demoted to the
    /// draft so nothing is lost; with a pending draft only the published
    /// pointer is cleared.
    pub fn unpublish(&self) -> Self {
        match self.state() {
            RevisionState::PublishedOnly { published } => Self::draft_only(published),
            _ => Self {
                draft: self.draft.clone(),
                published: None,
            },
        }
    }

    /// Drop the pending draft, falling back to the published snapshot
    pub fn discard_draft(&self) -> Self {
        Self {
            draft: None,
            published: self.published.clone(),
        }
    }

    /// Revisions referenced by `self` that `next` no longer references
    pub fn released_by(&self, next: &RevisionPointers) -> Vec<RevisionId> {
        let mut released: Vec<RevisionId> = Vec::new();
        for id in [&self.draft, &self.published].into_iter().flatten() {
            let kept = next.draft.as_ref() == Some(id) || next.published.as_ref() == Some(id);
            if !kept && !released.contains(id) {
                released.push(id.clone());
            }
        }
        released
    }

    /// Identities may never be created with two different live revisions
    pub fn is_valid_initial(&self) -> bool {
        match (&self.draft, &self.published) {
            (Some(draft), Some(published)) => draft == published,
            _ => true,
        }
    }
}
