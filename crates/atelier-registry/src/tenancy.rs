//! Tenancy guard
//!
//! Every read and write is filtered by a [`Scope`]. A user scope sees only
//! that tenant's identities. The system scope (template authoring) can only
//! be obtained from an authorization decision made by the caller.

use crate::error::{RegistryError, Result};
use atelier::{Owner, OwnerKind, UserId};

/// Authorization result decided outside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

/// Owner filter applied to every identity query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    owner: Owner,
}

impl Scope {
    pub fn user(user_id: UserId) -> Self {
        Self {
            owner: Owner::User(user_id),
        }
    }

    /// Privileged scope over system-owned templates
    pub fn system(decision: AccessDecision) -> Result<Self> {
        match decision {
            AccessDecision::Allowed => Ok(Self::templates()),
            AccessDecision::Denied => Err(RegistryError::AccessDenied(
                "system scope requires an authorized caller".to_string(),
            )),
        }
    }

    /// Read-only view of templates shared with every tenant
    pub(crate) fn templates() -> Self {
        Self {
            owner: Owner::System,
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn kind(&self) -> OwnerKind {
        self.owner.kind()
    }

    /// Value bound to the `owner_kind` column
    pub(crate) fn kind_column(&self) -> &'static str {
        self.owner.kind().as_str()
    }

    /// Value bound to the `user_id` column, compared with `IS`
    pub(crate) fn user_column(&self) -> Option<i64> {
        self.owner.user_id().map(|id| id.0)
    }
}
