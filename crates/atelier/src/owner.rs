//! Ownership of identities: tenant content versus system templates

use crate::error::{DomainError, Result};
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminant stored alongside every identity row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    User,
    System,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "user",
            OwnerKind::System => "system",
        }
    }
}

impl FromStr for OwnerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(OwnerKind::User),
            "system" => Ok(OwnerKind::System),
            other => Err(DomainError::UnknownOwnerKind(other.to_string())),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who owns an identity.
///
/// User-owned identities always carry the owning tenant; system-owned
/// (template) identities never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "lowercase")]
pub enum Owner {
    User(UserId),
    System,
}

impl Owner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            Owner::User(_) => OwnerKind::User,
            Owner::System => OwnerKind::System,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Owner::User(id) => Some(*id),
            Owner::System => None,
        }
    }

    /// Rebuild an owner from its stored columns
    pub fn from_columns(kind: &str, user_id: Option<i64>) -> Result<Self> {
        match (kind.parse::<OwnerKind>()?, user_id) {
            (OwnerKind::User, Some(id)) => Ok(Owner::User(UserId(id))),
            (OwnerKind::System, None) => Ok(Owner::System),
            (kind, user_id) => Err(DomainError::InconsistentOwner {
                kind: kind.to_string(),
                user_id,
            }),
        }
    }
}
