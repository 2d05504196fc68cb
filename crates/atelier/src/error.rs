//! Error types for the atelier content model

use thiserror::Error;

/// Validation failures detected before any storage is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("At least one language entry is required")]
    NoLanguages,

    #[error("Invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("Missing required title for language '{lang}'")]
    MissingTitle { lang: String },

    #[error("Media descriptor requires an original path")]
    MissingOriginalPath,

    #[error("Sort index must not be negative, got {0}")]
    NegativeSortIndex(i64),

    #[error("Artwork order must not be empty")]
    EmptyOrder,

    #[error("Artwork {0} appears more than once in the requested order")]
    DuplicateInOrder(String),

    #[error("Unknown owner kind: {0}")]
    UnknownOwnerKind(String),

    #[error("Owner kind {kind} is inconsistent with user reference {user_id:?}")]
    InconsistentOwner { kind: String, user_id: Option<i64> },

    #[error("Unknown view: {0}")]
    UnknownView(String),
}

/// Shorthand result type for content model operations
pub type Result<T> = std::result::Result<T, DomainError>;
