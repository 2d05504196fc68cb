//! Error types for the atelier registry

use std::time::Duration;
use thiserror::Error;

/// Registry-specific errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} is locked")]
    Locked(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] atelier::DomainError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Transaction {operation} exceeded {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Wrap a backend failure with the step that produced it.
    ///
    /// A write that lost the database lock to a concurrent transaction is a
    /// [`RegistryError::Conflict`]; the whole operation rolled back and can
    /// be retried.
    pub(crate) fn storage<E>(context: &str, err: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let source: &(dyn std::error::Error + 'static) = &err;
        let contended = source
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| is_lock_contention(db.code().as_deref()));
        if contended {
            return RegistryError::Conflict(format!("{}: concurrent write in progress", context));
        }
        RegistryError::Storage(format!("{}: {}", context, err))
    }

    /// Map `RowNotFound` to [`RegistryError::NotFound`], everything else to storage
    pub(crate) fn lookup(what: impl Into<String>, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RegistryError::NotFound(what.into()),
            other => RegistryError::storage("Lookup failed", other),
        }
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// SQLite reports extended result codes; the low byte is the primary code
fn is_lock_contention(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
