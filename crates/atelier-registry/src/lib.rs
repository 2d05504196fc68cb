//! # Atelier Registry
//!
//! The versioning engine behind atelier works. It persists series and
//! artworks in SQLite and provides:
//! - Copy-on-write drafts: the first edit after a publish clones the
//!   published revision, so live content is never modified in place
//! - Atomic publish and unpublish that never lose content
//! - Deep duplication of system templates into user-owned drafts
//! - Bulk draft discard, reordering and cascading deletes
//! - Tenancy scoping of every read and write
//!
//! Every write runs in one transaction bounded by
//! [`RegistryConfig::transaction_timeout`]; any failure rolls back the whole
//! operation.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use atelier::{NewSeries, SeriesText, UserId, ViewKind};
//! use atelier_registry::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let storage = SqliteStorage::new("sqlite:./data/atelier.db").await?;
//! let registry = Registry::new(storage, RegistryConfig::default());
//! let scope = Scope::user(UserId(42));
//!
//! let mut request = NewSeries::default();
//! request.i18n.insert(
//!     "en".to_string(),
//!     SeriesText { title: "Ocean".to_string(), ..SeriesText::default() },
//! );
//! let series_id = registry.create_series(&scope, &request).await?;
//! registry.publish_series(&scope, &series_id).await?;
//!
//! let view = registry.series_view(&scope, &series_id, ViewKind::Published).await?;
//! println!("{}", view.i18n["en"].title);
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod config;
mod copy;
mod draft;
pub mod error;
mod mutation;
mod publish;
mod read;
pub mod registry;
pub mod storage;
pub mod tenancy;

pub use bulk::{DiscardOutcome, ReorderOutcome};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::{Registry, WorksRegistry};
pub use storage::SqliteStorage;
pub use tenancy::{AccessDecision, Scope};
