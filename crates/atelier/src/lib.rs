//! Atelier is the content model behind a portfolio of artwork series.
//!
//! A [`Series`] owns an ordered list of [`Artwork`]s. Both are *identities*:
//! stable handles that point at up to two *revisions*, a mutable draft and an
//! immutable published snapshot. Everything in this crate is independent of
//! storage, so the state machine, the copy-on-write clone and the view
//! projections can be exercised without a database.

pub mod error;
pub mod ids;
pub mod input;
pub mod model;
pub mod owner;
pub mod state;
pub mod view;

// Re-export core types
pub use error::{DomainError, Result};
pub use ids::{ArtworkId, ImageId, RevisionId, SeriesId, UserId};
pub use input::{
    ArtworkPatch, ImageInput, NewArtwork, NewSeries, SeriesPatch, Validate, validate_order,
};
pub use model::{
    Artwork, ArtworkFields, ArtworkRecord, ArtworkRevision, ArtworkText, Image, Series,
    SeriesRecord, SeriesRevision, SeriesText,
};
pub use owner::{Owner, OwnerKind};
pub use state::{RevisionPointers, RevisionState};
pub use view::{
    ArtworkView, ImageRef, MetaView, RevisionMeta, SeriesView, ViewKind, WorksView,
    project_artwork, project_series,
};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
