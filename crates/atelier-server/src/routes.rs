//! HTTP route handlers

pub mod artworks;
pub mod series;
pub mod templates;
pub mod works;
