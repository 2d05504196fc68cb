//! API models for requests and responses

pub mod api;
pub mod works;

// Re-export commonly used types
pub use api::*;
pub use works::*;
