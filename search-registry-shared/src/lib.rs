//! # Search Registry Shared
//!
//! This crate defines shared data structures used across the search registry
//! crates: the response shape every backend produces and the field selection
//! accepted when declaring an index.

pub mod types;

pub use types::field_selection::FieldSelection;
pub use types::search_response::SearchResponse;
