//! This module defines the core data structures shared by the search registry.
//! It re-exports `SearchResponse` and `FieldSelection`.

pub mod field_selection;
pub mod search_response;

pub use field_selection::FieldSelection;
pub use search_response::SearchResponse;
