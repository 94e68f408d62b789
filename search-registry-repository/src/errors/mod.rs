//! Error types for the search registry repository.
//!
//! This module provides a unified error type for all registry and backend operations.

mod search_index_error;

pub use search_index_error::SearchIndexError;
