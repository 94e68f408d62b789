//! Search response types for the search registry.
//!
//! This module defines the response structure returned from search operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complete search response with matched records and their count.
///
/// Records are backend-native documents, so they are carried as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResponse {
    /// The matched records, in the order the backend produced them.
    pub results: Vec<Value>,

    /// Total number of matching records.
    /// May be greater than the number of returned results when a limit applied.
    pub total: u64,
}

impl SearchResponse {
    /// Create the canonical empty response (`{ results: [], total: 0 }`).
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: 0,
        }
    }

    /// Create a new search response.
    pub fn new(results: Vec<Value>, total: u64) -> Self {
        Self { results, total }
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the number of results in this response.
    pub fn len(&self) -> usize {
        self.results.len()
    }
}
