//! Search backend trait definition.
//!
//! This module defines the abstract interface a search engine implements to be
//! registered with the `BackendRegistry` (in-memory collections, full-text
//! engines, database-backed search, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{IndexConfiguration, IndexOptions};
use search_registry_shared::SearchResponse;

/// Optional completion callback handed to a backend alongside a search.
///
/// A backend that receives one delivers the outcome through it exactly once.
pub type SearchCallback = Box<dyn FnOnce(Result<SearchResponse, SearchIndexError>) + Send>;

/// Abstracts a pluggable search engine.
///
/// Implementations are registered under a backend kind (the `use` option of an
/// index) and receive a merged configuration snapshot on every call. They must
/// not assume that snapshot persists or is shared with other calls.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a single instance can serve
/// every index that names its kind.
///
/// # Error Handling
///
/// Errors returned here are propagated to the caller unchanged.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Provision whatever the backend needs for a newly declared index.
    ///
    /// Receives the options exactly as the caller supplied them, before they
    /// are merged with defaults. Must be idempotent: redeclaring an index calls
    /// this again with the new options.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    /// * `options` - The caller's creation options
    async fn create_search_index(
        &self,
        name: &str,
        options: &IndexOptions,
    ) -> Result<(), SearchIndexError>;

    /// Execute a search against the index.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    /// * `search_string` - The caller's search string
    /// * `config` - The merged configuration for this call
    /// * `callback` - Optional completion callback, invoked exactly once when present
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Matched records and their total count
    /// * `Err(SearchIndexError)` - If the search fails
    async fn search(
        &self,
        name: &str,
        search_string: &str,
        config: &IndexConfiguration,
        callback: Option<SearchCallback>,
    ) -> Result<SearchResponse, SearchIndexError>;

    /// Build the backend-native query (or selector) for a search string from
    /// the configuration's field list.
    fn default_query(&self, config: &IndexConfiguration, search_string: &str) -> Value;

    /// Build the backend-native sort specification for a configuration.
    fn default_sort(&self, config: &IndexConfiguration) -> Value;
}
