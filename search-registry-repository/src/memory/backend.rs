//! In-memory document backend.
//!
//! This module provides a `SearchBackend` over plain JSON documents held in
//! process memory, evaluating Mongo-style selectors and sort objects.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::errors::SearchIndexError;
use crate::interfaces::{SearchBackend, SearchCallback};
use crate::memory::selector::{Selector, SortSpec};
use crate::types::{IndexConfiguration, IndexOptions};
use search_registry_shared::SearchResponse;

/// Configuration key naming the collection an index reads from.
///
/// When absent, the collection has the same name as the index.
pub const COLLECTION_KEY: &str = "collection";

/// Reference backend keeping every collection in memory.
///
/// Registered under the `minimongo` kind by the binary. The default query is a
/// case-insensitive substring match of the search string over every configured
/// field; the default sort is ascending on the first field.
///
/// # Example
///
/// ```ignore
/// let backend = InMemoryBackend::new();
/// backend.insert_documents("players", vec![json!({ "name": "Ada" })]);
/// backends.register_backend("minimongo", Arc::new(backend));
/// ```
#[derive(Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl InMemoryBackend {
    /// Create a backend with no collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents to a collection, creating it if needed.
    pub fn insert_documents(&self, collection: &str, documents: impl IntoIterator<Item = Value>) {
        let mut collections = self.collections.write();
        let entry = collections.entry(collection.to_string()).or_default();
        let before = entry.len();
        entry.extend(documents);

        debug!(
            collection = %collection,
            inserted = entry.len() - before,
            "Inserted documents"
        );
    }

    /// Number of documents in a collection, if it exists.
    pub fn document_count(&self, collection: &str) -> Option<usize> {
        self.collections.read().get(collection).map(Vec::len)
    }

    /// Names of every collection.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn run(
        &self,
        collection: &str,
        query: &Value,
        sort: &Value,
        limit: u64,
    ) -> Result<SearchResponse, SearchIndexError> {
        let selector = Selector::compile(query)?;
        let sort = SortSpec::compile(sort)?;

        let mut matched: Vec<Value> = match self.collections.read().get(collection) {
            Some(documents) => documents
                .iter()
                .filter(|doc| selector.matches(doc))
                .cloned()
                .collect(),
            None => {
                debug!(collection = %collection, "Collection not found, returning empty response");
                return Ok(SearchResponse::empty());
            }
        };

        sort.apply(&mut matched);

        let total = matched.len() as u64;
        matched.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(SearchResponse::new(matched, total))
    }
}

/// The collection an index configuration reads from.
fn collection_name<'a>(name: &'a str, config: &'a IndexConfiguration) -> &'a str {
    config
        .extra(COLLECTION_KEY)
        .and_then(Value::as_str)
        .unwrap_or(name)
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn create_search_index(
        &self,
        name: &str,
        options: &IndexOptions,
    ) -> Result<(), SearchIndexError> {
        let collection = match options.extra.get(COLLECTION_KEY) {
            None => name,
            Some(Value::String(collection)) => collection.as_str(),
            Some(other) => {
                return Err(SearchIndexError::index_creation(format!(
                    "`{}` must be a string, got {}",
                    COLLECTION_KEY, other
                )))
            }
        };

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default();

        debug!(index = %name, collection = %collection, "Provisioned in-memory collection");
        Ok(())
    }

    async fn search(
        &self,
        name: &str,
        search_string: &str,
        config: &IndexConfiguration,
        callback: Option<SearchCallback>,
    ) -> Result<SearchResponse, SearchIndexError> {
        let query = config.build_query(self, search_string);
        let sort = config.build_sort(self);
        let result = self.run(collection_name(name, config), &query, &sort, config.limit);

        if let Some(callback) = callback {
            callback(result.clone());
        }
        result
    }

    fn default_query(&self, config: &IndexConfiguration, search_string: &str) -> Value {
        if config.fields.is_empty() || search_string.is_empty() {
            return Value::Object(Map::new());
        }

        let pattern = regex::escape(search_string);
        let clauses: Vec<Value> = config
            .fields
            .iter()
            .map(|field| {
                let mut clause = Map::new();
                clause.insert(field.clone(), json!({ "$regex": pattern, "$options": "i" }));
                Value::Object(clause)
            })
            .collect();

        json!({ "$or": clauses })
    }

    fn default_sort(&self, config: &IndexConfiguration) -> Value {
        let mut sort = Map::new();
        if let Some(field) = config.fields.first() {
            sort.insert(field.clone(), json!(1));
        }
        Value::Object(sort)
    }
}
