//! Function-bundle backends.
//!
//! `SearcherMethods` lets a backend be declared as four plain functions rather
//! than a trait implementation. The bundle is checked for completeness when it
//! is registered and then adapted to `SearchBackend`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::interfaces::{SearchBackend, SearchCallback};
use crate::types::{IndexConfiguration, IndexOptions};
use search_registry_shared::SearchResponse;

/// Everything a function-bundle backend gets to see for one search.
///
/// `query` and `sort` are already resolved against the bundle's own defaults.
pub struct SearchInvocation<'a> {
    pub name: &'a str,
    pub search_string: &'a str,
    pub config: &'a IndexConfiguration,
    pub query: Value,
    pub sort: Value,
}

pub type SearchMethod =
    Arc<dyn Fn(SearchInvocation<'_>) -> Result<SearchResponse, SearchIndexError> + Send + Sync>;
pub type CreateIndexMethod =
    Arc<dyn Fn(&str, &IndexOptions) -> Result<(), SearchIndexError> + Send + Sync>;
pub type DefaultQueryMethod = Arc<dyn Fn(&IndexConfiguration, &str) -> Value + Send + Sync>;
pub type DefaultSortMethod = Arc<dyn Fn(&IndexConfiguration) -> Value + Send + Sync>;

/// The four functions a backend must supply.
///
/// Members left as `None` make registration fail with
/// `SearchIndexError::TypeConstraintViolation`.
#[derive(Clone, Default)]
pub struct SearcherMethods {
    pub search: Option<SearchMethod>,
    pub create_search_index: Option<CreateIndexMethod>,
    pub default_query: Option<DefaultQueryMethod>,
    pub default_sort: Option<DefaultSortMethod>,
}

impl SearcherMethods {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search function.
    pub fn with_search<F>(mut self, f: F) -> Self
    where
        F: Fn(SearchInvocation<'_>) -> Result<SearchResponse, SearchIndexError>
            + Send
            + Sync
            + 'static,
    {
        self.search = Some(Arc::new(f));
        self
    }

    /// Set the index provisioning function.
    pub fn with_create_search_index<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &IndexOptions) -> Result<(), SearchIndexError> + Send + Sync + 'static,
    {
        self.create_search_index = Some(Arc::new(f));
        self
    }

    /// Set the default query builder.
    pub fn with_default_query<F>(mut self, f: F) -> Self
    where
        F: Fn(&IndexConfiguration, &str) -> Value + Send + Sync + 'static,
    {
        self.default_query = Some(Arc::new(f));
        self
    }

    /// Set the default sort builder.
    pub fn with_default_sort<F>(mut self, f: F) -> Self
    where
        F: Fn(&IndexConfiguration) -> Value + Send + Sync + 'static,
    {
        self.default_sort = Some(Arc::new(f));
        self
    }

    /// Check that every member is present and adapt the bundle to `SearchBackend`.
    pub(crate) fn into_backend(self) -> Result<MethodsBackend, SearchIndexError> {
        Ok(MethodsBackend {
            search: self.search.ok_or_else(|| missing("search"))?,
            create_search_index: self
                .create_search_index
                .ok_or_else(|| missing("create_search_index"))?,
            default_query: self.default_query.ok_or_else(|| missing("default_query"))?,
            default_sort: self.default_sort.ok_or_else(|| missing("default_sort"))?,
        })
    }
}

fn missing(member: &str) -> SearchIndexError {
    SearchIndexError::type_constraint(format!("searcher method `{}` must be a function", member))
}

/// `SearchBackend` adapter over a complete `SearcherMethods` bundle.
pub(crate) struct MethodsBackend {
    search: SearchMethod,
    create_search_index: CreateIndexMethod,
    default_query: DefaultQueryMethod,
    default_sort: DefaultSortMethod,
}

#[async_trait]
impl SearchBackend for MethodsBackend {
    async fn create_search_index(
        &self,
        name: &str,
        options: &IndexOptions,
    ) -> Result<(), SearchIndexError> {
        (self.create_search_index)(name, options)
    }

    async fn search(
        &self,
        name: &str,
        search_string: &str,
        config: &IndexConfiguration,
        callback: Option<SearchCallback>,
    ) -> Result<SearchResponse, SearchIndexError> {
        let invocation = SearchInvocation {
            name,
            search_string,
            config,
            query: config.build_query(self, search_string),
            sort: config.build_sort(self),
        };
        let result = (self.search)(invocation);

        if let Some(callback) = callback {
            callback(result.clone());
        }
        result
    }

    fn default_query(&self, config: &IndexConfiguration, search_string: &str) -> Value {
        (self.default_query)(config, search_string)
    }

    fn default_sort(&self, config: &IndexConfiguration) -> Value {
        (self.default_sort)(config)
    }
}
