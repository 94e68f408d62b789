//! Lazily evaluated configuration entries.
//!
//! The `sort`, `permission` and `query` entries of an index configuration are
//! not plain values: by default they defer to whichever backend serves the
//! configuration at call time. Callers can replace them with a static value or
//! with their own function.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::interfaces::SearchBackend;
use crate::types::IndexConfiguration;

/// Function building a sort specification from a configuration.
pub type SortFn = Arc<dyn Fn(&IndexConfiguration) -> Value + Send + Sync>;

/// Predicate deciding whether a search string may be searched at all.
pub type PermissionFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Function building a backend query from a configuration and a search string.
pub type QueryFn = Arc<dyn Fn(&IndexConfiguration, &str) -> Value + Send + Sync>;

/// How an index produces its sort specification.
#[derive(Clone, Default)]
pub enum SortStrategy {
    /// Ask the serving backend for its default sort.
    #[default]
    BackendDefault,
    /// Always use this value.
    Static(Value),
    /// Compute the sort from the merged configuration.
    Custom(SortFn),
}

impl SortStrategy {
    /// Wrap a function as a custom sort strategy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&IndexConfiguration) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Produce the sort specification for `config` as served by `backend`.
    pub fn resolve<B>(&self, backend: &B, config: &IndexConfiguration) -> Value
    where
        B: SearchBackend + ?Sized,
    {
        match self {
            Self::BackendDefault => backend.default_sort(config),
            Self::Static(value) => value.clone(),
            Self::Custom(f) => f(config),
        }
    }
}

impl fmt::Debug for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendDefault => f.write_str("BackendDefault"),
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Access gate evaluated on the search string before any backend is touched.
#[derive(Clone, Default)]
pub enum PermissionPredicate {
    /// Every search is allowed.
    #[default]
    AllowAll,
    /// Every search is allowed (`true`) or denied (`false`).
    Fixed(bool),
    /// Decide per search string.
    Custom(PermissionFn),
}

impl PermissionPredicate {
    /// Wrap a function as a custom permission predicate.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Returns true if `search_string` may be searched.
    pub fn allows(&self, search_string: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Fixed(allowed) => *allowed,
            Self::Custom(f) => f(search_string),
        }
    }
}

impl fmt::Debug for PermissionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowAll => f.write_str("AllowAll"),
            Self::Fixed(allowed) => f.debug_tuple("Fixed").field(allowed).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How an index turns a search string into a backend query or selector.
///
/// For a full-text engine this is the query object; for a document store it is
/// the selector.
#[derive(Clone, Default)]
pub enum QueryBuilder {
    /// Ask the serving backend for its default query.
    #[default]
    BackendDefault,
    /// Always use this value, whatever the search string.
    Static(Value),
    /// Build the query from the merged configuration and the search string.
    Custom(QueryFn),
}

impl QueryBuilder {
    /// Wrap a function as a custom query builder.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&IndexConfiguration, &str) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Produce the query for `search_string` against `config` as served by `backend`.
    pub fn resolve<B>(&self, backend: &B, config: &IndexConfiguration, search_string: &str) -> Value
    where
        B: SearchBackend + ?Sized,
    {
        match self {
            Self::BackendDefault => backend.default_query(config, search_string),
            Self::Static(value) => value.clone(),
            Self::Custom(f) => f(config, search_string),
        }
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendDefault => f.write_str("BackendDefault"),
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchIndexError;
    use crate::interfaces::SearchCallback;
    use crate::types::{IndexDefaults, IndexOptions};
    use async_trait::async_trait;
    use search_registry_shared::SearchResponse;
    use serde_json::json;

    struct FixedDefaults;

    #[async_trait]
    impl SearchBackend for FixedDefaults {
        async fn create_search_index(
            &self,
            _name: &str,
            _options: &IndexOptions,
        ) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn search(
            &self,
            _name: &str,
            _search_string: &str,
            _config: &IndexConfiguration,
            _callback: Option<SearchCallback>,
        ) -> Result<SearchResponse, SearchIndexError> {
            Ok(SearchResponse::empty())
        }

        fn default_query(&self, config: &IndexConfiguration, search_string: &str) -> Value {
            json!({ "fields": config.fields, "q": search_string })
        }

        fn default_sort(&self, _config: &IndexConfiguration) -> Value {
            json!({ "default": 1 })
        }
    }

    fn config() -> IndexConfiguration {
        IndexConfiguration::merged(
            "players",
            &IndexDefaults::default(),
            &IndexOptions::new().with_field("name"),
        )
    }

    #[test]
    fn test_backend_default_delegates() {
        let config = config();
        assert_eq!(
            QueryBuilder::BackendDefault.resolve(&FixedDefaults, &config, "ada"),
            json!({ "fields": ["name"], "q": "ada" })
        );
        assert_eq!(
            SortStrategy::BackendDefault.resolve(&FixedDefaults, &config),
            json!({ "default": 1 })
        );
    }

    #[test]
    fn test_static_values_ignore_backend() {
        let config = config();
        let query = QueryBuilder::Static(json!({ "all": true }));
        assert_eq!(query.resolve(&FixedDefaults, &config, "x"), json!({ "all": true }));
        let sort = SortStrategy::Static(json!({ "score": -1 }));
        assert_eq!(sort.resolve(&FixedDefaults, &config), json!({ "score": -1 }));
    }

    #[test]
    fn test_custom_functions_see_config() {
        let config = config();
        let sort = SortStrategy::custom(|c| json!({ (c.fields[0].clone()): -1 }));
        assert_eq!(sort.resolve(&FixedDefaults, &config), json!({ "name": -1 }));

        let query = QueryBuilder::custom(|c, s| json!({ "index": c.name, "term": s }));
        assert_eq!(
            query.resolve(&FixedDefaults, &config, "ada"),
            json!({ "index": "players", "term": "ada" })
        );
    }

    #[test]
    fn test_permission_predicates() {
        assert!(PermissionPredicate::AllowAll.allows("anything"));
        assert!(!PermissionPredicate::Fixed(false).allows("anything"));
        let min_length = PermissionPredicate::custom(|s| s.len() >= 3);
        assert!(!min_length.allows("ab"));
        assert!(min_length.allows("abc"));
    }
}
