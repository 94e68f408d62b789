//! Search index registry and dispatcher.
//!
//! This module owns the named index configurations. It merges options into
//! configurations when indexes are declared and when they are searched, gates
//! every search behind the index's permission predicate, and hands the search
//! to the backend the configuration names.
//!
//! # Configuration merge
//!
//! The effective configuration of a search is the default template, overlaid
//! with the options the index was declared with, overlaid with the options of
//! the call. Each overlay is shallow and key by key; the later writer wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::backends::{BackendRegistry, SearcherMethods};
use crate::config::SearchRegistryConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::{SearchBackend, SearchCallback};
use crate::types::{IndexConfiguration, IndexOptions};
use search_registry_shared::SearchResponse;

/// The main entry point for declaring and searching indexes.
///
/// Both the index map and the shared `BackendRegistry` are explicit state: the
/// application's composition root builds them, and tests can build as many
/// isolated registries as they like.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use search_registry_repository::{
///     BackendRegistry, InMemoryBackend, IndexOptions, SearchIndexRegistry,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backends = Arc::new(BackendRegistry::new());
/// backends.register_backend("minimongo", Arc::new(InMemoryBackend::new()));
///
/// let registry = SearchIndexRegistry::new(backends);
/// registry
///     .create_search_index("players", IndexOptions::new().with_field("name"))
///     .await?;
///
/// let response = registry
///     .search("players", "ada", IndexOptions::new(), None)
///     .await?;
/// println!("Found {} players", response.total);
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexRegistry {
    backends: Arc<BackendRegistry>,
    indexes: RwLock<BTreeMap<String, StoredIndex>>,
    config: SearchRegistryConfig,
}

/// A stored configuration and the number of times it has been written.
#[derive(Debug, Clone)]
struct StoredIndex {
    config: IndexConfiguration,
    revision: u64,
}

impl SearchIndexRegistry {
    /// Create a new registry with default configuration.
    ///
    /// # Arguments
    ///
    /// * `backends` - The backend registry searches are dispatched to
    pub fn new(backends: Arc<BackendRegistry>) -> Self {
        Self::with_config(backends, SearchRegistryConfig::default())
    }

    /// Create a new registry with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `backends` - The backend registry searches are dispatched to
    /// * `config` - Default template and override persistence settings
    pub fn with_config(backends: Arc<BackendRegistry>, config: SearchRegistryConfig) -> Self {
        Self {
            backends,
            indexes: RwLock::new(BTreeMap::new()),
            config,
        }
    }

    /// The backend registry this dispatcher routes to.
    pub fn backends(&self) -> &Arc<BackendRegistry> {
        &self.backends
    }

    /// The settings this registry was built with.
    pub fn settings(&self) -> &SearchRegistryConfig {
        &self.config
    }

    /// Placeholder for global configuration; accepts anything and returns an
    /// empty object.
    pub fn config(&self, _new_config: &Map<String, Value>) -> Map<String, Value> {
        Map::new()
    }

    /// Declare (or redeclare) a named index.
    ///
    /// The stored configuration is a fresh copy of the defaults overlaid with
    /// `options`; any previous configuration under `name` is replaced wholesale.
    /// If the backend named by the merged configuration is already registered,
    /// its `create_search_index` hook receives the options as given (not the
    /// merged configuration). If it is not registered yet the hook is skipped;
    /// the backend only has to exist by the time the index is searched.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was stored (and provisioned, when possible)
    /// * `Err(SearchIndexError::TypeConstraintViolation)` - If the options are ill-typed
    /// * `Err(SearchIndexError)` - Whatever the backend hook reported; the
    ///   configuration is stored regardless
    #[instrument(skip(self, options), fields(index = %name))]
    pub async fn create_search_index(
        &self,
        name: &str,
        options: IndexOptions,
    ) -> Result<(), SearchIndexError> {
        options.validate()?;

        let config = IndexConfiguration::merged(name, &self.config.defaults, &options);
        let kind = config.backend_kind.clone();
        let replaced = self.store_index(config);

        debug!(backend = %kind, replaced, "Stored index configuration");

        match self.backends.get_searcher(&kind) {
            Some(backend) => backend.create_search_index(name, &options).await,
            None => {
                debug!(backend = %kind, "Backend not registered yet, skipping index provisioning");
                Ok(())
            }
        }
    }

    /// Declare an index from a JSON options object.
    ///
    /// See [`IndexOptions::from_value`] for the accepted keys.
    pub async fn create_search_index_from_value(
        &self,
        name: &str,
        options: Value,
    ) -> Result<(), SearchIndexError> {
        let options = IndexOptions::from_value(options)?;
        self.create_search_index(name, options).await
    }

    /// Search a named index.
    ///
    /// The index's permission predicate is evaluated on `search_string` before
    /// any backend is touched; a denied search returns the empty response
    /// without calling the backend or the callback. Otherwise `options` are
    /// overlaid onto the stored configuration and the backend named by the
    /// stored configuration runs the search.
    ///
    /// With `persist_call_overrides` enabled (the default) the overlay is
    /// written back, so options passed here stay in effect for later searches
    /// of the same index. The write happens under the registry lock, so
    /// overlapping searches apply their overrides one at a time. The write only
    /// lands on the configuration whose permission was checked: if the index
    /// was written in between, the lookup and the check start over against the
    /// new configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - The backend's response, unmodified, or the empty
    ///   response when permission was denied
    /// * `Err(SearchIndexError::UnknownIndex)` - If no index is declared under `name`
    /// * `Err(SearchIndexError::UnknownBackend)` - If the index names an unregistered backend
    /// * `Err(SearchIndexError)` - Whatever the backend reported
    #[instrument(skip(self, options, callback), fields(index = %name))]
    pub async fn search(
        &self,
        name: &str,
        search_string: &str,
        options: IndexOptions,
        callback: Option<SearchCallback>,
    ) -> Result<SearchResponse, SearchIndexError> {
        options.validate()?;

        let (backend, merged) = loop {
            let (stored, revision) = self
                .snapshot(name)
                .ok_or_else(|| SearchIndexError::unknown_index(name))?;
            let backend = self
                .backends
                .get_searcher(&stored.backend_kind)
                .ok_or_else(|| SearchIndexError::unknown_backend(&stored.backend_kind))?;

            // Predicates run without the lock held; they may call back into the registry.
            if !stored.allows(search_string) {
                debug!("Permission denied, returning empty response");
                return Ok(SearchResponse::empty());
            }

            match self.merge_call_options(name, revision, stored, &options) {
                Some(merged) => break (backend, merged),
                None => debug!(revision, "Index changed during permission check, retrying"),
            }
        };

        debug!(backend = %merged.backend_kind, limit = merged.limit, "Dispatching search");
        backend
            .search(name, search_string, &merged, callback)
            .await
    }

    /// Search a named index with JSON call options.
    ///
    /// The options are type checked before anything else happens.
    pub async fn search_with_value(
        &self,
        name: &str,
        search_string: &str,
        options: Value,
        callback: Option<SearchCallback>,
    ) -> Result<SearchResponse, SearchIndexError> {
        let options = IndexOptions::from_value(options)?;
        self.search(name, search_string, options, callback).await
    }

    /// Overlay call options, writing them back when overrides persist.
    ///
    /// Returns `None` when overrides persist and the stored entry is no longer
    /// at `revision`, which leaves the store untouched.
    fn merge_call_options(
        &self,
        name: &str,
        revision: u64,
        mut snapshot: IndexConfiguration,
        options: &IndexOptions,
    ) -> Option<IndexConfiguration> {
        if self.config.persist_call_overrides {
            let mut indexes = self.indexes.write();
            let stored = indexes
                .get_mut(name)
                .filter(|stored| stored.revision == revision)?;
            stored.config.apply(options);
            stored.revision += 1;
            return Some(stored.config.clone());
        }

        snapshot.apply(options);
        Some(snapshot)
    }

    /// Store `config` under its name, returning whether it replaced an entry.
    fn store_index(&self, config: IndexConfiguration) -> bool {
        let mut indexes = self.indexes.write();
        match indexes.get_mut(&config.name) {
            Some(stored) => {
                stored.config = config;
                stored.revision += 1;
                true
            }
            None => {
                indexes.insert(config.name.clone(), StoredIndex { config, revision: 0 });
                false
            }
        }
    }

    fn snapshot(&self, name: &str) -> Option<(IndexConfiguration, u64)> {
        self.indexes
            .read()
            .get(name)
            .map(|stored| (stored.config.clone(), stored.revision))
    }

    /// Retrieve the configuration of a named index.
    pub fn get_index(&self, name: &str) -> Option<IndexConfiguration> {
        self.indexes.read().get(name).map(|stored| stored.config.clone())
    }

    /// Retrieve every index configuration, keyed by name.
    pub fn get_indexes(&self) -> BTreeMap<String, IndexConfiguration> {
        self.indexes
            .read()
            .iter()
            .map(|(name, stored)| (name.clone(), stored.config.clone()))
            .collect()
    }

    /// Retrieve the backend registered under `kind`.
    pub fn get_searcher(&self, kind: &str) -> Option<Arc<dyn SearchBackend>> {
        self.backends.get_searcher(kind)
    }

    /// Retrieve every registered backend, keyed by kind.
    pub fn get_searchers(&self) -> BTreeMap<String, Arc<dyn SearchBackend>> {
        self.backends.get_searchers()
    }

    /// Register a function-bundle backend under `kind`.
    ///
    /// Fails with `TypeConstraintViolation` if any of the four methods is missing.
    pub fn create_searcher(
        &self,
        kind: &str,
        methods: SearcherMethods,
    ) -> Result<(), SearchIndexError> {
        self.backends.create_searcher(kind, methods)
    }

    /// Register a backend implementation under `kind`.
    pub fn register_backend(&self, kind: impl Into<String>, backend: Arc<dyn SearchBackend>) {
        self.backends.register_backend(kind, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{PermissionPredicate, QueryBuilder, SortStrategy};
    use crate::types::IndexDefaults;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Weak;
    use tokio::sync::Mutex;

    /// A search call as seen by the mock backend.
    #[derive(Debug, Clone)]
    struct RecordedSearch {
        name: String,
        search_string: String,
        config: IndexConfiguration,
        query: Value,
        sort: Value,
    }

    /// Mock backend for testing
    struct MockBackend {
        created: Arc<Mutex<Vec<(String, IndexOptions)>>>,
        searches: Arc<Mutex<Vec<RecordedSearch>>>,
        should_fail: bool,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                created: Arc::new(Mutex::new(Vec::new())),
                searches: Arc::new(Mutex::new(Vec::new())),
                should_fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                should_fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn create_search_index(
            &self,
            name: &str,
            options: &IndexOptions,
        ) -> Result<(), SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::index_creation("Mock failure"));
            }
            self.created
                .lock()
                .await
                .push((name.to_string(), options.clone()));
            Ok(())
        }

        async fn search(
            &self,
            name: &str,
            search_string: &str,
            config: &IndexConfiguration,
            callback: Option<SearchCallback>,
        ) -> Result<SearchResponse, SearchIndexError> {
            let result = if self.should_fail {
                Err(SearchIndexError::backend("Mock failure"))
            } else {
                Ok(SearchResponse::new(vec![json!({ "hit": search_string })], 1))
            };

            self.searches.lock().await.push(RecordedSearch {
                name: name.to_string(),
                search_string: search_string.to_string(),
                config: config.clone(),
                query: config.build_query(self, search_string),
                sort: config.build_sort(self),
            });

            if let Some(callback) = callback {
                callback(result.clone());
            }
            result
        }

        fn default_query(&self, config: &IndexConfiguration, search_string: &str) -> Value {
            json!({ "fields": config.fields, "term": search_string })
        }

        fn default_sort(&self, config: &IndexConfiguration) -> Value {
            json!({ "by": config.fields.first() })
        }
    }

    fn registry_with(backend: Arc<MockBackend>) -> SearchIndexRegistry {
        let backends = Arc::new(BackendRegistry::new());
        backends.register_backend("mock", backend);
        SearchIndexRegistry::new(backends)
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        registry
            .create_search_index(
                "players",
                IndexOptions::new()
                    .with_field(["name", "bio"])
                    .using("mock")
                    .with_limit(3)
                    .with_extra("collection", "players"),
            )
            .await
            .unwrap();

        let config = registry.get_index("players").unwrap();
        assert_eq!(config.name, "players");
        assert_eq!(config.fields, vec!["name", "bio"]);
        assert_eq!(config.limit, 3);
        assert_eq!(config.format, "mongo");
        assert_eq!(config.backend_kind, "mock");
        assert_eq!(config.extra("collection"), Some(&json!("players")));
        assert!(registry.get_index("unknown").is_none());
    }

    #[tokio::test]
    async fn test_field_normalization_from_json() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        registry
            .create_search_index_from_value("single", json!({ "field": "x", "use": "mock" }))
            .await
            .unwrap();
        registry
            .create_search_index_from_value("many", json!({ "field": ["x", "y"], "use": "mock" }))
            .await
            .unwrap();

        assert_eq!(registry.get_index("single").unwrap().fields, vec!["x"]);
        assert_eq!(registry.get_index("many").unwrap().fields, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_create_rejects_ill_typed_options() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        let result = registry
            .create_search_index_from_value("players", json!(["not", "a", "record"]))
            .await;
        assert!(matches!(
            result,
            Err(SearchIndexError::TypeConstraintViolation(_))
        ));

        let result = registry
            .create_search_index("players", IndexOptions::new().with_limit(0))
            .await;
        assert!(matches!(
            result,
            Err(SearchIndexError::TypeConstraintViolation(_))
        ));
        assert!(registry.get_indexes().is_empty());
    }

    #[tokio::test]
    async fn test_redeclaration_replaces_configuration() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        registry
            .create_search_index(
                "players",
                IndexOptions::new()
                    .with_field("name")
                    .using("mock")
                    .with_limit(3)
                    .with_extra("collection", "players"),
            )
            .await
            .unwrap();
        registry
            .create_search_index("players", IndexOptions::new().with_field("bio").using("mock"))
            .await
            .unwrap();

        let config = registry.get_index("players").unwrap();
        assert_eq!(config.fields, vec!["bio"]);
        assert_eq!(config.limit, 10);
        assert!(config.extra("collection").is_none());
        assert_eq!(registry.get_indexes().len(), 1);
    }

    #[tokio::test]
    async fn test_create_hook_receives_pre_merge_options() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index("players", IndexOptions::new().with_field("name").using("mock"))
            .await
            .unwrap();

        let created = backend.created.lock().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "players");
        assert!(created[0].1.limit.is_none());
        assert!(created[0].1.format.is_none());
    }

    #[tokio::test]
    async fn test_create_hook_uses_default_backend_kind() {
        let backend = Arc::new(MockBackend::new());
        let backends = Arc::new(BackendRegistry::new());
        backends.register_backend("minimongo", backend.clone());
        let registry = SearchIndexRegistry::new(backends);

        registry
            .create_search_index("players", IndexOptions::new().with_field("name"))
            .await
            .unwrap();

        assert_eq!(backend.created.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_before_backend_registration() {
        let backends = Arc::new(BackendRegistry::new());
        let registry = SearchIndexRegistry::new(Arc::clone(&backends));

        registry
            .create_search_index("players", IndexOptions::new().with_field("name").using("late"))
            .await
            .unwrap();

        let backend = Arc::new(MockBackend::new());
        backends.register_backend("late", backend.clone());

        let response = registry
            .search("players", "ada", IndexOptions::new(), None)
            .await
            .unwrap();

        assert_eq!(response.total, 1);
        assert!(backend.created.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_hook_error_is_propagated() {
        let registry = registry_with(Arc::new(MockBackend::failing()));

        let result = registry
            .create_search_index("players", IndexOptions::new().using("mock"))
            .await;

        assert!(matches!(
            result,
            Err(SearchIndexError::IndexCreationError(_))
        ));
        assert!(registry.get_index("players").is_some());
    }

    #[tokio::test]
    async fn test_permission_denied_short_circuits() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index(
                "players",
                IndexOptions::new()
                    .with_field("name")
                    .using("mock")
                    .with_permission(PermissionPredicate::custom(|_| false)),
            )
            .await
            .unwrap();

        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let callback: SearchCallback = Box::new(move |_| {
            flag.store(true, Ordering::SeqCst);
        });

        let response = registry
            .search(
                "players",
                "anything",
                IndexOptions::new().with_limit(99),
                Some(callback),
            )
            .await
            .unwrap();

        assert_eq!(response, SearchResponse::empty());
        assert!(backend.searches.lock().await.is_empty());
        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(registry.get_index("players").unwrap().limit, 10);
    }

    #[tokio::test]
    async fn test_permission_sees_search_string() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index(
                "players",
                IndexOptions::new()
                    .using("mock")
                    .with_permission(PermissionPredicate::custom(|s| s.len() >= 3)),
            )
            .await
            .unwrap();

        let denied = registry
            .search("players", "ab", IndexOptions::new(), None)
            .await
            .unwrap();
        let allowed = registry
            .search("players", "abc", IndexOptions::new(), None)
            .await
            .unwrap();

        assert_eq!(denied.total, 0);
        assert_eq!(allowed.total, 1);
        assert_eq!(backend.searches.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_redeclaration_during_permission_check_is_honored() {
        let backend = Arc::new(MockBackend::new());
        let registry = Arc::new(registry_with(Arc::clone(&backend)));

        let slot: Arc<parking_lot::Mutex<Weak<SearchIndexRegistry>>> =
            Arc::new(parking_lot::Mutex::new(Weak::new()));
        let redeclared = Arc::new(AtomicBool::new(false));

        let handle = Arc::clone(&slot);
        let once = Arc::clone(&redeclared);
        let permission = PermissionPredicate::custom(move |_| {
            if !once.swap(true, Ordering::SeqCst) {
                if let Some(registry) = handle.lock().upgrade() {
                    registry.store_index(IndexConfiguration::merged(
                        "players",
                        &IndexDefaults::default(),
                        &IndexOptions::new()
                            .using("mock")
                            .with_permission(PermissionPredicate::custom(|_| false)),
                    ));
                }
            }
            true
        });
        *slot.lock() = Arc::downgrade(&registry);

        registry
            .create_search_index(
                "players",
                IndexOptions::new().using("mock").with_permission(permission),
            )
            .await
            .unwrap();

        let response = registry
            .search("players", "ada", IndexOptions::new().with_limit(50), None)
            .await
            .unwrap();

        assert!(redeclared.load(Ordering::SeqCst));
        assert_eq!(response, SearchResponse::empty());
        assert!(backend.searches.lock().await.is_empty());
        assert_eq!(registry.get_index("players").unwrap().limit, 10);
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        registry
            .create_search_index_from_value("i", json!({ "use": "nonexistent", "field": "x" }))
            .await
            .unwrap();

        let err = registry
            .search("i", "q", IndexOptions::new(), None)
            .await
            .unwrap_err();

        assert_eq!(err, SearchIndexError::unknown_backend("nonexistent"));
        assert_eq!(err.code(), 500);
    }

    #[tokio::test]
    async fn test_unknown_index() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        let result = registry.search("missing", "q", IndexOptions::new(), None).await;

        assert!(matches!(result, Err(SearchIndexError::UnknownIndex(_))));
    }

    #[tokio::test]
    async fn test_search_merge_precedence() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index(
                "players",
                IndexOptions::new()
                    .with_field("name")
                    .using("mock")
                    .with_limit(5)
                    .with_extra("collection", "players"),
            )
            .await
            .unwrap();

        registry
            .search(
                "players",
                "ada",
                IndexOptions::new()
                    .with_limit(20)
                    .with_extra("props", json!({ "team": "red" })),
                None,
            )
            .await
            .unwrap();

        let searches = backend.searches.lock().await;
        let call = &searches[0];
        assert_eq!(call.name, "players");
        assert_eq!(call.search_string, "ada");
        assert_eq!(call.config.limit, 20);
        assert_eq!(call.config.format, "mongo");
        assert_eq!(call.config.fields, vec!["name"]);
        assert_eq!(call.config.extra("collection"), Some(&json!("players")));
        assert_eq!(call.config.extra("props"), Some(&json!({ "team": "red" })));
        assert_eq!(call.query, json!({ "fields": ["name"], "term": "ada" }));
        assert_eq!(call.sort, json!({ "by": "name" }));
    }

    #[tokio::test]
    async fn test_call_overrides_replace_lazy_entries() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index("players", IndexOptions::new().with_field("name").using("mock"))
            .await
            .unwrap();

        registry
            .search_with_value(
                "players",
                "ada",
                json!({ "sort": { "score": -1 }, "query": { "all": true } }),
                None,
            )
            .await
            .unwrap();

        let searches = backend.searches.lock().await;
        assert_eq!(searches[0].sort, json!({ "score": -1 }));
        assert_eq!(searches[0].query, json!({ "all": true }));
    }

    #[tokio::test]
    async fn test_call_overrides_persist_by_default() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index("players", IndexOptions::new().with_field("name").using("mock"))
            .await
            .unwrap();

        registry
            .search("players", "a", IndexOptions::new().with_limit(50), None)
            .await
            .unwrap();
        registry
            .search("players", "b", IndexOptions::new(), None)
            .await
            .unwrap();

        let searches = backend.searches.lock().await;
        assert_eq!(searches[1].config.limit, 50);
        assert_eq!(registry.get_index("players").unwrap().limit, 50);
    }

    #[tokio::test]
    async fn test_call_overrides_snapshot_when_configured() {
        let backend = Arc::new(MockBackend::new());
        let backends = Arc::new(BackendRegistry::new());
        backends.register_backend("mock", backend.clone());
        let registry =
            SearchIndexRegistry::with_config(backends, SearchRegistryConfig::snapshot_call_overrides());

        registry
            .create_search_index("players", IndexOptions::new().with_field("name").using("mock"))
            .await
            .unwrap();

        registry
            .search("players", "a", IndexOptions::new().with_limit(50), None)
            .await
            .unwrap();
        registry
            .search("players", "b", IndexOptions::new(), None)
            .await
            .unwrap();

        let searches = backend.searches.lock().await;
        assert_eq!(searches[0].config.limit, 50);
        assert_eq!(searches[1].config.limit, 10);
        assert_eq!(registry.get_index("players").unwrap().limit, 10);
    }

    #[tokio::test]
    async fn test_custom_defaults_template() {
        let backend = Arc::new(MockBackend::new());
        let backends = Arc::new(BackendRegistry::new());
        backends.register_backend("mock", backend.clone());
        let registry = SearchIndexRegistry::with_config(
            backends,
            SearchRegistryConfig::with_defaults(IndexDefaults {
                format: "documents".to_string(),
                limit: 25,
                backend_kind: "mock".to_string(),
            }),
        );

        registry
            .create_search_index("players", IndexOptions::new().with_field("name"))
            .await
            .unwrap();

        let config = registry.get_index("players").unwrap();
        assert_eq!(config.format, "documents");
        assert_eq!(config.limit, 25);
        assert_eq!(backend.created.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_search_rejects_ill_typed_options() {
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(Arc::clone(&backend));

        registry
            .create_search_index("players", IndexOptions::new().using("mock"))
            .await
            .unwrap();

        let result = registry
            .search_with_value("players", "ada", json!({ "limit": "many" }), None)
            .await;

        assert!(matches!(
            result,
            Err(SearchIndexError::TypeConstraintViolation(_))
        ));
        assert!(backend.searches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_errors_pass_through() {
        let registry = registry_with(Arc::new(MockBackend::failing()));
        registry.store_index(IndexConfiguration::merged(
            "players",
            &IndexDefaults::default(),
            &IndexOptions::new().using("mock"),
        ));

        let result = registry.search("players", "ada", IndexOptions::new(), None).await;

        assert_eq!(result, Err(SearchIndexError::backend("Mock failure")));
    }

    #[tokio::test]
    async fn test_callback_reaches_backend() {
        let registry = registry_with(Arc::new(MockBackend::new()));
        registry
            .create_search_index("players", IndexOptions::new().using("mock"))
            .await
            .unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel();
        let callback: SearchCallback = Box::new(move |result| {
            let _ = tx.send(result);
        });

        let response = registry
            .search("players", "ada", IndexOptions::new(), Some(callback))
            .await
            .unwrap();

        assert_eq!(rx.await.unwrap(), Ok(response));
    }

    #[tokio::test]
    async fn test_searcher_accessors_and_facade() {
        let registry = registry_with(Arc::new(MockBackend::new()));

        let incomplete = SearcherMethods::new()
            .with_search(|_| Ok(SearchResponse::empty()))
            .with_create_search_index(|_, _| Ok(()));
        assert!(matches!(
            registry.create_searcher("k", incomplete),
            Err(SearchIndexError::TypeConstraintViolation(_))
        ));

        registry
            .create_searcher(
                "k",
                SearcherMethods::new()
                    .with_search(|_| Ok(SearchResponse::empty()))
                    .with_create_search_index(|_, _| Ok(()))
                    .with_default_query(|_, _| json!({}))
                    .with_default_sort(|_| json!({})),
            )
            .unwrap();

        assert!(registry.get_searcher("k").is_some());
        assert!(registry.get_searcher("mock").is_some());
        assert_eq!(registry.get_searchers().len(), 2);
    }

    #[test]
    fn test_config_placeholder_is_inert() {
        let registry = SearchIndexRegistry::new(Arc::new(BackendRegistry::new()));
        let mut new_config = Map::new();
        new_config.insert("anything".to_string(), json!(true));

        assert!(registry.config(&new_config).is_empty());
        assert!(registry.settings().persist_call_overrides);
    }

    #[test]
    fn test_strategies_are_usable_in_options() {
        let options = IndexOptions::new()
            .with_sort(SortStrategy::Static(json!({ "name": 1 })))
            .with_query(QueryBuilder::custom(|_, s| json!({ "q": s })));
        assert!(options.sort.is_some());
        assert!(options.query.is_some());
    }
}
