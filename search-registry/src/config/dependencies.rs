//! Dependency initialization and wiring for the search registry.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::RegistryAppError;
use search_registry_repository::types::DEFAULT_BACKEND_KIND;
use search_registry_repository::{
    BackendRegistry, InMemoryBackend, IndexDefaults, SearchIndexRegistry, SearchRegistryConfig,
};

/// Backend kind the in-memory reference backend is registered under.
pub const MEMORY_BACKEND_KIND: &str = DEFAULT_BACKEND_KIND;

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Template every declared index starts from.
    pub defaults: IndexDefaults,
    /// Whether search options are written back into the index.
    pub persist_call_overrides: bool,
    /// JSON object of `index name -> options` declared at startup.
    pub indexes_file: Option<PathBuf>,
    /// JSON object of `collection -> [documents]` loaded into the in-memory backend.
    pub documents_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let registry = SearchRegistryConfig::default();
        Self {
            defaults: registry.defaults,
            persist_call_overrides: registry.persist_call_overrides,
            indexes_file: None,
            documents_file: None,
        }
    }
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_DEFAULT_BACKEND`: Default backend kind (default: minimongo)
    /// - `SEARCH_DEFAULT_FORMAT`: Default output format (default: mongo)
    /// - `SEARCH_DEFAULT_LIMIT`: Default result cap, a positive integer (default: 10)
    /// - `SEARCH_PERSIST_CALL_OVERRIDES`: "true" or "false" (default: true)
    /// - `SEARCH_INDEXES_FILE`: Path to the index declarations (optional)
    /// - `SEARCH_DOCUMENTS_FILE`: Path to the in-memory documents (optional)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = Self::default();

        let limit = match lookup("SEARCH_DEFAULT_LIMIT") {
            None => fallback.defaults.limit,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    warn!(
                        value = %raw,
                        "Invalid SEARCH_DEFAULT_LIMIT, defaulting to {}",
                        fallback.defaults.limit
                    );
                    fallback.defaults.limit
                }
            },
        };

        let persist_call_overrides = match lookup("SEARCH_PERSIST_CALL_OVERRIDES") {
            None => fallback.persist_call_overrides,
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    warn!(
                        value = %raw,
                        "Invalid SEARCH_PERSIST_CALL_OVERRIDES, defaulting to {}",
                        fallback.persist_call_overrides
                    );
                    fallback.persist_call_overrides
                }
            },
        };

        Self {
            defaults: IndexDefaults {
                format: lookup("SEARCH_DEFAULT_FORMAT").unwrap_or(fallback.defaults.format),
                limit,
                backend_kind: lookup("SEARCH_DEFAULT_BACKEND")
                    .unwrap_or(fallback.defaults.backend_kind),
            },
            persist_call_overrides,
            indexes_file: lookup("SEARCH_INDEXES_FILE").map(PathBuf::from),
            documents_file: lookup("SEARCH_DOCUMENTS_FILE").map(PathBuf::from),
        }
    }

    fn registry_config(&self) -> SearchRegistryConfig {
        SearchRegistryConfig {
            defaults: self.defaults.clone(),
            persist_call_overrides: self.persist_call_overrides,
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The index registry, with every configured index declared.
    pub registry: SearchIndexRegistry,
    /// The in-memory backend registered under [`MEMORY_BACKEND_KIND`].
    pub documents: Arc<InMemoryBackend>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    pub async fn new() -> Result<Self, RegistryAppError> {
        Self::from_settings(Settings::from_env()).await
    }

    /// Initialize all dependencies from explicit settings.
    ///
    /// Documents are loaded before indexes are declared, so an index whose
    /// collection was preloaded keeps its documents.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(RegistryAppError)` - If a fixture file is unreadable or malformed,
    ///   or an index declaration is rejected
    pub async fn from_settings(settings: Settings) -> Result<Self, RegistryAppError> {
        info!(
            default_backend = %settings.defaults.backend_kind,
            default_format = %settings.defaults.format,
            default_limit = settings.defaults.limit,
            persist_call_overrides = settings.persist_call_overrides,
            "Initializing dependencies"
        );

        let backends = Arc::new(BackendRegistry::new());
        let documents = Arc::new(InMemoryBackend::new());
        backends.register_backend(MEMORY_BACKEND_KIND, documents.clone());

        if let Some(path) = &settings.documents_file {
            Self::load_documents(&documents, path).await?;
        }

        let registry = SearchIndexRegistry::with_config(backends, settings.registry_config());

        if let Some(path) = &settings.indexes_file {
            Self::declare_indexes(&registry, path).await?;
        }

        Ok(Self {
            registry,
            documents,
        })
    }

    /// Load `collection -> [documents]` into the in-memory backend.
    async fn load_documents(backend: &InMemoryBackend, path: &Path) -> Result<(), RegistryAppError> {
        let collections = read_json_object(path).await?;

        for (collection, docs) in collections {
            match docs {
                Value::Array(docs) => backend.insert_documents(&collection, docs),
                other => {
                    return Err(RegistryAppError::config(format!(
                        "documents for collection '{}' in {} must be an array, got {}",
                        collection,
                        path.display(),
                        search_registry_repository::json_type_name(&other)
                    )))
                }
            }
        }

        let collections = backend.collection_names();
        let documents: usize = collections
            .iter()
            .filter_map(|collection| backend.document_count(collection))
            .sum();
        info!(path = %path.display(), ?collections, documents, "Loaded documents");
        Ok(())
    }

    /// Declare every `name -> options` entry of the index file.
    async fn declare_indexes(
        registry: &SearchIndexRegistry,
        path: &Path,
    ) -> Result<(), RegistryAppError> {
        let declarations = read_json_object(path).await?;
        let count = declarations.len();

        for (name, options) in declarations {
            registry.create_search_index_from_value(&name, options).await?;
        }

        info!(path = %path.display(), indexes = count, "Declared search indexes");
        Ok(())
    }
}

async fn read_json_object(path: &Path) -> Result<serde_json::Map<String, Value>, RegistryAppError> {
    let contents = tokio::fs::read_to_string(path).await?;

    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        other => Err(RegistryAppError::config(format!(
            "{} must contain a JSON object, got {}",
            path.display(),
            search_registry_repository::json_type_name(&other)
        ))),
    }
}
