//! Backend registry implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::backends::methods::SearcherMethods;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchBackend;

/// Registry of every search backend, keyed by backend kind.
///
/// Backends are registered once at startup and never removed. Registering a
/// kind again replaces the previous backend.
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<BTreeMap<String, Arc<dyn SearchBackend>>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend implementation under `kind`.
    pub fn register_backend(&self, kind: impl Into<String>, backend: Arc<dyn SearchBackend>) {
        let kind = kind.into();
        let replaced = self.backends.write().insert(kind.clone(), backend);

        if replaced.is_some() {
            warn!(backend = %kind, "Replaced previously registered search backend");
        } else {
            info!(backend = %kind, "Registered search backend");
        }
    }

    /// Register a function bundle under `kind`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If all four methods were supplied
    /// * `Err(SearchIndexError::TypeConstraintViolation)` - If any method is missing;
    ///   nothing is registered in that case
    pub fn create_searcher(
        &self,
        kind: &str,
        methods: SearcherMethods,
    ) -> Result<(), SearchIndexError> {
        let backend = methods.into_backend()?;
        self.register_backend(kind, Arc::new(backend));
        Ok(())
    }

    /// Look up the backend registered under `kind`.
    pub fn get_searcher(&self, kind: &str) -> Option<Arc<dyn SearchBackend>> {
        self.backends.read().get(kind).cloned()
    }

    /// Snapshot of every registered backend.
    pub fn get_searchers(&self) -> BTreeMap<String, Arc<dyn SearchBackend>> {
        self.backends.read().clone()
    }
}
