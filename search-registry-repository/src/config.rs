//! Configuration types for the SearchIndexRegistry.

use crate::types::IndexDefaults;

/// Configuration for the SearchIndexRegistry.
///
/// Holds the default template new indexes start from and decides what happens
/// to per-call search options once a search has run.
#[derive(Debug, Clone)]
pub struct SearchRegistryConfig {
    /// Template every declared index is merged onto.
    pub defaults: IndexDefaults,

    /// Whether options passed to a search are written back into the stored
    /// index configuration.
    ///
    /// When `true` (the default) a search permanently reconfigures its index:
    /// later searches observe the overrides of earlier ones. When `false`
    /// every search merges into a private snapshot that is discarded afterwards.
    pub persist_call_overrides: bool,
}

impl Default for SearchRegistryConfig {
    fn default() -> Self {
        Self {
            defaults: IndexDefaults::default(),
            persist_call_overrides: true,
        }
    }
}

impl SearchRegistryConfig {
    /// Create a config with a custom default template.
    ///
    /// # Arguments
    ///
    /// * `defaults` - Template new indexes are merged onto
    pub fn with_defaults(defaults: IndexDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Create a config where search options never outlive their call.
    pub fn snapshot_call_overrides() -> Self {
        Self {
            persist_call_overrides: false,
            ..Self::default()
        }
    }
}
