//! # Search Registry
//!
//! Driver for the pluggable search registry. It wires the backend registry,
//! the in-memory reference backend and the index registry together from
//! environment configuration, declares the configured indexes and runs
//! searches against them.
//!
//! ## Modules
//!
//! - [`config`]: Environment settings and dependency initialization

pub mod config;

pub use config::{Dependencies, Settings};

use search_registry_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during driver initialization or execution.
#[derive(Error, Debug)]
pub enum RegistryAppError {
    /// Configuration error (environment, fixture files, command line).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reported by the registry or a backend.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// Error reading a fixture file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed JSON in a fixture file or on the command line.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RegistryAppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
