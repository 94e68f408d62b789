//! # Search Registry Repository
//!
//! This crate provides the pluggable search layer: a registry of search
//! backends keyed by kind, a registry of named index configurations, and the
//! dispatcher that merges options, checks permission and forwards searches to
//! the right backend. It also ships an in-memory reference backend.

pub mod backends;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod service;
pub mod strategies;
pub mod types;
pub mod utils;

pub use backends::{BackendRegistry, SearchInvocation, SearcherMethods};
pub use config::SearchRegistryConfig;
pub use errors::SearchIndexError;
pub use interfaces::{SearchBackend, SearchCallback};
pub use memory::InMemoryBackend;
pub use service::SearchIndexRegistry;
pub use strategies::{PermissionPredicate, QueryBuilder, SortStrategy};
pub use types::{IndexConfiguration, IndexDefaults, IndexOptions};
pub use utils::json_type_name;

pub use search_registry_shared::{FieldSelection, SearchResponse};
