//! In-memory reference backend.

pub mod backend;
mod selector;

pub use backend::{InMemoryBackend, COLLECTION_KEY};
