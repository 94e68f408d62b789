//! Interface definitions for search backends.
//!
//! This module defines the abstract `SearchBackend` trait that every
//! pluggable engine implements to be registered under a backend kind.

mod search_backend;

pub use search_backend::{SearchBackend, SearchCallback};
