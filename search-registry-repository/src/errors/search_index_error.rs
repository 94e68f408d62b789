//! Search index error types.
//!
//! This module defines the unified error type for registry operations, covering
//! malformed caller input, dispatch failures and errors reported by backends.

use thiserror::Error;

/// Unified errors from search registry operations.
///
/// Used by the `SearchBackend` trait and `SearchIndexRegistry` for every
/// operation. Backend errors pass through the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchIndexError {
    /// Malformed caller input (wrong shape or type for an option or member).
    #[error("Type constraint violation: {0}")]
    TypeConstraintViolation(String),

    /// The index configuration names a backend kind that is not registered.
    #[error("Couldn't search with the backend kind '{kind}': no such backend is registered")]
    UnknownBackend { kind: String },

    /// No index has been declared under the requested name.
    #[error("Unknown search index: {0}")]
    UnknownIndex(String),

    /// A backend failed to provision an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// A backend could not evaluate a query.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Any other backend failure.
    #[error("Backend error: {0}")]
    BackendError(String),
}

impl SearchIndexError {
    /// Create a type constraint violation.
    pub fn type_constraint(msg: impl Into<String>) -> Self {
        Self::TypeConstraintViolation(msg.into())
    }

    /// Create an unknown backend error.
    pub fn unknown_backend(kind: impl Into<String>) -> Self {
        Self::UnknownBackend { kind: kind.into() }
    }

    /// Create an unknown index error.
    pub fn unknown_index(name: impl Into<String>) -> Self {
        Self::UnknownIndex(name.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a generic backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendError(msg.into())
    }

    /// Diagnostic code surfaced to callers, HTTP-style.
    pub fn code(&self) -> u16 {
        match self {
            Self::TypeConstraintViolation(_) => 400,
            Self::UnknownIndex(_) => 404,
            Self::UnknownBackend { .. }
            | Self::IndexCreationError(_)
            | Self::QueryError(_)
            | Self::BackendError(_) => 500,
        }
    }
}
