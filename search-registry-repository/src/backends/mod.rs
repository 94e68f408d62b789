//! Backend registry.
//!
//! Maps backend-kind names to the engines serving them. Backends register
//! either as a `SearchBackend` implementation or as a bundle of four
//! functions (`SearcherMethods`).

mod methods;
mod registry;

pub use methods::{
    CreateIndexMethod, DefaultQueryMethod, DefaultSortMethod, SearchInvocation, SearchMethod,
    SearcherMethods,
};
pub use registry::BackendRegistry;
