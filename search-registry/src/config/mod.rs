//! Configuration for the search registry driver.

mod dependencies;

pub use dependencies::{Dependencies, Settings, MEMORY_BACKEND_KIND};
