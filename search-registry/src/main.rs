//! Search Registry Main Entry Point
//!
//! Declares the configured indexes, runs one search and prints the response.
//!
//! Usage: `search-registry <index> <search-string> [options-json]`

use dotenv::dotenv;
use search_registry::{Dependencies, RegistryAppError};
use serde_json::Value;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage: search-registry <index> <search-string> [options-json]";

/// Initialize tracing/logging.
///
/// Logs go to stderr so stdout only carries the search response.
fn init_tracing() -> Result<(), RegistryAppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("search_registry=info,search_registry_repository=info"));

    let json_output = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| RegistryAppError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "search-registry",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| RegistryAppError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "search-registry",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

/// Command line arguments.
struct Args {
    index: String,
    search_string: String,
    options: Value,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, RegistryAppError> {
        let index = args.next().ok_or_else(|| RegistryAppError::config(USAGE))?;
        let search_string = args.next().ok_or_else(|| RegistryAppError::config(USAGE))?;
        let options = match args.next() {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Value::Object(serde_json::Map::new()),
        };

        if args.next().is_some() {
            return Err(RegistryAppError::config(USAGE));
        }

        Ok(Self {
            index,
            search_string,
            options,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), RegistryAppError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    let args = Args::parse(env::args().skip(1))?;

    info!("Starting search registry");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!(
                indexes = deps.registry.get_indexes().len(),
                "Dependencies initialized successfully"
            );
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let response = match deps
        .registry
        .search_with_value(&args.index, &args.search_string, args.options, None)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!(index = %args.index, error = %e, code = e.code(), "Search failed");
            return Err(e.into());
        }
    };

    info!(
        index = %args.index,
        returned = response.len(),
        total = response.total,
        "Search completed"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
