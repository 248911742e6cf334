//! Jobtracker search host.
//!
//! Wires the [`hybrid_search`] pipeline to a SQLite job store and a remote
//! semantic service:
//!
//! - **Store**: job listings in SQLite, keyword search and id lookups
//! - **Config**: TOML file with defaults for every field
//! - **Search**: lexical and semantic rankings fused with RRF, degrading to
//!   keyword-only results when the semantic service is unavailable

pub mod config;
pub mod error;
pub mod store;

use hybrid_search::{HttpSemanticBackend, HybridSearchOrchestrator};

use crate::config::AppConfig;
use crate::error::Result;
use crate::store::SqliteJobStore;

/// The orchestrator type the host runs.
pub type JobSearch = HybridSearchOrchestrator<SqliteJobStore, HttpSemanticBackend>;

/// Open the job store named by `config`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(config: &AppConfig) -> Result<SqliteJobStore> {
    Ok(SqliteJobStore::open(&config.database_path)?.with_search_limit(config.lexical_limit))
}

/// Build the hybrid search pipeline over `store`.
///
/// # Errors
///
/// Returns an error if the search settings are invalid.
pub fn build_search(store: SqliteJobStore, config: &AppConfig) -> Result<JobSearch> {
    Ok(hybrid_search::with_http_semantic(store, &config.search)?)
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
