//! Relational job store.
//!
//! Jobs live in a single SQLite table. [`SqliteJobStore`] serves keyword
//! search and id lookups to the hybrid search pipeline and accepts batch
//! imports.

mod schema;
mod sqlite;

pub use sqlite::{ImportReport, NewJob, SqliteJobStore};

use std::path::Path;

use crate::error::Result;

/// Read an import file: a JSON array of job listings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of jobs.
pub fn read_import_file(path: &Path) -> Result<Vec<NewJob>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
