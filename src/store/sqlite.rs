//! SQLite-backed job store.
//!
//! Implements [`JobStore`] over a single `jobs` table. Keyword search is
//! case-insensitive substring matching on title, company, location and
//! description; title matches rank first. Case folding is Unicode-aware
//! through the `fold()` SQL function registered on every connection.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use hybrid_search::{Backend, Job, JobId, JobStore, SearchError};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};

use super::schema::apply_schema;
use crate::error::{JobtrackerError, Result};

/// Maximum ids bound into one `IN (...)` lookup.
const RESOLVE_CHUNK: usize = 500;

const JOB_COLUMNS: &str = "id, title, company, location, source, url, description";

/// A job listing to import; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Outcome of a batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// SQLite job store.
///
/// Thread-safe via an internal `Mutex<Connection>`. Async methods run the
/// query on the blocking pool.
#[derive(Clone)]
pub struct SqliteJobStore {
    path: Option<PathBuf>,
    conn: Arc<Mutex<Connection>>,
    search_limit: usize,
}

impl SqliteJobStore {
    /// Open (or create) the database at `path`, applying the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        register_functions(&conn)?;
        apply_schema(&conn)?;
        Ok(Self::from_connection(conn, Some(path.to_path_buf())))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        register_functions(&conn)?;
        apply_schema(&conn)?;
        Ok(Self::from_connection(conn, None))
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Self {
        Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
            search_limit: 200,
        }
    }

    /// Cap the number of rows a keyword search returns.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert jobs, skipping those with an empty URL or a URL already stored.
    ///
    /// Runs in one transaction.
    pub fn import(&self, jobs: &[NewJob]) -> Result<ImportReport> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut report = ImportReport::default();

        for job in jobs {
            let Some(url) = job.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
                tracing::debug!(title = %job.title, "skipping job without URL");
                report.skipped += 1;
                continue;
            };

            let existing: Option<JobId> = tx
                .query_row("SELECT id FROM jobs WHERE url = ?1", params![url], |row| {
                    row.get(0)
                })
                .optional()?;
            if existing.is_some() {
                tracing::debug!(url, "skipping duplicate job");
                report.skipped += 1;
                continue;
            }

            tx.execute(
                "INSERT INTO jobs (title, company, location, source, url, description) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    job.title,
                    job.company,
                    job.location,
                    job.source,
                    url,
                    job.description
                ],
            )?;
            report.inserted += 1;
        }

        tx.commit()?;
        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "job import finished"
        );
        Ok(report)
    }

    /// Blocking keyword search. See [`JobStore::search_by_text`].
    pub fn search_blocking(&self, query: &str) -> Result<Vec<Job>> {
        let conn = self.lock()?;
        search_jobs(&conn, query, self.search_limit)
    }

    /// Blocking full listing, ordered by id.
    pub fn list_all_blocking(&self) -> Result<Vec<Job>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"))?;
        let rows = stmt.query_map([], row_to_job)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Blocking lookup by id; unknown ids are omitted.
    pub fn resolve_blocking(&self, ids: &[JobId]) -> Result<Vec<Job>> {
        let conn = self.lock()?;
        let mut jobs = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(RESOLVE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE id IN ({placeholders})"
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_job)?;
            for row in rows {
                jobs.push(row?);
            }
        }
        Ok(jobs)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| JobtrackerError::Lock(e.to_string()))
    }

    /// Run a blocking store call on the blocking pool.
    async fn blocking<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteJobStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || call(&store))
            .await
            .map_err(|e| JobtrackerError::Task(e.to_string()))?
    }
}

impl JobStore for SqliteJobStore {
    async fn search_by_text(&self, query: &str) -> std::result::Result<Vec<Job>, SearchError> {
        let query = query.to_owned();
        self.blocking(move |store| store.search_blocking(&query))
            .await
            .map_err(|e| SearchError::unavailable(Backend::Lexical, e.to_string()))
    }

    async fn list_all(&self) -> std::result::Result<Vec<Job>, SearchError> {
        self.blocking(SqliteJobStore::list_all_blocking)
            .await
            .map_err(|e| SearchError::unavailable(Backend::Lexical, e.to_string()))
    }

    async fn resolve(&self, ids: &[JobId]) -> std::result::Result<Vec<Job>, SearchError> {
        let ids = ids.to_vec();
        self.blocking(move |store| store.resolve_blocking(&ids))
            .await
            .map_err(|e| SearchError::Resolution(e.to_string()))
    }
}

/// Register `fold(text)`: Unicode lowercase, `NULL` stays `NULL`.
///
/// SQLite's own `LIKE` and `lower()` only fold ASCII letters.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold(&t)))
        },
    )
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn search_jobs(conn: &Connection, query: &str, limit: usize) -> Result<Vec<Job>> {
    let needle = fold(query.trim());
    let sql = format!(
        "SELECT {JOB_COLUMNS} FROM jobs
          WHERE instr(fold(title), ?1) > 0
             OR instr(fold(company), ?1) > 0
             OR instr(fold(location), ?1) > 0
             OR instr(fold(description), ?1) > 0
          ORDER BY CASE
                     WHEN instr(fold(title), ?1) > 0 THEN 0
                     WHEN instr(fold(company), ?1) > 0 THEN 1
                     WHEN instr(fold(location), ?1) > 0 THEN 2
                     ELSE 3
                   END,
                   id
          LIMIT ?2"
    );
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![needle, limit], row_to_job)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        location: row.get(3)?,
        source: row.get(4)?,
        url: row.get(5)?,
        description: row.get(6)?,
    })
}
