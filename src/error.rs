//! Error types for the jobtracker host.

/// Errors raised while configuring the host or accessing the job store.
#[derive(Debug, thiserror::Error)]
pub enum JobtrackerError {
    /// Configuration could not be read, parsed or validated.
    #[error("config error: {0}")]
    Config(String),

    /// SQLite error from the job store.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The store connection mutex was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    Lock(String),

    /// A blocking store task was cancelled or panicked.
    #[error("store task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An import file is not a JSON array of job listings.
    #[error("invalid import file: {0}")]
    Import(#[from] serde_json::Error),

    /// Search pipeline error.
    #[error(transparent)]
    Search(#[from] hybrid_search::SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, JobtrackerError>;
