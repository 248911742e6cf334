//! Collaborator traits the orchestrator ranks over.
//!
//! [`JobStore`] is the relational side: keyword search, full listing and
//! bulk lookup by id. [`SemanticBackend`] is the remote similarity service.
//! Both must be `Send + Sync` so the two searches can run concurrently.

use std::future::Future;

use crate::error::SearchError;
use crate::types::{Job, JobId, SemanticHit};

/// The relational job store.
pub trait JobStore: Send + Sync {
    /// Keyword/substring search, best match first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the store cannot be queried.
    fn search_by_text(&self, query: &str)
        -> impl Future<Output = Result<Vec<Job>, SearchError>> + Send;

    /// Every job, in no particular ranking.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Job>, SearchError>> + Send;

    /// Look up jobs by id. Ids without a stored job are omitted; the
    /// returned order is unspecified.
    fn resolve(&self, ids: &[JobId]) -> impl Future<Output = Result<Vec<Job>, SearchError>> + Send;
}

/// A remote semantic search service.
pub trait SemanticBackend: Send + Sync {
    /// Return at most `top_k` hits, most similar first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] on transport failure,
    /// timeout, or a non-success response. Implementations must not retry.
    fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> impl Future<Output = Result<Vec<SemanticHit>, SearchError>> + Send;
}
