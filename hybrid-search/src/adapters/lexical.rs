//! Lexical adapter over the relational [`JobStore`].

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use crate::backend::JobStore;
use crate::error::SearchError;
use crate::types::{Backend, CandidateList, Job, Query};

/// Result of a lexical search: the ranked ids plus the records the store
/// already returned for them, in the same order.
#[derive(Debug, Clone, Default)]
pub struct LexicalHits {
    pub candidates: CandidateList,
    pub records: Vec<Job>,
}

impl LexicalHits {
    fn from_records(records: Vec<Job>) -> Self {
        let mut seen = HashSet::new();
        let records: Vec<Job> = records.into_iter().filter(|job| seen.insert(job.id)).collect();
        let candidates = CandidateList::from_ids(records.iter().map(|job| job.id));
        Self {
            candidates,
            records,
        }
    }
}

/// Runs keyword search against a [`JobStore`] under a timeout.
///
/// The store is the authoritative baseline: its failures are reported as
/// [`SearchError::BackendUnavailable`] with [`Backend::Lexical`] and are not
/// recovered by the orchestrator.
pub struct LexicalSearchAdapter<S> {
    store: S,
    timeout: Duration,
}

impl<S: JobStore> LexicalSearchAdapter<S> {
    pub fn new(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// The wrapped store, for listing and bulk resolution.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Search the store for `query`. The caller guarantees `query` is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] if the store fails or does
    /// not answer within the timeout.
    pub async fn search(&self, query: &Query) -> Result<LexicalHits, SearchError> {
        let records = self.bounded(self.store.search_by_text(query.as_str())).await?;
        Ok(LexicalHits::from_records(records))
    }

    /// Every stored job, unranked. Used for blank queries.
    ///
    /// # Errors
    ///
    /// Same as [`LexicalSearchAdapter::search`].
    pub async fn list_all(&self) -> Result<Vec<Job>, SearchError> {
        self.bounded(self.store.list_all()).await
    }

    async fn bounded<F>(&self, call: F) -> Result<Vec<Job>, SearchError>
    where
        F: Future<Output = Result<Vec<Job>, SearchError>>,
    {
        let outcome = tokio::time::timeout(self.timeout, call).await.map_err(|_| {
            SearchError::unavailable(
                Backend::Lexical,
                format!("timed out after {}ms", self.timeout.as_millis()),
            )
        })?;

        outcome.map_err(|err| match err {
            SearchError::BackendUnavailable { .. } => err,
            other => SearchError::unavailable(Backend::Lexical, other.to_string()),
        })
    }
}
