//! Semantic adapter and the HTTP client for the similarity service.
//!
//! The service is addressed as `POST {base}/rag/search_only` with a JSON body
//! `{"query": "...", "k": 20}` and answers
//! `{"results": [{"job_id": 12, "match_score": 0.31, ...}, ...]}`.
//! `id` and `score` are accepted in place of `job_id` and `match_score`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::SemanticBackend;
use crate::error::SearchError;
use crate::types::{Backend, CandidateList, JobId, Query, SemanticHit};

use super::http;

/// Path of the retrieval-only endpoint, relative to the service base URL.
const SEARCH_PATH: &str = "rag/search_only";

/// Bounds a [`SemanticBackend`] call by top-K and a timeout and converts
/// its hits into a [`CandidateList`].
pub struct SemanticSearchAdapter<B> {
    backend: B,
    top_k: usize,
    timeout: Duration,
}

impl<B: SemanticBackend> SemanticSearchAdapter<B> {
    pub fn new(backend: B, top_k: usize, timeout: Duration) -> Self {
        Self {
            backend,
            top_k,
            timeout,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve up to `top_k` candidates for `query`, most similar first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] on transport failure,
    /// non-success status, malformed response, or timeout.
    pub async fn search(&self, query: &Query) -> Result<CandidateList, SearchError> {
        let hits = tokio::time::timeout(self.timeout, self.backend.search(query.as_str(), self.top_k))
            .await
            .map_err(|_| {
                SearchError::unavailable(
                    Backend::Semantic,
                    format!("timed out after {}ms", self.timeout.as_millis()),
                )
            })??;

        Ok(CandidateList::from_ids(
            hits.into_iter().take(self.top_k).map(|hit| hit.id),
        ))
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WireHit>,
}

#[derive(Debug, Deserialize)]
struct WireHit {
    #[serde(default, alias = "id")]
    job_id: Option<WireId>,
    #[serde(default, alias = "score")]
    match_score: f64,
}

/// Vector-store metadata sometimes carries ids as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(JobId),
    Text(String),
}

impl WireId {
    fn to_job_id(&self) -> Option<JobId> {
        match self {
            Self::Int(id) => Some(*id),
            Self::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

/// [`SemanticBackend`] speaking JSON over HTTP to the similarity service.
#[derive(Debug, Clone)]
pub struct HttpSemanticBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSemanticBackend {
    /// Build a backend for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `base_url` is not a valid URL, or
    /// [`SearchError::BackendUnavailable`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| SearchError::Config(format!("invalid semantic_url: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(SEARCH_PATH)
            .map_err(|e| SearchError::Config(format!("invalid semantic_url: {e}")))?;

        Ok(Self {
            client: http::build_client(timeout)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SemanticBackend for HttpSemanticBackend {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SemanticHit>, SearchError> {
        tracing::trace!(query, top_k, "semantic search");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&SearchRequest { query, k: top_k })
            .send()
            .await
            .map_err(|e| SearchError::unavailable(Backend::Semantic, format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::unavailable(Backend::Semantic, format!("HTTP error: {e}")))?;

        let body: SearchResponse = response.json().await.map_err(|e| {
            SearchError::unavailable(Backend::Semantic, format!("malformed response: {e}"))
        })?;

        let total = body.results.len();
        let hits: Vec<SemanticHit> = body
            .results
            .iter()
            .filter_map(|hit| {
                let id = hit.job_id.as_ref()?.to_job_id()?;
                Some(SemanticHit {
                    id,
                    score: hit.match_score,
                })
            })
            .collect();

        if hits.len() < total {
            tracing::debug!(
                skipped = total - hits.len(),
                "semantic hits without a usable job id"
            );
        }
        Ok(hits)
    }
}
