//! Hybrid search orchestrator: concurrent fan-out, degradation, fusion, resolution.
//!
//! Runs the lexical and semantic adapters concurrently, treats a semantic
//! failure as an empty ranking, fuses the two rankings with RRF, and maps
//! the fused ids back to job records.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::adapters::{LexicalHits, LexicalSearchAdapter, SemanticSearchAdapter};
use crate::backend::{JobStore, SemanticBackend};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::HybridSearchConfig;
use crate::error::SearchError;
use crate::types::{Backend, CandidateList, Job, Query, ScoredId};

use super::resolve::resolve_fused;
use super::rrf;

/// How the records of a [`HybridOutcome`] were ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Blank query: every job, unranked.
    ListAll,
    /// No semantic candidates: lexical order.
    Lexical,
    /// Lexical and semantic rankings fused with RRF.
    Fused,
    /// Fusion or resolution failed: lexical order.
    LexicalFallback,
}

/// Records returned by a hybrid search together with how they were ranked.
#[derive(Debug, Clone)]
pub struct HybridOutcome {
    pub records: Vec<Job>,
    pub ranking: Ranking,
}

/// Fans a query out to a [`JobStore`] and a [`SemanticBackend`] and merges
/// the results.
///
/// Lexical search is the baseline and its failure fails the search.
/// Semantic search is an enrichment: its failure, timeout, or an open
/// circuit only degrades the ranking to lexical order.
pub struct HybridSearchOrchestrator<S, B> {
    lexical: LexicalSearchAdapter<S>,
    semantic: SemanticSearchAdapter<B>,
    rrf_k: u32,
    breaker: Mutex<CircuitBreaker>,
}

impl<S: JobStore, B: SemanticBackend> HybridSearchOrchestrator<S, B> {
    /// Build an orchestrator over `store` and `semantic`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(store: S, semantic: B, config: &HybridSearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            lexical: LexicalSearchAdapter::new(store, config.lexical_timeout()),
            semantic: SemanticSearchAdapter::new(semantic, config.top_k, config.semantic_timeout()),
            rrf_k: config.rrf_k,
            breaker: Mutex::new(CircuitBreaker::new(config.circuit_breaker.clone())),
        })
    }

    /// The underlying job store.
    pub fn store(&self) -> &S {
        self.lexical.store()
    }

    /// Search for `query` and return matching jobs, best first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] for the lexical backend
    /// only. Semantic and fusion failures degrade silently.
    pub async fn hybrid_search(&self, query: &str) -> Result<Vec<Job>, SearchError> {
        self.search_detailed(query).await.map(|outcome| outcome.records)
    }

    /// Like [`hybrid_search`](Self::hybrid_search), also reporting which
    /// ranking path produced the records.
    ///
    /// # Errors
    ///
    /// Same as [`hybrid_search`](Self::hybrid_search).
    pub async fn search_detailed(&self, query: &str) -> Result<HybridOutcome, SearchError> {
        let query = Query::new(query);
        if query.is_blank() {
            let records = self.lexical.list_all().await?;
            tracing::debug!(count = records.len(), "blank query, listing all jobs");
            return Ok(HybridOutcome {
                records,
                ranking: Ranking::ListAll,
            });
        }
        tracing::trace!(query = %query, "hybrid search");

        let attempt_semantic = self.lock_breaker().should_attempt(Backend::Semantic);
        let (lexical, semantic) = futures::future::join(
            self.lexical.search(&query),
            self.semantic_candidates(&query, attempt_semantic),
        )
        .await;

        let lexical = lexical?;
        tracing::debug!(
            lexical = lexical.candidates.len(),
            semantic = semantic.len(),
            "backend candidates"
        );

        if semantic.is_empty() {
            return Ok(HybridOutcome {
                records: lexical.records,
                ranking: Ranking::Lexical,
            });
        }

        match self.fuse_and_resolve(&lexical, &semantic).await {
            Ok(records) => Ok(HybridOutcome {
                records,
                ranking: Ranking::Fused,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "fusion failed, returning lexical order");
                Ok(HybridOutcome {
                    records: lexical.records,
                    ranking: Ranking::LexicalFallback,
                })
            }
        }
    }

    /// Semantic candidates, or an empty list when the backend is skipped or fails.
    async fn semantic_candidates(&self, query: &Query, attempt: bool) -> CandidateList {
        if !attempt {
            tracing::debug!("semantic circuit open, skipping");
            return CandidateList::empty();
        }

        match self.semantic.search(query).await {
            Ok(candidates) => {
                self.lock_breaker().record_success(Backend::Semantic);
                candidates
            }
            Err(err) => {
                tracing::warn!(error = %err, "semantic search failed, degrading to lexical");
                self.lock_breaker().record_failure(Backend::Semantic);
                CandidateList::empty()
            }
        }
    }

    async fn fuse_and_resolve(
        &self,
        lexical: &LexicalHits,
        semantic: &CandidateList,
    ) -> Result<Vec<Job>, SearchError> {
        let fused = rrf::fuse(&lexical.candidates, semantic, self.rrf_k);
        ensure_finite(&fused)?;
        resolve_fused(self.lexical.store(), &fused, &lexical.records).await
    }

    fn lock_breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        // The breaker holds plain counters; a panic mid-update leaves them usable.
        self.breaker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reject a fused ranking containing a NaN or infinite score.
///
/// With a validated `k >= 1` every RRF term lies in `(0, 1)`, so this only
/// trips if the fuser itself is broken.
fn ensure_finite(fused: &[ScoredId]) -> Result<(), SearchError> {
    match fused.iter().find(|s| !s.score.is_finite()) {
        Some(bad) => Err(SearchError::Fusion(format!(
            "non-finite score for job {}",
            bad.id
        ))),
        None => Ok(()),
    }
}
