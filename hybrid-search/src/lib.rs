//! # hybrid-search
//!
//! Hybrid job search: keyword matching against the relational job store
//! combined with similarity search from a remote semantic service.
//!
//! ## Design
//!
//! - Queries the lexical and semantic backends concurrently
//! - Merges the two rankings with Reciprocal Rank Fusion (`1 / (k + rank + 1)`)
//! - Resolves fused ids back to job records, dropping ids that no longer exist
//! - Graceful degradation: a failing semantic backend only costs ranking
//!   quality; the lexical ranking is always returned
//! - A circuit breaker skips a repeatedly failing semantic backend for a while
//!
//! ## Failure tiers
//!
//! Lexical search is authoritative. If it fails, the search fails.
//! Semantic search, fusion and resolution of semantic-only ids are
//! best-effort enhancements layered on top.
//!
//! ## Privacy
//!
//! Query text is logged at trace level only and never appears in errors.

pub mod adapters;
pub mod backend;
pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;

pub use adapters::HttpSemanticBackend;
pub use backend::{JobStore, SemanticBackend};
pub use config::HybridSearchConfig;
pub use error::{Result, SearchError};
pub use orchestrator::{HybridOutcome, HybridSearchOrchestrator, Ranking};
pub use types::{Backend, CandidateList, Job, JobId, Query, ScoredId, SemanticHit};

/// Build an orchestrator that talks to the semantic service over HTTP.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example<S: hybrid_search::JobStore>(store: S) -> hybrid_search::Result<()> {
/// let config = hybrid_search::HybridSearchConfig::default();
/// let search = hybrid_search::with_http_semantic(store, &config)?;
/// for job in search.hybrid_search("rust engineer").await? {
///     println!("{}: {}", job.title, job.company);
/// }
/// # Ok(())
/// # }
/// ```
pub fn with_http_semantic<S: JobStore>(
    store: S,
    config: &HybridSearchConfig,
) -> Result<HybridSearchOrchestrator<S, HttpSemanticBackend>> {
    config.validate()?;
    let semantic = HttpSemanticBackend::new(&config.semantic_url, config.semantic_timeout())?;
    HybridSearchOrchestrator::new(store, semantic, config)
}
