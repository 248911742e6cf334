//! Hybrid search configuration with sensible defaults.
//!
//! [`HybridSearchConfig`] controls the semantic endpoint, per-backend
//! timeouts, the top-K bound for semantic retrieval, the RRF smoothing
//! constant, and the semantic circuit breaker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::SearchError;

/// Configuration for a hybrid search orchestrator.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides. Missing fields in a TOML table fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridSearchConfig {
    /// Base URL of the semantic search service.
    pub semantic_url: String,
    /// Maximum number of candidates requested from the semantic backend.
    pub top_k: usize,
    /// RRF smoothing constant `k`. Larger values flatten the rank curve.
    pub rrf_k: u32,
    /// Timeout enforced by the lexical adapter, in milliseconds.
    pub lexical_timeout_ms: u64,
    /// Timeout enforced by the semantic adapter, in milliseconds.
    pub semantic_timeout_ms: u64,
    /// Failure gate for the semantic backend.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        Self {
            semantic_url: "http://localhost:5000".into(),
            top_k: 20,
            rrf_k: 60,
            lexical_timeout_ms: 5_000,
            semantic_timeout_ms: 3_000,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl HybridSearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `top_k` must be greater than 0
    /// - `rrf_k` must be greater than 0
    /// - both timeouts must be greater than 0
    /// - `semantic_url` must be an absolute http(s) URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.top_k == 0 {
            return Err(SearchError::Config("top_k must be greater than 0".into()));
        }
        if self.rrf_k == 0 {
            return Err(SearchError::Config("rrf_k must be greater than 0".into()));
        }
        if self.lexical_timeout_ms == 0 {
            return Err(SearchError::Config(
                "lexical_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.semantic_timeout_ms == 0 {
            return Err(SearchError::Config(
                "semantic_timeout_ms must be greater than 0".into(),
            ));
        }
        let url = url::Url::parse(&self.semantic_url)
            .map_err(|e| SearchError::Config(format!("invalid semantic_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchError::Config(
                "semantic_url must use http or https".into(),
            ));
        }
        Ok(())
    }

    pub fn lexical_timeout(&self) -> Duration {
        Duration::from_millis(self.lexical_timeout_ms)
    }

    pub fn semantic_timeout(&self) -> Duration {
        Duration::from_millis(self.semantic_timeout_ms)
    }
}
