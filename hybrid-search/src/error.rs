//! Error types for the hybrid-search crate.
//!
//! Display strings are stable and never contain query text.

use crate::types::Backend;

/// Errors that can occur during a hybrid search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A ranking backend could not be reached, timed out, or answered with
    /// a non-success status.
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: Backend, reason: String },

    /// Bulk lookup of fused ids back to job records failed.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Rank fusion produced an unusable ranking.
    #[error("fusion error: {0}")]
    Fusion(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Shorthand for [`SearchError::BackendUnavailable`].
    pub fn unavailable(backend: Backend, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Returns the backend this error refers to, if any.
    pub fn backend(&self) -> Option<Backend> {
        match self {
            Self::BackendUnavailable { backend, .. } => Some(*backend),
            _ => None,
        }
    }
}

/// Convenience type alias for hybrid-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_backend_unavailable() {
        let err = SearchError::unavailable(Backend::Semantic, "connection refused");
        assert_eq!(
            err.to_string(),
            "semantic backend unavailable: connection refused"
        );
        assert_eq!(err.backend(), Some(Backend::Semantic));
    }

    #[test]
    fn display_resolution() {
        let err = SearchError::Resolution("database locked".into());
        assert_eq!(err.to_string(), "resolution error: database locked");
        assert!(err.backend().is_none());
    }

    #[test]
    fn display_fusion() {
        let err = SearchError::Fusion("non-finite score".into());
        assert_eq!(err.to_string(), "fusion error: non-finite score");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("top_k must be greater than 0".into());
        assert_eq!(err.to_string(), "config error: top_k must be greater than 0");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
