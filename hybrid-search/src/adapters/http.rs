//! Shared HTTP client for the semantic search service.

use std::time::Duration;

use crate::error::SearchError;
use crate::types::Backend;

/// User-Agent sent to the semantic service.
const USER_AGENT: &str = concat!("hybrid-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for the semantic service.
///
/// The client has:
/// - A whole-request timeout, so a slow service surfaces as a transport error
/// - Gzip decompression
/// - No redirect following (the service is addressed directly)
///
/// # Errors
///
/// Returns [`SearchError::BackendUnavailable`] if the client cannot be constructed.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| {
            SearchError::unavailable(Backend::Semantic, format!("failed to build HTTP client: {e}"))
        })
}
