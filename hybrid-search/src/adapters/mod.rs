//! Ranking adapters: each turns one backend into a [`CandidateList`].
//!
//! Adapters enforce their own timeout and report every backend failure as
//! [`SearchError::BackendUnavailable`]. They never retry.
//!
//! [`CandidateList`]: crate::types::CandidateList
//! [`SearchError::BackendUnavailable`]: crate::error::SearchError::BackendUnavailable

pub mod http;
pub mod lexical;
pub mod semantic;

pub use lexical::{LexicalHits, LexicalSearchAdapter};
pub use semantic::{HttpSemanticBackend, SemanticSearchAdapter};
