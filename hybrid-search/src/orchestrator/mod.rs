//! Search orchestrator: concurrent fan-out, rank fusion, record resolution.
//!
//! This module queries the lexical and semantic backends concurrently,
//! fuses their rankings with Reciprocal Rank Fusion, and resolves the
//! fused ids back to job records in ranked order.

pub mod hybrid;
pub mod resolve;
pub mod rrf;

pub use hybrid::{HybridOutcome, HybridSearchOrchestrator, Ranking};
