//! Reciprocal Rank Fusion of two candidate lists.
//!
//! Every id at 0-based rank `r` in a list contributes
//!
//! ```text
//! score = 1 / (k + r + 1)
//! ```
//!
//! and contributions from both lists add up. Ids are returned by descending
//! cumulative score. Equal scores keep first-encountered order: list A in
//! order, then ids that only appear in list B, in B's order.

use std::collections::HashMap;

use crate::types::{CandidateList, FusedResult, JobId, ScoredId};

/// Conventional RRF smoothing constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Contribution of a single rank position.
pub fn reciprocal_rank(k: u32, rank: usize) -> f64 {
    1.0 / (f64::from(k) + rank as f64 + 1.0)
}

/// Fuse two ranked lists into one ranking.
///
/// The score table lives only for this call. Fusing a list with an empty
/// list returns the non-empty list's order unchanged; two empty lists fuse
/// to an empty result.
pub fn fuse(list_a: &CandidateList, list_b: &CandidateList, k: u32) -> FusedResult {
    let mut fused: Vec<ScoredId> = Vec::with_capacity(list_a.len() + list_b.len());
    let mut slot: HashMap<JobId, usize> = HashMap::with_capacity(fused.capacity());

    for list in [list_a, list_b] {
        for (rank, id) in list.ranked() {
            let contribution = reciprocal_rank(k, rank);
            match slot.get(&id) {
                Some(&index) => fused[index].score += contribution,
                None => {
                    slot.insert(id, fused.len());
                    fused.push(ScoredId {
                        id,
                        score: contribution,
                    });
                }
            }
        }
    }

    // Stable sort: equal scores stay in first-encountered order.
    fused.sort_by(|a, b| b.score.total_cmp(&a.score));
    fused
}
