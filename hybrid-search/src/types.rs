//! Core types for queries, candidate rankings and job records.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of a job record in the relational store.
pub type JobId = i64;

/// A free-text search query, trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Build a query from raw user input, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    /// Returns `true` if the query has no content after trimming.
    ///
    /// Blank queries bypass ranking entirely and list every job.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// The trimmed query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job listing as stored by the relational backend.
///
/// The orchestrator only reorders references to these; it never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An ordered, duplicate-free list of job ids. Rank is the 0-based position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    ids: Vec<JobId>,
}

impl CandidateList {
    /// An empty candidate list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a candidate list from ids in best-first order.
    ///
    /// Repeated ids keep their first (best) position; later repeats are dropped.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = JobId>,
    {
        let mut seen = HashSet::new();
        let ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { ids }
    }

    pub fn ids(&self) -> &[JobId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate `(rank, id)` pairs, best first.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, JobId)> + '_ {
        self.ids.iter().copied().enumerate()
    }
}

impl From<Vec<JobId>> for CandidateList {
    fn from(ids: Vec<JobId>) -> Self {
        Self::from_ids(ids)
    }
}

/// A job id with its cumulative fusion score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredId {
    pub id: JobId,
    pub score: f64,
}

/// Fused ranking: ids sorted by descending score with deterministic ties.
pub type FusedResult = Vec<ScoredId>;

/// One hit returned by the semantic search service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticHit {
    pub id: JobId,
    /// Similarity score as reported by the service. Informational only;
    /// fusion uses rank, not this value.
    pub score: f64,
}

/// The two ranking backends the orchestrator fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Relational keyword/substring search. Authoritative baseline.
    Lexical,
    /// Remote embedding similarity search. Optional enrichment.
    Semantic,
}

impl Backend {
    /// Returns the human-readable name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
