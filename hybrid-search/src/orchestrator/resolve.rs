//! Resolution of fused ids back to job records.
//!
//! Records the lexical search already returned are reused; only ids that
//! came from the semantic side alone are looked up in the store. Ids the
//! store no longer knows are dropped. Output follows fused order and never
//! repeats an id.

use std::collections::{HashMap, HashSet};

use crate::backend::JobStore;
use crate::error::SearchError;
use crate::types::{Job, JobId, ScoredId};

/// Resolve `fused` to records, fetching ids missing from `known` in bulk.
///
/// # Errors
///
/// Returns [`SearchError::Resolution`] if the bulk lookup fails.
pub async fn resolve_fused<S: JobStore>(
    store: &S,
    fused: &[ScoredId],
    known: &[Job],
) -> Result<Vec<Job>, SearchError> {
    let mut by_id: HashMap<JobId, Job> = known.iter().map(|job| (job.id, job.clone())).collect();

    let missing: Vec<JobId> = fused
        .iter()
        .map(|scored| scored.id)
        .filter(|id| !by_id.contains_key(id))
        .collect();

    if !missing.is_empty() {
        let wanted: HashSet<JobId> = missing.iter().copied().collect();
        let fetched = store
            .resolve(&missing)
            .await
            .map_err(|e| SearchError::Resolution(e.to_string()))?;
        tracing::debug!(
            requested = missing.len(),
            found = fetched.len(),
            "bulk resolved semantic-only ids"
        );
        for job in fetched.into_iter().filter(|job| wanted.contains(&job.id)) {
            by_id.entry(job.id).or_insert(job);
        }
    }

    Ok(assemble(fused.iter().map(|scored| scored.id), by_id))
}

/// Emit records in `order`, skipping ids without a record and repeats.
pub fn assemble<I>(order: I, mut by_id: HashMap<JobId, Job>) -> Vec<Job>
where
    I: IntoIterator<Item = JobId>,
{
    let mut dropped = 0usize;
    let records: Vec<Job> = order
        .into_iter()
        .filter_map(|id| {
            let record = by_id.remove(&id);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, "ranked ids without a stored record");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn job(id: JobId) -> Job {
        Job {
            id,
            title: format!("Job {id}"),
            company: "Globex".into(),
            location: "Berlin".into(),
            source: "test".into(),
            url: Some(format!("https://jobs.example/{id}")),
            description: None,
        }
    }

    fn scored(ids: &[JobId]) -> Vec<ScoredId> {
        ids.iter().map(|&id| ScoredId { id, score: 0.0 }).collect()
    }

    #[derive(Default)]
    struct RecordingStore {
        stored: Vec<JobId>,
        fail: bool,
        requests: Mutex<Vec<Vec<JobId>>>,
    }

    impl JobStore for RecordingStore {
        async fn search_by_text(&self, _query: &str) -> Result<Vec<Job>, SearchError> {
            Ok(vec![])
        }

        async fn list_all(&self) -> Result<Vec<Job>, SearchError> {
            Ok(self.stored.iter().copied().map(job).collect())
        }

        async fn resolve(&self, ids: &[JobId]) -> Result<Vec<Job>, SearchError> {
            self.requests.lock().unwrap().push(ids.to_vec());
            if self.fail {
                return Err(SearchError::unavailable(
                    crate::types::Backend::Lexical,
                    "connection reset",
                ));
            }
            Ok(ids
                .iter()
                .copied()
                .filter(|id| self.stored.contains(id))
                .map(job)
                .collect())
        }
    }

    #[tokio::test]
    async fn only_unknown_ids_are_fetched() {
        let store = RecordingStore {
            stored: vec![10, 20, 30, 40],
            ..Default::default()
        };
        let known = vec![job(10), job(20), job(30)];
        let records = resolve_fused(&store, &scored(&[30, 10, 20, 40]), &known)
            .await
            .expect("ok");

        let ids: Vec<JobId> = records.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![30, 10, 20, 40]);
        assert_eq!(*store.requests.lock().unwrap(), vec![vec![40]]);
    }

    #[tokio::test]
    async fn no_lookup_when_everything_known() {
        let store = RecordingStore::default();
        let known = vec![job(1), job(2)];
        let records = resolve_fused(&store, &scored(&[2, 1]), &known).await.expect("ok");
        assert_eq!(records.len(), 2);
        assert!(store.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_ids_are_dropped() {
        let store = RecordingStore {
            stored: vec![5],
            ..Default::default()
        };
        let records = resolve_fused(&store, &scored(&[99, 5, 98]), &[]).await.expect("ok");
        let ids: Vec<JobId> = records.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![5]);
    }

    #[tokio::test]
    async fn lookup_failure_is_resolution_error() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let err = resolve_fused(&store, &scored(&[1]), &[]).await.unwrap_err();
        assert!(matches!(err, SearchError::Resolution(_)));
    }

    #[test]
    fn assemble_never_repeats_an_id() {
        let by_id: HashMap<JobId, Job> = [job(1), job(2)].into_iter().map(|j| (j.id, j)).collect();
        let records = assemble([1, 2, 1, 2, 3], by_id);
        let ids: Vec<JobId> = records.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
