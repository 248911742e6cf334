//! Integration tests for the hybrid search pipeline.
//!
//! The semantic service is a wiremock server speaking the real wire format;
//! the job store is in-memory. No external network is used.

use std::collections::HashSet;
use std::time::Duration;

use hybrid_search::{
    Backend, HttpSemanticBackend, HybridSearchConfig, Job, JobId, JobStore, Ranking, SearchError,
    SemanticBackend,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn job(id: JobId, title: &str) -> Job {
    Job {
        id,
        title: title.to_string(),
        company: "Acme".into(),
        location: "Remote".into(),
        source: "seed".into(),
        url: Some(format!("https://jobs.example/{id}")),
        description: None,
    }
}

/// In-memory store: substring match on title, in insertion order.
struct MemoryStore {
    jobs: Vec<Job>,
    offline: bool,
}

impl MemoryStore {
    fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            offline: false,
        }
    }
}

impl JobStore for MemoryStore {
    async fn search_by_text(&self, query: &str) -> Result<Vec<Job>, SearchError> {
        if self.offline {
            return Err(SearchError::unavailable(Backend::Lexical, "connection refused"));
        }
        let needle = query.to_lowercase();
        Ok(self
            .jobs
            .iter()
            .filter(|j| j.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Job>, SearchError> {
        Ok(self.jobs.clone())
    }

    async fn resolve(&self, ids: &[JobId]) -> Result<Vec<Job>, SearchError> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| ids.contains(&j.id))
            .cloned()
            .collect())
    }
}

fn engineer_store() -> MemoryStore {
    MemoryStore::new(vec![
        job(10, "Backend Engineer"),
        job(20, "Frontend Engineer"),
        job(30, "Data Engineer"),
        job(40, "Machine Learning Scientist"),
        job(50, "Office Manager"),
    ])
}

fn config_for(server: &MockServer) -> HybridSearchConfig {
    HybridSearchConfig {
        semantic_url: server.uri(),
        semantic_timeout_ms: 500,
        ..Default::default()
    }
}

fn ids(records: &[Job]) -> Vec<JobId> {
    records.iter().map(|j| j.id).collect()
}

async fn mount_semantic(server: &MockServer, hits: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/rag/search_only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": hits })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn engineer_query_fuses_both_rankings() {
    let server = MockServer::start().await;
    mount_semantic(
        &server,
        json!([
            {"job_id": 30, "match_score": 0.12, "title": "Job Title: Data Engineer"},
            {"job_id": 40, "match_score": 0.25, "title": "Job Title: ML Scientist"}
        ]),
    )
    .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    let outcome = search.search_detailed("engineer").await.expect("search ok");

    assert_eq!(outcome.ranking, Ranking::Fused);
    // 30 is in both rankings; 20 and 40 tie at 1/62 and keep lexical-first order.
    assert_eq!(ids(&outcome.records), vec![30, 10, 20, 40]);
}

#[tokio::test]
async fn request_carries_query_and_top_k() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/search_only"))
        .and(body_json(json!({"query": "engineer", "k": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    // Surrounding whitespace is trimmed before the query is sent.
    let outcome = search.search_detailed("  engineer  ").await.expect("search ok");
    assert_eq!(outcome.ranking, Ranking::Lexical);
}

#[tokio::test]
async fn semantic_server_error_degrades_to_lexical() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/search_only"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    let outcome = search.search_detailed("engineer").await.expect("no error surfaced");

    assert_eq!(outcome.ranking, Ranking::Lexical);
    assert_eq!(ids(&outcome.records), vec![10, 20, 30]);
}

#[tokio::test]
async fn slow_semantic_service_degrades_to_lexical() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/search_only"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"job_id": 40, "match_score": 0.1}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = HybridSearchConfig {
        semantic_timeout_ms: 100,
        ..config_for(&server)
    };
    let search = hybrid_search::with_http_semantic(engineer_store(), &config).expect("valid");
    let outcome = search.search_detailed("engineer").await.expect("no error surfaced");

    assert_eq!(outcome.ranking, Ranking::Lexical);
    assert_eq!(ids(&outcome.records), vec![10, 20, 30]);
}

#[tokio::test]
async fn malformed_semantic_body_degrades_to_lexical() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/search_only"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    let records = search.hybrid_search("engineer").await.expect("no error surfaced");
    assert_eq!(ids(&records), vec![10, 20, 30]);
}

#[tokio::test]
async fn lexical_outage_fails_even_when_semantic_succeeds() {
    let server = MockServer::start().await;
    mount_semantic(&server, json!([{"job_id": 10, "match_score": 0.1}])).await;

    let mut store = engineer_store();
    store.offline = true;
    let search =
        hybrid_search::with_http_semantic(store, &config_for(&server)).expect("valid config");
    let err = search.hybrid_search("engineer").await.unwrap_err();

    assert_eq!(err.backend(), Some(Backend::Lexical));
}

#[tokio::test]
async fn semantic_only_hits_are_resolved_and_stale_ids_dropped() {
    let server = MockServer::start().await;
    mount_semantic(
        &server,
        json!([
            {"job_id": 40, "match_score": 0.1},
            {"job_id": 777, "match_score": 0.2},
            {"job_id": null, "match_score": 0.3},
            {"job_id": 40, "match_score": 0.4}
        ]),
    )
    .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    let records = search.hybrid_search("data").await.expect("search ok");

    // Lexical: [30]. Semantic: [40, 777]. 30 and 40 tie at 1/61, 777 is gone.
    assert_eq!(ids(&records), vec![30, 40]);
}

#[tokio::test]
async fn blank_query_lists_everything_without_semantic_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&server)
        .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    let outcome = search.search_detailed(" \t ").await.expect("search ok");

    assert_eq!(outcome.ranking, Ranking::ListAll);
    assert_eq!(outcome.records.len(), 5);
}

#[tokio::test]
async fn repeated_searches_return_identical_order() {
    let server = MockServer::start().await;
    mount_semantic(
        &server,
        json!([
            {"job_id": 50, "match_score": 0.1},
            {"job_id": 20, "match_score": 0.2},
            {"job_id": 40, "match_score": 0.3}
        ]),
    )
    .await;

    let search = hybrid_search::with_http_semantic(engineer_store(), &config_for(&server))
        .expect("valid config");
    let first = search.hybrid_search("engineer").await.expect("search ok");
    let second = search.hybrid_search("engineer").await.expect("search ok");

    assert_eq!(ids(&first), ids(&second));
    let unique: HashSet<JobId> = first.iter().map(|j| j.id).collect();
    assert_eq!(unique.len(), first.len());
}

#[tokio::test]
async fn repeated_semantic_failures_open_the_circuit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/search_only"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.circuit_breaker.failure_threshold = 2;
    config.circuit_breaker.cooldown_secs = 600;
    let search = hybrid_search::with_http_semantic(engineer_store(), &config).expect("valid");

    for _ in 0..4 {
        let records = search.hybrid_search("engineer").await.expect("degrades");
        assert_eq!(ids(&records), vec![10, 20, 30]);
    }
    // MockServer verifies on drop that only two requests reached it.
}

#[tokio::test]
async fn http_backend_reports_unavailable_on_connection_failure() {
    // Reserve a free port, then release it so nothing is listening there.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}", listener.local_addr().expect("addr"))
    };
    let backend = HttpSemanticBackend::new(&uri, Duration::from_millis(500)).expect("client");
    let err = backend.search("engineer", 20).await.unwrap_err();
    assert_eq!(err.backend(), Some(Backend::Semantic));
}
