//! API Integration Tests
//!
//! Providers are replaced with the deterministic doubles from
//! `faqa_core::testing`; every test gets its own temporary dataset and index.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use faqa_api::{create_router, state::AppState};
use faqa_core::testing::{ContextAnswerLlm, FailingLlm, KeywordEmbedding, UNKNOWN_ANSWER};
use faqa_core::{AppConfig, LlmClient};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const FAQ: &str = "Question,Answer\n\
    Do you have JavaScript course?,\"Yes, we offer a JavaScript course.\"\n\
    Do you have Python course?,No\n\
    What is the refund policy?,Refund within 7 days\n\
    Do you provide an internship?,Yes after the course\n";

struct TestApp {
    _dir: tempfile::TempDir,
    state: Arc<AppState>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_llm(Arc::new(ContextAnswerLlm::new()))
    }

    fn with_llm(llm: Arc<dyn LlmClient>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data1.csv");
        std::fs::write(&dataset, FAQ).unwrap();

        let mut config = AppConfig::default();
        config.dataset.path = dataset;
        config.index.path = dir.path().join("faiss_index");

        let state = Arc::new(AppState::new(
            config,
            Arc::new(KeywordEmbedding::faq_vocabulary()),
            llm,
        ));

        Self { _dir: dir, state }
    }

    fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn build_index(&self) {
        let (status, _) = self
            .send_json(create_json_request("POST", "/api/v1/index", None))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, json) = app.send_json(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_follows_index() {
    let app = TestApp::new();

    let (status, json) = app.send_json(get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ready"], false);

    app.build_index().await;

    let (status, json) = app.send_json(get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

// =============================================================================
// Index Tests
// =============================================================================

#[tokio::test]
async fn test_rebuild_returns_summary() {
    let app = TestApp::new();
    let (status, json) = app
        .send_json(create_json_request("POST", "/api/v1/index", None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["records"], 4);
    assert_eq!(json["embedding_model"], "keyword-test");
}

#[tokio::test]
async fn test_rebuild_with_missing_dataset() {
    let app = TestApp::new();
    std::fs::remove_file(&app.state.config.dataset.path).unwrap();

    let (status, json) = app
        .send_json(create_json_request("POST", "/api/v1/index", None))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "DATASET_ERROR");
}

// =============================================================================
// Query Tests
// =============================================================================

#[tokio::test]
async fn test_query_endpoint_success() {
    let app = TestApp::new();
    app.build_index().await;

    let request = create_json_request(
        "POST",
        "/api/v1/query",
        Some(json!({ "question": "Do you have a JavaScript course?" })),
    );
    let (status, json) = app.send_json(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Yes, we offer a JavaScript course.");
    assert_eq!(json["sources"][0]["question"], "Do you have JavaScript course?");
    assert!(json["processing_time_ms"].is_number());
}

#[tokio::test]
async fn test_query_without_sources() {
    let app = TestApp::new();
    app.build_index().await;

    let request = create_json_request(
        "POST",
        "/api/v1/query",
        Some(json!({ "question": "What is the refund policy?", "include_sources": false })),
    );
    let (status, json) = app.send_json(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Refund within 7 days");
    assert_eq!(json["sources"], json!([]));
}

#[tokio::test]
async fn test_query_unrelated_question() {
    let app = TestApp::new();
    app.build_index().await;

    let request = create_json_request(
        "POST",
        "/api/v1/query",
        Some(json!({ "question": "What is the weather on Mars?" })),
    );
    let (status, json) = app.send_json(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], UNKNOWN_ANSWER);
    assert_eq!(json["sources"], json!([]));
}

#[tokio::test]
async fn test_query_endpoint_empty_question() {
    let app = TestApp::new();
    app.build_index().await;

    let request = create_json_request("POST", "/api/v1/query", Some(json!({ "question": "  " })));
    let (status, json) = app.send_json(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_query_before_index_built() {
    let app = TestApp::new();

    let request = create_json_request(
        "POST",
        "/api/v1/query",
        Some(json!({ "question": "Do you have a JavaScript course?" })),
    );
    let (status, json) = app.send_json(request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "INDEX_NOT_READY");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("build the index first"));
}

#[tokio::test]
async fn test_query_completion_failure() {
    let app = TestApp::with_llm(Arc::new(FailingLlm));
    app.build_index().await;

    let request = create_json_request(
        "POST",
        "/api/v1/query",
        Some(json!({ "question": "Do you have a JavaScript course?" })),
    );
    let (status, json) = app.send_json(request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(json["details"].as_str().unwrap().contains("429"));
}

// =============================================================================
// Form Tests
// =============================================================================

#[tokio::test]
async fn test_form_without_question() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/")).await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<form"));
    assert!(!html.contains("class=\"answer\""));
    assert_eq!(app.state.get_request_count(), 0);
}

#[tokio::test]
async fn test_form_renders_answer() {
    let app = TestApp::new();
    app.build_index().await;

    let (status, body) = app
        .send(get("/?question=Do%20you%20have%20a%20JavaScript%20course%3F"))
        .await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<div class=\"answer\">Yes, we offer a JavaScript course.</div>"));
    assert!(html.contains("value=\"Do you have a JavaScript course?\""));
}

#[tokio::test]
async fn test_form_renders_error_before_index() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/?question=refund%20policy")).await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("build the index first"));
}
