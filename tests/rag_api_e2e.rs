use std::sync::Arc;

use audit_rag::core::config::{AppPaths, RagSettings};
use audit_rag::rag::RagService;
use audit_rag::server::router::router;
use audit_rag::state::AppState;
use axum::routing::get;
use axum::Router;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

const PROCEDURES_JSON: &str = r#"[
    {"id": "p1", "title": "재고자산 실사 입회", "description": "기말 재고 실재성 확인",
     "procedure": ["실사 계획 검토", "표본 재실사"], "topic": "재고자산"},
    {"id": "p2", "title": "매출채권 조회", "description": "외부 조회로 실재성 확인", "topic": "매출채권"}
]"#;

const STANDARDS_JSON: &str = r#"[
    {"id": 1, "물음": "기준서 질문 A", "정답": "답변 포함 KSA 200"},
    {"id": 2, "물음": "중요성은 어떻게 결정하는가", "정답": "KSA 320에 따라 결정", "기준서": "KSA 320"}
]"#;

const EXAMS_2023_JSON: &str = r#"[
    {"examId": "2023-2차", "cases": [
        {"caseId": "1", "topic": "재고자산", "chapter": "실증절차",
         "subQuestions": [{"id": "1-1", "question": "재고실사 입회 절차를 서술하시오", "answer": "실사 관찰 및 재실사"}]}
    ]}
]"#;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    format!("http://{}", addr)
}

/// Static host for the collection files. Unknown paths answer 404.
async fn spawn_data_host(with_standards: bool) -> String {
    let mut app = Router::new()
        .route("/data/procedures.json", get(|| async { PROCEDURES_JSON }))
        .route(
            "/data/exams/2023_hierarchical.json",
            get(|| async { EXAMS_2023_JSON }),
        );
    if with_standards {
        app = app.route("/data/standards.json", get(|| async { STANDARDS_JSON }));
    }
    serve(app).await
}

async fn spawn_app(with_standards: bool) -> (String, TempDir) {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let data_host = spawn_data_host(with_standards).await;

    let settings = RagSettings::with_data_source(format!("{}/data", data_host));
    let rag = RagService::from_settings(settings).expect("rag service");
    let paths = Arc::new(AppPaths::with_dirs(
        tmp_dir.path().to_path_buf(),
        tmp_dir.path().join("user"),
    ));
    let state = AppState::with_rag(paths, rag);

    (serve(router(state)).await, tmp_dir)
}

#[tokio::test]
async fn test_health_reports_rag_state() {
    let (base_url, _tmp) = spawn_app(true).await;
    let client = Client::new();

    let body: Value = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rag"], "uninitialized");
}

#[tokio::test]
async fn test_search_builds_standards_context() {
    let (base_url, _tmp) = spawn_app(true).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/rag/search", base_url))
        .json(&json!({"query": "KSA 200"}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("json");
    let context = body["context"].as_str().expect("context string");
    assert!(context.starts_with("## 관련 회계감사기준서"));
    assert!(context.contains("KSA 200"));
    assert_eq!(body["keywords"], json!(["ksa", "200"]));
    assert_eq!(body["standards"][0]["물음"], "기준서 질문 A");

    let status: Value = client
        .get(format!("{}/api/rag/status", base_url))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(status["state"], "ready");
    assert_eq!(status["procedures"], 2);
    assert_eq!(status["standards"], 2);
    assert_eq!(status["examQuestions"], 1);
}

#[tokio::test]
async fn test_search_with_custom_keywords_hits_exams() {
    let (base_url, _tmp) = spawn_app(true).await;
    let client = Client::new();

    let body: Value = client
        .post(format!("{}/api/rag/search", base_url))
        .json(&json!({"query": "", "keywords": ["재고실사"]}))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");

    assert_eq!(body["examQuestions"][0]["year"], "2023");
    assert_eq!(body["examQuestions"][0]["examId"], "2023-2차");
    assert!(body.get("exam_questions").is_none());
    assert!(body["context"]
        .as_str()
        .expect("context string")
        .contains("## 유사 기출문제"));
}

#[tokio::test]
async fn test_empty_search_is_bad_request() {
    let (base_url, _tmp) = spawn_app(true).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/rag/search", base_url))
        .json(&json!({"query": "   "}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_collection_is_service_unavailable() {
    let (base_url, _tmp) = spawn_app(false).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/rag/search", base_url))
        .json(&json!({"query": "KSA 200"}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["category"], "network");

    let status: Value = client
        .get(format!("{}/api/rag/status", base_url))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(status["state"], "failed");
}

#[tokio::test]
async fn test_reload_reports_counts() {
    let (base_url, _tmp) = spawn_app(true).await;
    let client = Client::new();

    let body: Value = client
        .post(format!("{}/api/rag/reload", base_url))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["status"], "reloaded");
    assert_eq!(body["procedures"], 2);
    assert_eq!(body["standards"], 2);
}
