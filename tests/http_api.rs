use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use prefill_gateway::extraction::{ExtractionRecord, Extractor};
use prefill_gateway::llm::{MockPlatform, Provider};
use prefill_gateway::rate_limit::SlidingWindowLimiter;
use prefill_gateway::sink::{CsvRecordSink, MemorySink, MemoryTranscript, RecordSink};
use prefill_gateway::{AppState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for oneshot

const INVOICE_EMAIL: &str = "Dear Ms. Patel,\n\nThis is a gentle reminder regarding Invoice #INV-7841.\n\nThe total amount due is $5,320 USD, payable no later than November 25, 2025.\n\nCompany: Apex Marketing Group\nContact: finance@apexmktg.com";

const INVOICE_JSON: &str = r#"{"amount": 5320, "currency": "USD", "due_date": "2025-11-25", "description": "Invoice #INV-7841 digital advertising", "company": "Apex Marketing Group", "contact": "finance@apexmktg.com"}"#;

fn state_with(platform: &MockPlatform, sink: Arc<dyn RecordSink>, limit: usize) -> AppState {
    let extractor = Extractor::new(
        Arc::new(platform.clone()),
        sink,
        Arc::new(MemoryTranscript::new()),
        "extract invoices",
    );
    AppState {
        limiter: Arc::new(SlidingWindowLimiter::new(limit, Duration::from_secs(60))),
        platform: Arc::new(platform.clone()),
        extractor: Arc::new(extractor),
        chat_prompt: "be brief".to_string(),
        providers: vec![Provider::Groq, Provider::OpenAi],
    }
}

fn app_with(platform: &MockPlatform, sink: Arc<dyn RecordSink>, limit: usize) -> Router {
    router(state_with(platform, sink, limit))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn chat_returns_model_response() {
    let platform = MockPlatform::new("Hi!");
    let app = app_with(&platform, Arc::new(MemorySink::new()), 3);

    let (status, body) = post(
        &app,
        "/v1/chat/completions",
        json!({ "model_name": "llama", "prompt": "Hello, respond with just 'Hi!'" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Hi!" }));

    let request = &platform.requests()[0];
    assert_eq!(request.model, "llama");
    assert_eq!(request.messages[0].content, "be brief");
    assert_eq!(request.user_content(), Some("Hello, respond with just 'Hi!'"));
    assert!(request.response_format.is_none());
}

#[tokio::test]
async fn fourth_request_in_window_is_rate_limited() {
    let platform = MockPlatform::new("ok");
    let app = app_with(&platform, Arc::new(MemorySink::new()), 3);
    let body = json!({ "model_name": "llama", "prompt": "hi" });

    for _ in 0..3 {
        let (status, _) = post(&app, "/v1/chat/completions", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after <= 60);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("Too many requests."));
    assert_eq!(platform.call_count(), 3);
}

#[tokio::test]
async fn chat_and_prefill_share_one_bucket() {
    let platform = MockPlatform::new(INVOICE_JSON);
    let app = app_with(&platform, Arc::new(MemorySink::new()), 1);

    let (status, _) = post(
        &app,
        "/v1/chat/completions",
        json!({ "model_name": "llama", "prompt": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        "/v1/prefill",
        json!({ "email_text": INVOICE_EMAIL, "model": "gpt" }),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn prefill_persists_extracted_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let sink = CsvRecordSink::open(&path).await.unwrap();
    let platform = MockPlatform::new(INVOICE_JSON);
    let app = app_with(&platform, Arc::new(sink), 3);

    let (status, body) = post(
        &app,
        "/v1/prefill",
        json!({ "email_text": INVOICE_EMAIL, "model": "gpt" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Data extracted and written successfully.");
    assert_eq!(body["data"]["amount"], 5320.0);
    assert_eq!(body["data"]["company"], "Apex Marketing Group");

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        ["amount", "currency", "due_date", "description", "company", "contact"]
    );
    let rows: Vec<ExtractionRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(
        rows,
        vec![ExtractionRecord {
            amount: 5320.0,
            currency: "USD".to_string(),
            due_date: "2025-11-25".to_string(),
            description: "Invoice #INV-7841 digital advertising".to_string(),
            company: "Apex Marketing Group".to_string(),
            contact: "finance@apexmktg.com".to_string(),
        }]
    );

    let request = &platform.requests()[0];
    assert_eq!(request.model, "gpt");
    assert!(request.response_format.is_some());
}

#[tokio::test]
async fn prefill_with_non_json_reply_persists_nothing() {
    let sink = MemorySink::new();
    let platform = MockPlatform::new("Sorry, I can't help with that.");
    let app = app_with(&platform, Arc::new(sink.clone()), 3);

    let (status, body) = post(
        &app,
        "/v1/prefill",
        json!({ "email_text": INVOICE_EMAIL, "model": "gpt" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Sorry, I can't help with that.")
    );
    assert!(body.get("data").is_none());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn empty_email_is_rejected_before_limiter_and_model() {
    let platform = MockPlatform::new(INVOICE_JSON);
    // a limit of one: a consumed slot would make the follow-up request fail
    let app = app_with(&platform, Arc::new(MemorySink::new()), 1);

    for email in ["", "   \n\t "] {
        let (status, body) = post(
            &app,
            "/v1/prefill",
            json!({ "email_text": email, "model": "gpt" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("email_text"));
    }
    assert_eq!(platform.call_count(), 0);

    let (status, _) = post(
        &app,
        "/v1/prefill",
        json!({ "email_text": INVOICE_EMAIL, "model": "gpt" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let platform = MockPlatform::new("ok");
    let app = app_with(&platform, Arc::new(MemorySink::new()), 3);

    let (status, body) = post_raw(&app, "/v1/chat/completions", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = post(&app, "/v1/chat/completions", json!({ "prompt": "hi" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("model_name"));

    let (status, body) = post(&app, "/v1/prefill", json!({ "email_text": "hello" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    assert_eq!(platform.call_count(), 0);
}

#[tokio::test]
async fn upstream_failure_is_a_structured_500() {
    let platform = MockPlatform::failing("connection refused");
    let app = app_with(&platform, Arc::new(MemorySink::new()), 3);

    let (status, body) = post(
        &app,
        "/v1/chat/completions",
        json!({ "model_name": "llama", "prompt": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("connection refused"));

    let (status, body) = post(
        &app,
        "/v1/prefill",
        json!({ "email_text": INVOICE_EMAIL, "model": "gpt" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn health_reports_status() {
    let platform = MockPlatform::new("ok");
    let app = app_with(&platform, Arc::new(MemorySink::new()), 3);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["providers"], json!(["groq", "openai"]));
    assert_eq!(body["rate_limit"], json!({ "limit": 3, "window_seconds": 60 }));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_degraded_without_providers() {
    let platform = MockPlatform::new("ok");
    let mut state = state_with(&platform, Arc::new(MemorySink::new()), 3);
    state.providers.clear();
    let app = router(state);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["providers"], json!([]));
}

#[tokio::test]
async fn metrics_exposes_request_counters() {
    let platform = MockPlatform::new("ok");
    let app = app_with(&platform, Arc::new(MemorySink::new()), 3);

    post(
        &app,
        "/v1/chat/completions",
        json!({ "model_name": "llama", "prompt": "hi" }),
    )
    .await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("gateway_requests_total"));
}
