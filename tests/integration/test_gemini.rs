//! Integration tests for the Gemini client against a local stand-in server.
//!
//! Each test binds a small axum app on an ephemeral port that answers the
//! `generateContent` route the way the real API does, then points a
//! `GeminiClient` at it through the config.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lesson_planner::{Config, GeminiClient, GenerationErrorKind, TextGenerator};
use serde_json::{json, Value};

/// What the stand-in server saw.
#[derive(Debug, Default)]
struct Recorded {
    action: Option<String>,
    key: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    recorded: Arc<Mutex<Recorded>>,
}

async fn handle_generate(
    State(stub): State<Stub>,
    Path(action): Path<String>,
    Query(query): Query<std::collections::HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    {
        let mut recorded = stub.recorded.lock().expect("lock poisoned");
        recorded.action = Some(action);
        recorded.key = query.get("key").cloned();
        recorded.body = Some(body);
    }
    (stub.status, Json(stub.reply.clone()))
}

/// Spawns the stand-in server and returns its base URL.
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let stub = Stub {
        status,
        reply,
        recorded: Arc::clone(&recorded),
    };

    let router = Router::new()
        .route("/v1beta/models/:action", post(handle_generate))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    (format!("http://{addr}/v1beta"), recorded)
}

/// Config pointing at `base_url`, reading the key from a variable unique to
/// the calling test.
fn config_for(base_url: &str, key_var: &str, key: Option<&str>) -> Config {
    match key {
        Some(key) => std::env::set_var(key_var, key),
        None => std::env::remove_var(key_var),
    }
    Config {
        api_base_url: base_url.to_string(),
        api_key_env: key_var.to_string(),
        model: "gemini-test".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let (base_url, recorded) = spawn_stub(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "## Lesson Topic\n"}, {"text": "Fractions"}]
                }
            }]
        }),
    )
    .await;
    let config = config_for(&base_url, "LESSON_TEST_KEY_SUCCESS", Some("secret-key"));
    let client = GeminiClient::from_config(&config);

    let text = client.generate("Plan a lesson").await.expect("generation failed");

    assert_eq!(text, "## Lesson Topic\nFractions");

    let recorded = recorded.lock().expect("lock poisoned");
    assert_eq!(recorded.action.as_deref(), Some("gemini-test:generateContent"));
    assert_eq!(recorded.key.as_deref(), Some("secret-key"));
    assert_eq!(
        recorded.body,
        Some(json!({"contents": [{"parts": [{"text": "Plan a lesson"}]}]}))
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let (base_url, _) = spawn_stub(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED"}}),
    )
    .await;
    let config = config_for(&base_url, "LESSON_TEST_KEY_UNAUTHORIZED", Some("bad-key"));

    let err = GeminiClient::from_config(&config)
        .generate("Plan a lesson")
        .await
        .expect_err("expected failure");

    assert_eq!(err.kind, GenerationErrorKind::Authentication);
    assert!(err.message.contains("API key not valid"));
    assert!(!err.message.contains("bad-key"));
}

#[tokio::test]
async fn test_too_many_requests_maps_to_rate_limit() {
    let (base_url, _) = spawn_stub(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "message": "Resource exhausted"}}),
    )
    .await;
    let config = config_for(&base_url, "LESSON_TEST_KEY_RATE_LIMIT", Some("key"));

    let err = GeminiClient::from_config(&config)
        .generate("Plan a lesson")
        .await
        .expect_err("expected failure");

    assert_eq!(err.kind, GenerationErrorKind::RateLimit);
    assert!(err.message.contains("Resource exhausted"));
    assert!(err.to_string().contains("Wait a moment before generating again"));
}

#[tokio::test]
async fn test_response_without_candidates_is_malformed() {
    let (base_url, _) = spawn_stub(StatusCode::OK, json!({"promptFeedback": {}})).await;
    let config = config_for(&base_url, "LESSON_TEST_KEY_MALFORMED", Some("key"));

    let err = GeminiClient::from_config(&config)
        .generate("Plan a lesson")
        .await
        .expect_err("expected failure");

    assert_eq!(err.kind, GenerationErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_missing_key_fails_before_any_request() {
    let (base_url, recorded) = spawn_stub(StatusCode::OK, json!({})).await;
    let config = config_for(&base_url, "LESSON_TEST_KEY_MISSING", None);

    let err = GeminiClient::from_config(&config)
        .generate("Plan a lesson")
        .await
        .expect_err("expected failure");

    assert_eq!(err.kind, GenerationErrorKind::MissingApiKey);
    assert!(recorded.lock().expect("lock poisoned").action.is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop to get a port nothing is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    drop(listener);

    let config = config_for(
        &format!("http://{addr}/v1beta"),
        "LESSON_TEST_KEY_NETWORK",
        Some("network-secret"),
    );

    let err = GeminiClient::from_config(&config)
        .generate("Plan a lesson")
        .await
        .expect_err("expected failure");

    assert_eq!(err.kind, GenerationErrorKind::Network);
    assert!(!err.message.contains("network-secret"));
}
