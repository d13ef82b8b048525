//! End-to-end tests for the planner web application.
//!
//! A stand-in Gemini server and the planner both run on ephemeral ports; the
//! tests drive the planner over HTTP the way the browser page does.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
use lesson_export::NOT_PROVIDED;
use lesson_planner::{
    create_router, AppState, Config, FileSessionRepository, GeminiClient, SessionStore,
    TextGenerator, GENERATION_ERROR_MESSAGE,
};
use reqwest::{redirect, Client, StatusCode};
use serde_json::{json, Value};

const GENERATED: &str = "## Lesson Topic\nFractions\n\n| Step | Minutes |\n| --- | --- |\n| Warm-up | 5 |";

/// Spawns a stand-in Gemini server that always answers with `status`.
async fn spawn_gemini(status: AxumStatus) -> String {
    let router = Router::new().route(
        "/v1beta/models/:action",
        post(move || async move {
            if status.is_success() {
                (
                    status,
                    Json(json!({"candidates": [{"content": {"parts": [{"text": GENERATED}]}}]})),
                )
            } else {
                (status, Json(json!({"error": {"message": "backend unavailable"}})))
            }
        }),
    );
    format!("http://{}/v1beta", spawn(router).await)
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    addr.to_string()
}

struct Planner {
    base: String,
    client: Client,
    session_file: PathBuf,
    _dir: tempfile::TempDir,
}

impl Planner {
    /// Starts a planner whose generator talks to `gemini_url`.
    async fn start(gemini_url: &str, key_var: &str) -> Self {
        std::env::set_var(key_var, "integration-key");
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let session_file = dir.path().join("session.json");

        let config = Config {
            api_base_url: gemini_url.to_string(),
            api_key_env: key_var.to_string(),
            session_file: session_file.display().to_string(),
            ..Config::default()
        };
        let session = SessionStore::open(Arc::new(FileSessionRepository::new(&session_file)))
            .expect("Failed to open session");
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config));
        let base = format!(
            "http://{}",
            spawn(create_router(AppState::new(config, session, generator))).await
        );

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to build client");

        Self {
            base,
            client,
            session_file,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("login request failed")
    }

    async fn post_json(&self, path: &str) -> Value {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("request failed");
        assert_eq!(response.status(), StatusCode::OK, "POST {path}");
        response.json().await.expect("invalid JSON")
    }

    async fn put_json(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("request failed")
    }
}

fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn stored_entries(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).expect("session file missing"))
        .expect("session file is not JSON")
}

#[tokio::test]
async fn test_login_gate_and_logout() {
    let gemini = spawn_gemini(AxumStatus::OK).await;
    let planner = Planner::start(&gemini, "LESSON_FLOW_KEY_GATE").await;

    let response = planner
        .client
        .get(planner.url("/lesson-planner"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = planner.login("demouser", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Invalid credentials"));
    assert!(!planner.session_file.exists());

    let response = planner.login("demouser", "demopass").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/lesson-planner"));

    let entries = stored_entries(&planner.session_file);
    assert_eq!(entries["isAuthenticated"], "true");
    assert!(entries["user"].as_str().unwrap().contains("demouser"));

    let response = planner
        .client
        .get(planner.url("/lesson-planner"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Generate Lesson Plan"));

    let response = planner
        .client
        .post(planner.url("/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(stored_entries(&planner.session_file), json!({}));

    let response = planner
        .client
        .get(planner.url("/api/content"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_edit_and_export() {
    let gemini = spawn_gemini(AxumStatus::OK).await;
    let planner = Planner::start(&gemini, "LESSON_FLOW_KEY_EXPORT").await;
    planner.login("demouser", "demopass").await;

    let response = planner
        .put_json("/api/form/topic", json!({"value": "Fractions"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = planner
        .put_json("/api/form/gradeLevel", json!({"value": "4"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let prompt: Value = planner
        .client
        .get(planner.url("/api/prompt"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let prompt = prompt["prompt"].as_str().unwrap();
    assert!(prompt.contains("- Topic: Fractions"));
    assert!(prompt.contains("- Grade Level: 4"));

    let content = planner.post_json("/api/generate").await;
    assert_eq!(content["phase"], "generated");
    assert_eq!(content["generated"], GENERATED);
    assert_eq!(content["editable"], GENERATED);

    let page = planner
        .client
        .get(planner.url("/lesson-planner"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("<h2>Lesson Topic</h2>"));
    assert!(page.contains("<table>"));

    let content = planner.post_json("/api/content/toggle-edit").await;
    assert_eq!(content["phase"], "editing");
    let response = planner
        .put_json("/api/content/text", json!({"text": "## Revised plan"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content = planner.post_json("/api/content/save").await;
    assert_eq!(content["phase"], "generated");
    assert_eq!(content["editable"], "## Revised plan");
    assert_eq!(content["generated"], GENERATED);

    let response = planner
        .client
        .get(planner.url("/api/export?format=markdown"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .unwrap(),
        "attachment; filename=\"Lesson_Plan.md\""
    );
    let markdown = response.text().await.unwrap();
    assert!(markdown.contains("## Revised plan"));
    assert!(markdown.contains("Fractions"));
    assert!(markdown.contains(NOT_PROVIDED));

    let response = planner
        .client
        .get(planner.url("/api/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let pdf = response.bytes().await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_generation_failure_shows_fixed_message() {
    let gemini = spawn_gemini(AxumStatus::SERVICE_UNAVAILABLE).await;
    let planner = Planner::start(&gemini, "LESSON_FLOW_KEY_FAILURE").await;
    planner.login("demouser", "demopass").await;

    let content = planner.post_json("/api/generate").await;

    assert_eq!(content["generated"], GENERATION_ERROR_MESSAGE);
    assert_eq!(content["failed"], true);
    assert_eq!(content["editable"], "");

    let page = planner
        .client
        .get(planner.url("/lesson-planner"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains(GENERATION_ERROR_MESSAGE));
    assert!(!page.contains("backend unavailable"));
}

#[tokio::test]
async fn test_stored_login_is_adopted_on_login_page() {
    let gemini = spawn_gemini(AxumStatus::OK).await;
    let planner = Planner::start(&gemini, "LESSON_FLOW_KEY_RELOAD").await;

    // Another process (e.g. `lesson login`) writes the session file.
    std::fs::write(
        &planner.session_file,
        r#"{"isAuthenticated": "true", "user": "{\"email\":\"demouser\"}"}"#,
    )
    .unwrap();

    let response = planner
        .client
        .get(planner.url("/login"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/lesson-planner"));

    let response = planner
        .client
        .get(planner.url("/lesson-planner"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
