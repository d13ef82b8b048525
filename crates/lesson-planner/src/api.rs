//! HTTP application for the lesson planner.
//!
//! This module serves the three pages and the JSON API the planner page
//! drives. Every `/api` endpoint and the planner page require a logged-in
//! session.
//!
//! # Pages
//!
//! - `GET /` - Landing page
//! - `GET /login`, `POST /login` - Login form
//! - `POST /logout` - Clear the session
//! - `GET /lesson-planner` - The planner (gated)
//!
//! # Endpoints
//!
//! - `GET /api/form`, `PUT /api/form` - Read or replace all form fields
//! - `PUT /api/form/:field` - Set one form field
//! - `GET /api/prompt` - The prompt the current form produces
//! - `POST /api/generate` - Generate a lesson plan from the current form
//! - `GET /api/content` - Generated and editable content
//! - `POST /api/content/toggle-edit` - Open or close the editor
//! - `PUT /api/content/text` - Replace the editable text (editor open)
//! - `POST /api/content/save`, `POST /api/content/cancel` - Close the editor
//! - `GET /api/export?format=pdf|markdown|json` - Download the lesson plan
//!
//! # Example
//!
//! ```no_run
//! use lesson_planner::{create_router, AppState, Config, GeminiClient, SessionStore};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = Config::default();
//! let generator = Arc::new(GeminiClient::from_config(&config));
//! let state = AppState::new(config, SessionStore::in_memory(), generator);
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use lesson_export::{ExportFormat, LessonPlanExporter};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::content::ContentStore;
use crate::form::{FormData, FormField};
use crate::gate::{GateDecision, Gated, View};
use crate::generation::TextGenerator;
use crate::pages::{landing_page, login_page, PlannerProps, PlannerView};
use crate::prompt::build_prompt;
use crate::session::{CredentialVerifier, LiteralCredentialVerifier, SessionStore};
use crate::{Config, PlannerError};

/// Path of the planner page.
pub const PLANNER_PATH: &str = "/lesson-planner";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Login form body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    /// Email (username).
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Request body for `PUT /api/form/:field`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    /// New value of the field.
    pub value: String,
}

/// Request body for `PUT /api/content/text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// New editable text.
    pub text: String,
}

/// Response body for `GET /api/prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    /// The prompt built from the current form.
    pub prompt: String,
}

/// Query string for `GET /api/export`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    /// Document format; PDF when absent.
    #[serde(default)]
    pub format: Option<ExportFormat>,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// The form and content of the lesson being planned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonWorkspace {
    /// Form values.
    pub form: FormData,
    /// Generated and editable content.
    pub content: ContentStore,
}

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Planner configuration.
    pub config: Config,
    /// Live session flag.
    pub session: SessionStore,
    /// Login check.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Text generation backend.
    pub generator: Arc<dyn TextGenerator>,
    /// Current lesson.
    pub workspace: Arc<Mutex<LessonWorkspace>>,
}

impl AppState {
    /// Creates a new `AppState` with an empty workspace.
    ///
    /// Logins are checked against `config.credentials`.
    #[must_use]
    pub fn new(config: Config, session: SessionStore, generator: Arc<dyn TextGenerator>) -> Self {
        let verifier = Arc::new(LiteralCredentialVerifier::new(config.credentials.clone()));
        Self {
            config,
            session,
            verifier,
            generator,
            workspace: Arc::new(Mutex::new(LessonWorkspace::default())),
        }
    }

    /// Replaces the credential verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// No logged-in session.
    Unauthorized(String),
    /// Malformed request.
    BadRequest(String),
    /// The content store is in the wrong phase.
    Conflict(String),
    /// Anything else.
    Internal(String),
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::InvalidStateTransition { .. } => Self::Conflict(err.to_string()),
            PlannerError::UnknownField(_) => Self::BadRequest(err.to_string()),
            PlannerError::InvalidCredentials | PlannerError::NotAuthenticated => {
                Self::Unauthorized(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

fn require_session(state: &AppState) -> Result<(), ApiError> {
    if state.session.is_authenticated() {
        Ok(())
    } else {
        warn!("Rejected API request without a session");
        Err(ApiError::Unauthorized("Not logged in".to_string()))
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all pages and API endpoints.
///
/// # Returns
///
/// An axum `Router` configured with:
/// - The landing, login, logout and planner pages
/// - All API routes under `/api`
/// - CORS middleware for development
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS for development (allow all origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/form", get(handle_get_form).put(handle_put_form))
        .route("/form/:field", put(handle_put_field))
        .route("/prompt", get(handle_prompt))
        .route("/generate", post(handle_generate))
        .route("/content", get(handle_get_content))
        .route("/content/toggle-edit", post(handle_toggle_edit))
        .route("/content/text", put(handle_set_text))
        .route("/content/save", post(handle_save))
        .route("/content/cancel", post(handle_cancel))
        .route("/export", get(handle_export));

    Router::new()
        .route("/", get(handle_landing))
        .route("/login", get(handle_login_page).post(handle_login))
        .route("/logout", post(handle_logout))
        .route(PLANNER_PATH, get(handle_planner))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Page Handlers
// ============================================================================

/// Handler for `GET /`.
async fn handle_landing(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(landing_page(&state.session.current()))
}

/// Handler for `GET /login`.
///
/// Re-reads the stored session first; a logged-in visitor goes straight to
/// the planner.
async fn handle_login_page(State(state): State<Arc<AppState>>) -> Response {
    let flag = state.session.reload().unwrap_or_else(|e| {
        warn!(error = %e, "Could not read stored session");
        state.session.current()
    });

    if flag.is_authenticated {
        Redirect::to(PLANNER_PATH).into_response()
    } else {
        Html(login_page(None)).into_response()
    }
}

/// Handler for `POST /login`.
async fn handle_login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    match state
        .session
        .login(state.verifier.as_ref(), &form.email, &form.password)
    {
        Ok(_) => Redirect::to(PLANNER_PATH).into_response(),
        Err(PlannerError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Html(login_page(Some(&PlannerError::InvalidCredentials.to_string()))),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Could not persist session");
            ApiError::from(e).into_response()
        }
    }
}

/// Handler for `POST /logout`.
async fn handle_logout(State(state): State<Arc<AppState>>) -> Result<Redirect, ApiError> {
    state.session.logout()?;
    Ok(Redirect::to("/login"))
}

/// Handler for `GET /lesson-planner`.
async fn handle_planner(State(state): State<Arc<AppState>>) -> Response {
    let props = {
        let workspace = state.workspace.lock().await;
        PlannerProps {
            flag: state.session.current(),
            form: workspace.form.clone(),
            content: workspace.content.clone(),
        }
    };

    match Gated::new(PlannerView, state.session.subscribe()).render(&props) {
        GateDecision::Render(html) => Html(html).into_response(),
        GateDecision::Redirect { to } => Redirect::to(to).into_response(),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// Handler for `GET /api/form`.
async fn handle_get_form(State(state): State<Arc<AppState>>) -> Result<Json<FormData>, ApiError> {
    require_session(&state)?;
    let workspace = state.workspace.lock().await;
    Ok(Json(workspace.form.clone()))
}

/// Handler for `PUT /api/form`.
async fn handle_put_form(
    State(state): State<Arc<AppState>>,
    Json(form): Json<FormData>,
) -> Result<Json<FormData>, ApiError> {
    require_session(&state)?;
    let mut workspace = state.workspace.lock().await;
    workspace.form = form;
    Ok(Json(workspace.form.clone()))
}

/// Handler for `PUT /api/form/:field`.
async fn handle_put_field(
    State(state): State<Arc<AppState>>,
    Path(field): Path<String>,
    Json(request): Json<FieldValue>,
) -> Result<Json<FormData>, ApiError> {
    require_session(&state)?;
    let field: FormField = field.parse()?;
    let mut workspace = state.workspace.lock().await;
    workspace.form.set(field, request.value);
    Ok(Json(workspace.form.clone()))
}

/// Handler for `GET /api/prompt`.
async fn handle_prompt(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PromptResponse>, ApiError> {
    require_session(&state)?;
    let workspace = state.workspace.lock().await;
    Ok(Json(PromptResponse {
        prompt: build_prompt(&workspace.form),
    }))
}

/// Handler for `POST /api/generate`.
///
/// The workspace lock is released while the request is in flight, so
/// overlapping generations are allowed; whichever resolves last wins.
/// Failures are logged and replaced by the fixed error message.
async fn handle_generate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentStore>, ApiError> {
    require_session(&state)?;

    let prompt = {
        let mut workspace = state.workspace.lock().await;
        workspace.content.begin_generation();
        build_prompt(&workspace.form)
    };

    info!(generator = state.generator.name(), "Generating lesson plan");
    let result = state.generator.generate(&prompt).await;

    let mut workspace = state.workspace.lock().await;
    match result {
        Ok(text) => workspace.content.complete_generation(text),
        Err(e) => {
            error!(kind = %e.kind, error = %e.message, "Error generating lesson plan");
            workspace.content.fail_generation();
        }
    }
    Ok(Json(workspace.content.clone()))
}

/// Handler for `GET /api/content`.
async fn handle_get_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentStore>, ApiError> {
    require_session(&state)?;
    let workspace = state.workspace.lock().await;
    Ok(Json(workspace.content.clone()))
}

/// Handler for `POST /api/content/toggle-edit`.
async fn handle_toggle_edit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentStore>, ApiError> {
    require_session(&state)?;
    let mut workspace = state.workspace.lock().await;
    workspace.content.toggle_edit()?;
    Ok(Json(workspace.content.clone()))
}

/// Handler for `PUT /api/content/text`.
async fn handle_set_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EditRequest>,
) -> Result<Json<ContentStore>, ApiError> {
    require_session(&state)?;
    let mut workspace = state.workspace.lock().await;
    workspace.content.set_editable(request.text)?;
    Ok(Json(workspace.content.clone()))
}

/// Handler for `POST /api/content/save`.
async fn handle_save(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentStore>, ApiError> {
    require_session(&state)?;
    let mut workspace = state.workspace.lock().await;
    workspace.content.save()?;
    Ok(Json(workspace.content.clone()))
}

/// Handler for `POST /api/content/cancel`.
async fn handle_cancel(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentStore>, ApiError> {
    require_session(&state)?;
    let mut workspace = state.workspace.lock().await;
    workspace.content.cancel()?;
    Ok(Json(workspace.content.clone()))
}

/// Handler for `GET /api/export`.
///
/// Exports the form and the editable text as an attachment. Blank fields
/// never cause a failure.
async fn handle_export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    require_session(&state)?;
    let format = query.format.unwrap_or_default();

    let document = {
        let workspace = state.workspace.lock().await;
        workspace.form.to_document(&workspace.content.editable)
    };

    let bytes = LessonPlanExporter::new(&document)
        .export(format)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let file_name = format.file_name(&state.config.export_file_stem());
    info!(format = %format, bytes = bytes.len(), file = %file_name, "Lesson plan exported");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ============================================================================
// Tests
// ============================================================================
