//! Lesson Planner
//!
//! Turns a six-field lesson form into a prompt, sends it to Gemini, keeps the
//! generated plan in an editable store, and serves it behind a simple login
//! gate.

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod gate;
pub mod generation;
pub mod pages;
pub mod prompt;
pub mod session;

pub use api::{
    create_router, AppState, EditRequest, ErrorResponse, ExportQuery, FieldValue, LessonWorkspace,
    LoginForm, PromptResponse, PLANNER_PATH,
};
pub use config::{Config, Credentials, CONFIG_FILE_NAME};
pub use content::{ContentPhase, ContentStore, GENERATION_ERROR_MESSAGE};
pub use error::{GenerationError, GenerationErrorKind, PlannerError, Result};
pub use form::{FormData, FormField};
pub use gate::{GateDecision, Gated, View, LOGIN_PATH};
pub use generation::{GeminiClient, TextGenerator};
pub use pages::{PlannerProps, PlannerView};
pub use prompt::build_prompt;
pub use session::{
    load_flag, CredentialVerifier, FileSessionRepository, LiteralCredentialVerifier,
    MemorySessionRepository, SessionFlag, SessionRepository, SessionStore,
};
