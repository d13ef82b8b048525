//! Error types for the lesson planner.
//!
//! This module defines the error hierarchy for planner operations, including
//! configuration loading, session persistence, content state transitions
//! and document export. Text generation failures have their own
//! [`GenerationError`], which callers log and replace with a fixed message.

use std::path::PathBuf;

/// A specialized `Result` type for lesson planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Errors that can occur while planning a lesson.
///
/// Error variants are organized by subsystem and include actionable suggestions
/// where possible to help users resolve issues.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your lesson.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// The submitted username/password pair was rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The lesson planner requires a logged-in session.
    #[error("Not logged in\n\nSuggestion: Run 'lesson login' first")]
    NotAuthenticated,

    /// Session file contains malformed JSON.
    #[error("Corrupted session file '{path}': {message}\n\nSuggestion: Run 'lesson logout' or remove the session file")]
    SessionFileCorrupted {
        /// Path to the corrupted session file.
        path: PathBuf,
        /// Description of the corruption.
        message: String,
    },

    // ========================================================================
    // Export Errors
    // ========================================================================
    /// Failed to produce or write an exported document.
    #[error("Failed to export lesson plan to '{path}': {message}\n\nSuggestion: Check write permissions for the output directory")]
    ExportWriteError {
        /// Path where the export was to be written.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Form Errors
    // ========================================================================
    /// A form field name did not match any known field.
    #[error("Unknown form field '{0}'\n\nSuggestion: Use one of topic, gradeLevel, mainConcept, materials, objectives, lessonOutline")]
    UnknownField(String),

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// Invalid state transition attempted.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },
}

impl PlannerError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `SessionFileCorrupted` error.
    #[must_use]
    pub fn session_corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SessionFileCorrupted {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ExportWriteError`.
    #[must_use]
    pub fn export_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ExportWriteError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

// ============================================================================
// Generation Errors
// ============================================================================

/// Categories of text generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// The API key was rejected (401/403).
    Authentication,
    /// Rate limit exceeded (429).
    RateLimit,
    /// Server error (5xx responses).
    Server,
    /// Network connectivity issues.
    Network,
    /// No API key in the environment.
    MissingApiKey,
    /// The response body did not contain generated text.
    MalformedResponse,
    /// Other unclassified errors.
    Other,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
            Self::MissingApiKey => write!(f, "missing_api_key"),
            Self::MalformedResponse => write!(f, "malformed_response"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl GenerationErrorKind {
    /// Returns a suggestion message for this error kind.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Authentication => "Check that your Gemini API key is valid",
            Self::RateLimit => "Wait a moment before generating again",
            Self::Server => "Retry later; the Gemini service may be experiencing issues",
            Self::Network => "Check your network connection",
            Self::MissingApiKey => "Export GEMINI_API_KEY (or the variable named by apiKeyEnv)",
            Self::MalformedResponse => "Check the configured model and apiBaseUrl",
            Self::Other => "Check the Gemini API status page",
        }
    }

    /// Classifies an HTTP status returned by the generation service.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimit,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }
}

/// A failed call to the text generation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Generation failed ({kind}): {message}\n\nSuggestion: {}", .kind.suggestion())]
pub struct GenerationError {
    /// What went wrong.
    pub kind: GenerationErrorKind,
    /// Detail from the client or the service.
    pub message: String,
}

impl GenerationError {
    /// Creates a new generation error.
    #[must_use]
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = PlannerError::session_corrupted("/tmp/session.json", "expected value");
        let msg = err.to_string();
        assert!(msg.contains("Corrupted session file"));
        assert!(msg.contains("/tmp/session.json"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_invalid_credentials_message_is_fixed() {
        assert_eq!(
            PlannerError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_generation_error_kind_display() {
        assert_eq!(GenerationErrorKind::RateLimit.to_string(), "rate_limit");
        assert_eq!(
            GenerationErrorKind::MissingApiKey.to_string(),
            "missing_api_key"
        );
    }

    #[test]
    fn test_generation_error_kind_from_status() {
        assert_eq!(
            GenerationErrorKind::from_status(401),
            GenerationErrorKind::Authentication
        );
        assert_eq!(
            GenerationErrorKind::from_status(403),
            GenerationErrorKind::Authentication
        );
        assert_eq!(
            GenerationErrorKind::from_status(429),
            GenerationErrorKind::RateLimit
        );
        assert_eq!(
            GenerationErrorKind::from_status(503),
            GenerationErrorKind::Server
        );
        assert_eq!(
            GenerationErrorKind::from_status(400),
            GenerationErrorKind::Other
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io(_)));
    }

    #[test]
    fn test_generation_error_display_includes_suggestion() {
        let err = GenerationError::new(GenerationErrorKind::Authentication, "API key not valid");
        let msg = err.to_string();
        assert!(msg.contains("authentication"));
        assert!(msg.contains("API key not valid"));
        assert!(msg.contains("Suggestion: Check that your Gemini API key is valid"));
    }
}
