//! Configuration types for the lesson planner.
//!
//! This module provides the `lesson.json` configuration: which Gemini model
//! and endpoint to call, where the API key comes from, where the session flag
//! and exported documents live, and the demo credentials accepted by the
//! login gate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "lesson.json";

/// Default Gemini model.
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Default Gemini REST endpoint.
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Default environment variable holding the API key.
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Default session flag location.
fn default_session_file() -> String {
    ".lesson/session.json".to_string()
}

/// Default output directory for exported documents.
fn default_output_dir() -> String {
    ".".to_string()
}

/// Default export file name.
fn default_export_file_name() -> String {
    "Lesson_Plan.pdf".to_string()
}

/// Default HTTP port for `lesson serve`.
const fn default_port() -> u16 {
    3000
}

fn default_username() -> String {
    "demouser".to_string()
}

fn default_password() -> String {
    "demopass".to_string()
}

/// Main configuration for the lesson planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gemini model used for generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Gemini REST API (without trailing slash).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Path to the persisted session flag.
    #[serde(default = "default_session_file")]
    pub session_file: String,

    /// Output directory for exported documents.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File name offered for the PDF download.
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,

    /// Port for the HTTP application.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Credentials accepted by the login gate.
    #[serde(default)]
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            session_file: default_session_file(),
            output_dir: default_output_dir(),
            export_file_name: default_export_file_name(),
            port: default_port(),
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `lesson.json` in the current directory. If found, loads and
    /// validates the configuration. If not found, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            PlannerError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `lesson.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::ConfigParseError` if the file exists but contains
    /// invalid JSON.
    ///
    /// Returns `PlannerError::ConfigValidationError` if the configuration values
    /// are invalid (e.g., port 0, empty paths).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(PlannerError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| PlannerError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::ConfigValidationError` if any validation check fails.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(PlannerError::config_validation(
                "model must not be empty",
                "Set model to a Gemini model name such as \"gemini-2.0-flash\" in your lesson.json",
            ));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(PlannerError::config_validation(
                format!("apiBaseUrl must be an http(s) URL, got '{}'", self.api_base_url),
                "Set apiBaseUrl to https://generativelanguage.googleapis.com/v1beta in your lesson.json",
            ));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(PlannerError::config_validation(
                "apiKeyEnv must not be empty",
                "Set apiKeyEnv to the environment variable holding your key (default GEMINI_API_KEY)",
            ));
        }

        if self.session_file.trim().is_empty() {
            return Err(PlannerError::config_validation(
                "sessionFile must not be empty",
                "Provide a session file path in your lesson.json",
            ));
        }

        if self.output_dir.trim().is_empty() {
            return Err(PlannerError::config_validation(
                "outputDir must not be empty",
                "Provide a valid output directory path in your lesson.json (use '.' for current directory)",
            ));
        }

        if Path::new(&self.export_file_name).file_stem().is_none() {
            return Err(PlannerError::config_validation(
                "exportFileName must name a file",
                "Set exportFileName to e.g. \"Lesson_Plan.pdf\" in your lesson.json",
            ));
        }

        if self.port == 0 {
            return Err(PlannerError::config_validation(
                "port must be greater than 0",
                "Set port to a free TCP port (default 3000) in your lesson.json",
            ));
        }

        if self.credentials.username.trim().is_empty() {
            return Err(PlannerError::config_validation(
                "credentials.username must not be empty",
                "Set credentials.username in your lesson.json",
            ));
        }

        Ok(())
    }

    /// Reads the API key from the environment.
    ///
    /// The variable is read on every call, so a key exported after startup is
    /// picked up. Blank values count as missing.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Stem of the export file name, e.g. `Lesson_Plan`.
    #[must_use]
    pub fn export_file_stem(&self) -> String {
        Path::new(&self.export_file_name)
            .file_stem()
            .map_or_else(
                || lesson_export::DEFAULT_FILE_STEM.to_string(),
                |stem| stem.to_string_lossy().into_owned(),
            )
    }

    /// Session file as a path.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(&self.session_file)
    }

    /// Output directory as a path.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

/// Username/password pair accepted by the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Accepted username.
    #[serde(default = "default_username")]
    pub username: String,
    /// Accepted password.
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}
