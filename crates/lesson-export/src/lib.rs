//! Lesson Plan Export
//!
//! This crate turns a lesson plan (the six form fields plus the edited,
//! AI-generated content) into downloadable documents, and renders generated
//! markdown for display.
//!
//! # Types
//!
//! - [`LessonPlanDocument`] - Raw export input, exactly as the user left it
//! - [`ResolvedLessonPlan`] - The document with defaults applied, shared by all generators
//! - [`ActivityRow`] - One row of the fixed activity table
//!
//! # Generators
//!
//! - [`pdf::PdfGenerator`] - Paginated PDF output (the default download)
//! - [`MarkdownGenerator`] - Markdown document with the same sections
//! - [`json::JsonGenerator`] - JSON document for programmatic use
//!
//! # Example
//!
//! ```rust
//! use lesson_export::{ExportFormat, LessonPlanDocument, LessonPlanExporter};
//!
//! let document = LessonPlanDocument {
//!     topic: "Photosynthesis".to_string(),
//!     ..Default::default()
//! };
//!
//! let exporter = LessonPlanExporter::new(&document);
//! let bytes = exporter.export(ExportFormat::Pdf).unwrap();
//! assert!(bytes.starts_with(b"%PDF"));
//! ```

pub mod json;
pub mod layout;
mod markdown;
pub mod pdf;
pub mod render;

pub use layout::{layout_document, DocumentLayout, DrawOp, FontWeight, Page};
pub use markdown::MarkdownGenerator;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during document export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to serialize the document to JSON.
    #[error("failed to serialize lesson plan: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write export files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF backend rejected the document.
    #[error("failed to build PDF: {0}")]
    Pdf(String),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

// ============================================================================
// Fixed Document Text
// ============================================================================

/// Title printed at the top of every exported document.
pub const DOCUMENT_TITLE: &str = "LESSON PLAN";

/// Substituted for any blank form field.
pub const NOT_PROVIDED: &str = "Not provided";

/// Substituted when there is no generated content to export.
pub const NO_CONTENT_PLACEHOLDER: &str = "No AI-generated content available";

/// Body of the static notes footer.
pub const NOTES_TEXT: &str = "Include any pre-lesson reminders or post-lesson reflections here.";

/// Default file stem for downloads (`Lesson_Plan.pdf`, `Lesson_Plan.md`, ...).
pub const DEFAULT_FILE_STEM: &str = "Lesson_Plan";

/// A row of the activity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    /// Time allotted to the activity.
    pub duration: &'static str,
    /// What happens in the class.
    pub guide: &'static str,
    /// Short remark.
    pub remarks: &'static str,
}

/// The activity table printed in every export.
///
/// The rows are fixed; they are not derived from the lesson outline field.
pub const ACTIVITY_TABLE: [ActivityRow; 5] = [
    ActivityRow {
        duration: "10 min",
        guide: "Introduction & Warm-Up",
        remarks: "Brief Overview",
    },
    ActivityRow {
        duration: "20 min",
        guide: "Main Lesson Explanation",
        remarks: "Detailed Concepts",
    },
    ActivityRow {
        duration: "15 min",
        guide: "Activity/Hands-on Work",
        remarks: "Group Activity",
    },
    ActivityRow {
        duration: "10 min",
        guide: "Q&A and Discussion",
        remarks: "Class Participation",
    },
    ActivityRow {
        duration: "5 min",
        guide: "Summary & Homework",
        remarks: "Wrap-up",
    },
];

/// Column headings of the activity table.
pub const ACTIVITY_HEADINGS: [&str; 3] = ["Duration", "Guide", "Remarks"];

// ============================================================================
// Export Input
// ============================================================================

/// Everything an export needs, exactly as the user left it.
///
/// This is a local copy of the planner's form fields so this crate does not
/// depend on the planner. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanDocument {
    /// Lesson topic.
    #[serde(default)]
    pub topic: String,
    /// Target grade level.
    #[serde(default)]
    pub grade_level: String,
    /// Main concept and subtopics.
    #[serde(default)]
    pub main_concept: String,
    /// Materials needed.
    #[serde(default)]
    pub materials: String,
    /// Learning objectives.
    #[serde(default)]
    pub objectives: String,
    /// Lesson outline.
    #[serde(default)]
    pub lesson_outline: String,
    /// The editable copy of the generated lesson plan.
    #[serde(default)]
    pub content: String,
}

impl LessonPlanDocument {
    /// Applies the export defaults.
    ///
    /// Blank fields (empty or whitespace only) become [`NOT_PROVIDED`] and
    /// blank content becomes [`NO_CONTENT_PLACEHOLDER`]. Never fails.
    #[must_use]
    pub fn resolve(&self) -> ResolvedLessonPlan {
        ResolvedLessonPlan {
            title: DOCUMENT_TITLE.to_string(),
            topic: or_not_provided(&self.topic),
            grade_level: or_not_provided(&self.grade_level),
            main_concept: or_not_provided(&self.main_concept),
            materials: or_not_provided(&self.materials),
            objectives: or_not_provided(&self.objectives),
            lesson_outline: or_not_provided(&self.lesson_outline),
            activities: ACTIVITY_TABLE.to_vec(),
            content: if self.content.trim().is_empty() {
                NO_CONTENT_PLACEHOLDER.to_string()
            } else {
                self.content.clone()
            },
            notes: NOTES_TEXT.to_string(),
        }
    }
}

fn or_not_provided(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

/// A lesson plan with every default applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLessonPlan {
    /// Document title.
    pub title: String,
    /// Lesson topic.
    pub topic: String,
    /// Target grade level.
    pub grade_level: String,
    /// Main concept and subtopics.
    pub main_concept: String,
    /// Materials needed.
    pub materials: String,
    /// Learning objectives.
    pub objectives: String,
    /// Lesson outline.
    pub lesson_outline: String,
    /// Fixed activity table.
    pub activities: Vec<ActivityRow>,
    /// Generated lesson plan text.
    pub content: String,
    /// Notes footer.
    pub notes: String,
}

// ============================================================================
// Export Formats
// ============================================================================

/// Output formats supported by [`LessonPlanExporter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Paginated PDF document.
    #[default]
    Pdf,
    /// Markdown document.
    Markdown,
    /// Pretty-printed JSON document.
    Json,
}

impl ExportFormat {
    /// File extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }

    /// MIME type for this format.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    /// Builds the download file name from a stem, e.g. `Lesson_Plan.pdf`.
    #[must_use]
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
        }
    }
}

// ============================================================================
// Exporter
// ============================================================================

/// Produces any supported export for a lesson plan.
pub struct LessonPlanExporter<'a> {
    document: &'a LessonPlanDocument,
}

impl<'a> LessonPlanExporter<'a> {
    /// Creates an exporter for the given document.
    #[must_use]
    pub const fn new(document: &'a LessonPlanDocument) -> Self {
        Self { document }
    }

    /// Renders the document in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Pdf`] or [`ExportError::Serialization`] if the
    /// generator for `format` fails.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let plan = self.document.resolve();
        match format {
            ExportFormat::Pdf => {
                let layout = layout_document(&plan);
                pdf::PdfGenerator::new(&layout).generate()
            }
            ExportFormat::Markdown => Ok(MarkdownGenerator::new(&plan).generate().into_bytes()),
            ExportFormat::Json => Ok(json::JsonGenerator::new(&plan).generate()?.into_bytes()),
        }
    }

    /// Writes the export into `dir` as `{stem}.{ext}` and returns the path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the directory or file cannot be written.
    pub fn write_to_dir(&self, format: ExportFormat, dir: &Path, stem: &str) -> Result<PathBuf> {
        let bytes = self.export(format)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format.file_name(stem));
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), format = %format, "Lesson plan exported");
        Ok(path)
    }
}

// ============================================================================
// Tests
// ============================================================================
