//! JSON export of a lesson plan.
//!
//! This module provides [`JsonGenerator`] for serializing a
//! [`ResolvedLessonPlan`] as pretty-printed JSON. Defaults are
//! already applied, so consumers never see blank fields.
//!
//! # Example
//!
//! ```rust
//! use lesson_export::LessonPlanDocument;
//! use lesson_export::json::JsonGenerator;
//!
//! let plan = LessonPlanDocument::default().resolve();
//! let json = JsonGenerator::new(&plan).generate().unwrap();
//! assert!(json.contains("\"topic\": \"Not provided\""));
//! ```

use crate::{ExportError, ResolvedLessonPlan, Result};

/// JSON lesson plan generator.
pub struct JsonGenerator<'a> {
    plan: &'a ResolvedLessonPlan,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given plan.
    #[must_use]
    pub const fn new(plan: &'a ResolvedLessonPlan) -> Self {
        Self { plan }
    }

    /// Generates pretty-printed JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string_pretty(self.plan).map_err(ExportError::from)
    }
}
