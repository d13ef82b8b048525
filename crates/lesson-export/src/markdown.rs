//! Markdown export of a lesson plan.
//!
//! This module provides the [`MarkdownGenerator`] struct for converting a
//! [`ResolvedLessonPlan`] into a Markdown document with the same sections as
//! the PDF export:
//!
//! - A details table with the six form fields
//! - The fixed activity table
//! - The generated lesson plan, verbatim
//! - The notes footer
//!
//! # Example
//!
//! ```rust
//! use lesson_export::{LessonPlanDocument, MarkdownGenerator};
//!
//! let plan = LessonPlanDocument::default().resolve();
//! let markdown = MarkdownGenerator::new(&plan).generate();
//! assert!(markdown.contains("# LESSON PLAN"));
//! ```

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::{ResolvedLessonPlan, ACTIVITY_HEADINGS};

/// Generates Markdown documents from a resolved lesson plan.
pub struct MarkdownGenerator<'a> {
    plan: &'a ResolvedLessonPlan,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given plan.
    #[must_use]
    pub const fn new(plan: &'a ResolvedLessonPlan) -> Self {
        Self { plan }
    }

    /// Generates the complete Markdown document.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_details(&mut output);
        self.write_activities(&mut output);
        self.write_content(&mut output);
        self.write_notes(&mut output);
        Self::write_footer(&mut output);

        output
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(output, "# {}\n", escape_markdown(&self.plan.title));
    }

    /// Writes the form fields as a two-column table.
    fn write_details(&self, output: &mut String) {
        let plan = self.plan;

        let _ = writeln!(output, "## Lesson Details\n");
        let _ = writeln!(output, "| Field | Value |");
        let _ = writeln!(output, "|-------|-------|");
        for (label, value) in [
            ("Topic", &plan.topic),
            ("Grade Level", &plan.grade_level),
            ("Main Concept & Subtopics", &plan.main_concept),
            ("Materials Needed", &plan.materials),
            ("Learning Objectives", &plan.objectives),
            ("Lesson Outline", &plan.lesson_outline),
        ] {
            let _ = writeln!(output, "| {label} | {} |", escape_markdown(value));
        }
        let _ = writeln!(output);
    }

    fn write_activities(&self, output: &mut String) {
        let [duration, guide, remarks] = ACTIVITY_HEADINGS;

        let _ = writeln!(output, "## Activities\n");
        let _ = writeln!(output, "| {duration} | {guide} | {remarks} |");
        let _ = writeln!(output, "|----------|-------|---------|");
        for row in &self.plan.activities {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                escape_markdown(row.duration),
                escape_markdown(row.guide),
                escape_markdown(row.remarks)
            );
        }
        let _ = writeln!(output);
    }

    /// Writes the generated plan. It is already markdown, so it is not escaped.
    fn write_content(&self, output: &mut String) {
        let _ = writeln!(output, "## AI-Generated Lesson Plan\n");
        let _ = writeln!(output, "{}\n", self.plan.content.trim_end());
    }

    fn write_notes(&self, output: &mut String) {
        let _ = writeln!(output, "## Notes\n");
        let _ = writeln!(output, "{}\n", self.plan.notes);
    }

    fn write_footer(output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&Utc::now());
        let _ = writeln!(output, "*Generated by Lesson Planner at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a timestamp as "YYYY-MM-DD HH:MM:SS UTC".
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Escapes special Markdown characters in text.
///
/// Keeps user-entered field values from being interpreted as Markdown
/// formatting or breaking the table.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '(' | ')' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => {
                result.push_str("<br>");
            }
            '\r' => {}
            _ => result.push(ch),
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
