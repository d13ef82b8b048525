//! Prompt construction.
//!
//! [`build_prompt`] is a pure function of the form: the same form always
//! yields the same prompt, and every field value appears verbatim next to its
//! label.

use std::fmt::Write;

use crate::form::FormData;

/// Opening instruction sent before the field list.
pub const PROMPT_PREAMBLE: &str = "Create a structured lesson plan that should contain Detailed lesson content, Suggested classroom activities, Assessment questions with the following details:";

/// Closing instruction listing the sections the plan must contain.
pub const PROMPT_CLOSING: &str = "Ensure that sections such as Topic, Grade Level, Main Concept & Subtopics, Materials Needed, Learning Objectives, Lesson Outline, and Assessment are properly structured";

/// Renders the form into the generation prompt.
///
/// Empty fields are interpolated as empty text.
#[must_use]
pub fn build_prompt(form: &FormData) -> String {
    let mut prompt = String::with_capacity(512);

    let _ = writeln!(prompt, "{PROMPT_PREAMBLE}");
    let _ = writeln!(prompt);
    for (field, value) in form.entries() {
        let _ = writeln!(prompt, "- {}: {value}", field.label());
    }
    let _ = writeln!(prompt);
    prompt.push_str(PROMPT_CLOSING);

    prompt
}
