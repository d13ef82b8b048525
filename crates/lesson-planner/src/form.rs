//! Lesson form state.
//!
//! The form is a fixed set of six free-text fields. Values are never
//! validated; empty strings are valid everywhere.

use std::str::FromStr;

use lesson_export::LessonPlanDocument;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Identifier of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    /// Lesson topic.
    Topic,
    /// Target grade level.
    GradeLevel,
    /// Main concept and subtopics.
    MainConcept,
    /// Materials needed.
    Materials,
    /// Learning objectives.
    Objectives,
    /// Lesson outline.
    LessonOutline,
}

impl FormField {
    /// Every field, in display order.
    pub const ALL: [Self; 6] = [
        Self::Topic,
        Self::GradeLevel,
        Self::MainConcept,
        Self::Materials,
        Self::Objectives,
        Self::LessonOutline,
    ];

    /// Identifier used in JSON and URLs.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::GradeLevel => "gradeLevel",
            Self::MainConcept => "mainConcept",
            Self::Materials => "materials",
            Self::Objectives => "objectives",
            Self::LessonOutline => "lessonOutline",
        }
    }

    /// Human-readable label shown next to the input.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Topic => "Topic",
            Self::GradeLevel => "Grade Level",
            Self::MainConcept => "Main Concept & Subtopics",
            Self::Materials => "Materials Needed",
            Self::Objectives => "Learning Objectives",
            Self::LessonOutline => "Lesson Outline",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FormField {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| PlannerError::UnknownField(s.to_string()))
    }
}

/// Values of the six lesson form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
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
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of one field.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Topic => &self.topic,
            FormField::GradeLevel => &self.grade_level,
            FormField::MainConcept => &self.main_concept,
            FormField::Materials => &self.materials,
            FormField::Objectives => &self.objectives,
            FormField::LessonOutline => &self.lesson_outline,
        }
    }

    /// Replaces the value of one field. Other fields are untouched.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Topic => &mut self.topic,
            FormField::GradeLevel => &mut self.grade_level,
            FormField::MainConcept => &mut self.main_concept,
            FormField::Materials => &mut self.materials,
            FormField::Objectives => &mut self.objectives,
            FormField::LessonOutline => &mut self.lesson_outline,
        };
        *slot = value.into();
    }

    /// Pairs every field with its current value, in display order.
    pub fn entries(&self) -> impl Iterator<Item = (FormField, &str)> {
        FormField::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Builds the export input from this form and the editable content.
    #[must_use]
    pub fn to_document(&self, content: &str) -> LessonPlanDocument {
        LessonPlanDocument {
            topic: self.topic.clone(),
            grade_level: self.grade_level.clone(),
            main_concept: self.main_concept.clone(),
            materials: self.materials.clone(),
            objectives: self.objectives.clone(),
            lesson_outline: self.lesson_outline.clone(),
            content: content.to_string(),
        }
    }
}
