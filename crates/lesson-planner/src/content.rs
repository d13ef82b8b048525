//! Generated content store and edit toggle.
//!
//! The store keeps two texts: the generated text exactly as returned by the
//! service, and an editable copy that is the only text displayed or exported.
//!
//! The phase transitions through these states:
//! - any -> `Empty` (`begin_generation`)
//! - any -> `Generated` (`complete_generation`, `fail_generation`)
//! - `Generated` <-> `Editing` (`toggle_edit`)
//! - `Editing` -> `Generated` (`save`, `cancel`)
//!
//! `cancel` keeps whatever was typed while editing. It behaves exactly like
//! `save`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlannerError, Result};

/// Text shown in place of a plan when generation fails.
pub const GENERATION_ERROR_MESSAGE: &str = "Error fetching lesson plan.";

// ============================================================================
// ContentPhase
// ============================================================================

/// Current phase of the content store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPhase {
    /// Nothing generated yet, or a generation is in flight.
    #[default]
    Empty,
    /// Generated text is available and shown rendered.
    Generated,
    /// The editable copy is open in an editor.
    Editing,
}

impl std::fmt::Display for ContentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Generated => write!(f, "generated"),
            Self::Editing => write!(f, "editing"),
        }
    }
}

// ============================================================================
// ContentStore
// ============================================================================

/// Generated text, its editable copy, and the edit toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStore {
    /// Current phase.
    pub phase: ContentPhase,
    /// Text as returned by the service (or the error message).
    pub generated: String,
    /// User-editable copy.
    pub editable: String,
    /// The last generation failed and nothing has been typed since.
    #[serde(default)]
    pub failed: bool,
}

impl ContentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the editor is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.phase == ContentPhase::Editing
    }

    /// Clears both texts and closes the editor before a request is sent.
    pub fn begin_generation(&mut self) {
        self.generated.clear();
        self.editable.clear();
        self.failed = false;
        self.phase = ContentPhase::Empty;
        debug!("Content cleared for new generation");
    }

    /// Stores a successful response as both the generated and editable text.
    pub fn complete_generation(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!(len = text.len(), "Lesson plan generated");
        self.editable.clone_from(&text);
        self.generated = text;
        self.failed = false;
        self.phase = ContentPhase::Generated;
    }

    /// Records a failed generation.
    ///
    /// The error message becomes the generated text; the editable copy stays
    /// empty, so exports fall back to their placeholder. The store is marked
    /// failed until the next generation or edit.
    pub fn fail_generation(&mut self) {
        self.generated = GENERATION_ERROR_MESSAGE.to_string();
        self.editable.clear();
        self.failed = true;
        self.phase = ContentPhase::Generated;
    }

    /// Opens or closes the editor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` when there is no content yet.
    pub fn toggle_edit(&mut self) -> Result<ContentPhase> {
        let next = match self.phase {
            ContentPhase::Generated => ContentPhase::Editing,
            ContentPhase::Editing => ContentPhase::Generated,
            ContentPhase::Empty => {
                return Err(PlannerError::invalid_transition(
                    self.phase,
                    ContentPhase::Editing,
                ))
            }
        };
        debug!(from = %self.phase, to = %next, "Edit toggled");
        self.phase = next;
        Ok(next)
    }

    /// Replaces the editable copy. Typed text replaces a failure notice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the editor is open.
    pub fn set_editable(&mut self, text: impl Into<String>) -> Result<()> {
        if !self.is_editing() {
            return Err(PlannerError::invalid_transition(
                self.phase,
                ContentPhase::Editing,
            ));
        }
        self.editable = text.into();
        self.failed = false;
        Ok(())
    }

    /// Closes the editor, keeping the edited text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the editor is open.
    pub fn save(&mut self) -> Result<()> {
        self.leave_editing()?;
        info!(len = self.editable.len(), "Edits saved");
        Ok(())
    }

    /// Closes the editor. The edited text is kept, exactly as with [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the editor is open.
    pub fn cancel(&mut self) -> Result<()> {
        self.leave_editing()?;
        debug!("Edit cancelled");
        Ok(())
    }

    fn leave_editing(&mut self) -> Result<()> {
        if !self.is_editing() {
            return Err(PlannerError::invalid_transition(
                self.phase,
                ContentPhase::Generated,
            ));
        }
        self.phase = ContentPhase::Generated;
        Ok(())
    }
}
