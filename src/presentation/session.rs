//! Edit session: which dossier is on screen and whether its form is writable
//!
//! Two modes. In `View` the form is read-only and documents can be generated.
//! In `Edit` the form is writable and generation is off. Leaving `Edit` with
//! unsaved changes needs an explicit confirmation from the operator.

use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    #[default]
    View,
    Edit,
}

/// Result of a request to move away from the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Done,
    /// Unsaved changes would be lost; ask the operator and retry with
    /// `confirmed = true`
    NeedsConfirmation,
}

pub const UNSAVED_CHANGES_WARNING: &str = "Vous avez des modifications non enregistrées. \
     Voulez-vous vraiment quitter sans enregistrer ?";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditSession {
    mode: Mode,
    /// `None` while nothing is selected or a new dossier is being typed in
    current: Option<i32>,
    dirty: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    pub fn current_dossier(&self) -> Option<i32> {
        self.current
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.is_editing() && self.dirty
    }

    fn guard(&self, confirmed: bool) -> Transition {
        if self.has_unsaved_changes() && !confirmed {
            Transition::NeedsConfirmation
        } else {
            Transition::Done
        }
    }

    /// Show another dossier, read-only
    pub fn select(&mut self, dossier_id: i32, confirmed: bool) -> Transition {
        let transition = self.guard(confirmed);
        if transition == Transition::Done {
            self.current = Some(dossier_id);
            self.mode = Mode::View;
            self.dirty = false;
        }
        transition
    }

    /// Blank form for a dossier that does not exist yet
    pub fn start_new(&mut self, confirmed: bool) -> Transition {
        let transition = self.guard(confirmed);
        if transition == Transition::Done {
            self.current = None;
            self.mode = Mode::Edit;
            self.dirty = false;
        }
        transition
    }

    /// Make the selected dossier writable
    pub fn begin_edit(&mut self) -> Result<(), DomainError> {
        if self.current.is_none() {
            return Err(DomainError::validation("Sélectionnez un dossier à modifier"));
        }
        if self.mode == Mode::View {
            self.mode = Mode::Edit;
            self.dirty = false;
        }
        Ok(())
    }

    /// Record a field edit. Ignored outside edit mode.
    pub fn mark_dirty(&mut self) {
        if self.is_editing() {
            self.dirty = true;
        }
    }

    /// Drop the edits and go back to the stored state of the dossier
    pub fn cancel(&mut self, confirmed: bool) -> Transition {
        let transition = self.guard(confirmed);
        if transition == Transition::Done {
            self.mode = Mode::View;
            self.dirty = false;
        }
        transition
    }

    /// Switching to another screen or closing the window
    pub fn leave(&mut self, confirmed: bool) -> Transition {
        self.cancel(confirmed)
    }

    /// A save went through: the stored dossier is now the one on screen
    pub fn saved(&mut self, dossier_id: i32) {
        self.current = Some(dossier_id);
        self.mode = Mode::View;
        self.dirty = false;
    }

    /// The dossier on screen was deleted
    pub fn deleted(&mut self, dossier_id: i32) {
        if self.current == Some(dossier_id) {
            self.current = None;
            self.mode = Mode::View;
            self.dirty = false;
        }
    }

    pub fn can_generate(&self) -> bool {
        self.mode == Mode::View && self.current.is_some()
    }

    pub fn can_backup(&self) -> bool {
        !self.is_editing()
    }

    /// Line-item grid rows are writable only in edit mode
    pub fn row_editable(&self) -> bool {
        self.is_editing()
    }
}
