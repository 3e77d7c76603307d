//! Draft copy of the four editable case fields.
//!
//! The draft only exists inside `PanelMode::Editing`, so there is no way to
//! read a stale draft while viewing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::UpdateCaseArgs;
use crate::model::{Case, CaseId, CaseStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableFields {
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub assigned_to: Option<String>,
}

impl EditableFields {
    #[must_use]
    pub fn from_case(case: &Case) -> Self {
        Self {
            title: case.title.clone(),
            description: case.description.clone(),
            status: case.status.clone(),
            assigned_to: case.assigned_to.clone(),
        }
    }

    /// A new case value carrying these fields; `case` itself is untouched.
    #[must_use]
    pub fn applied_to(&self, case: &Case) -> Case {
        Case {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            assigned_to: self.assigned_to.clone(),
            ..case.clone()
        }
    }

    #[must_use]
    pub fn is_committable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    #[must_use]
    pub fn to_update_args(&self, case_id: CaseId) -> UpdateCaseArgs {
        UpdateCaseArgs {
            case_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            assigned_to: self.assigned_to.clone(),
        }
    }

    fn apply(&mut self, field: EditField) {
        match field {
            EditField::Title(title) => self.title = title,
            EditField::Description(text) => self.description = non_empty(text),
            EditField::Status(status) => self.status = status,
            EditField::AssignedTo(text) => self.assigned_to = non_empty(text),
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditField {
    Title(String),
    Description(String),
    Status(CaseStatus),
    AssignedTo(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PanelMode {
    #[default]
    Viewing,
    Editing {
        draft: EditableFields,
        save_in_flight: bool,
    },
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("not in edit mode")]
    NotEditing,

    #[error("already editing")]
    AlreadyEditing,

    #[error("a save is already in flight")]
    SaveInFlight,

    #[error("title must not be blank")]
    BlankTitle,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseEditBuffer {
    mode: PanelMode,
}

impl CaseEditBuffer {
    #[must_use]
    pub const fn mode(&self) -> &PanelMode {
        &self.mode
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.mode, PanelMode::Editing { .. })
    }

    #[must_use]
    pub const fn is_saving(&self) -> bool {
        matches!(
            self.mode,
            PanelMode::Editing {
                save_in_flight: true,
                ..
            }
        )
    }

    #[must_use]
    pub const fn draft(&self) -> Option<&EditableFields> {
        match &self.mode {
            PanelMode::Editing { draft, .. } => Some(draft),
            PanelMode::Viewing => None,
        }
    }

    /// `Viewing -> Editing`, seeding the draft from `case`.
    pub fn enter_edit(&mut self, case: &Case) -> Result<(), EditError> {
        if self.is_editing() {
            return Err(EditError::AlreadyEditing);
        }
        self.mode = PanelMode::Editing {
            draft: EditableFields::from_case(case),
            save_in_flight: false,
        };
        Ok(())
    }

    pub fn set_field(&mut self, field: EditField) -> Result<(), EditError> {
        match &mut self.mode {
            PanelMode::Editing { draft, .. } => {
                draft.apply(field);
                Ok(())
            }
            PanelMode::Viewing => Err(EditError::NotEditing),
        }
    }

    /// `Editing -> Viewing` without persisting anything.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        match self.mode {
            PanelMode::Viewing => Err(EditError::NotEditing),
            PanelMode::Editing {
                save_in_flight: true,
                ..
            } => Err(EditError::SaveInFlight),
            PanelMode::Editing { .. } => {
                self.mode = PanelMode::Viewing;
                Ok(())
            }
        }
    }

    /// Marks the save as in flight and returns the request arguments.
    /// The mode stays `Editing` until `finish_save` reports the outcome.
    pub fn begin_save(&mut self, case_id: CaseId) -> Result<UpdateCaseArgs, EditError> {
        match &mut self.mode {
            PanelMode::Viewing => Err(EditError::NotEditing),
            PanelMode::Editing {
                save_in_flight: true,
                ..
            } => Err(EditError::SaveInFlight),
            PanelMode::Editing {
                draft,
                save_in_flight,
            } => {
                if !draft.is_committable() {
                    return Err(EditError::BlankTitle);
                }
                *save_in_flight = true;
                Ok(draft.to_update_args(case_id))
            }
        }
    }

    /// On success returns the committed draft and goes back to `Viewing`.
    /// On failure the draft stays intact so the user can retry or cancel.
    /// Without a save in flight nothing changes and `None` is returned.
    pub fn finish_save(&mut self, succeeded: bool) -> Option<EditableFields> {
        let PanelMode::Editing { save_in_flight, .. } = &mut self.mode else {
            return None;
        };
        if !*save_in_flight {
            return None;
        }
        *save_in_flight = false;

        if !succeeded {
            return None;
        }

        match std::mem::take(&mut self.mode) {
            PanelMode::Editing { draft, .. } => Some(draft),
            PanelMode::Viewing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn robbery() -> Case {
        Case {
            id: CaseId(7),
            case_number: "C-0007".into(),
            title: "Robbery".into(),
            description: Some("Corner store".into()),
            status: CaseStatus::Open,
            assigned_to: Some("Det. Reyes".into()),
            created_by: "dispatch".into(),
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn test_enter_edit_seeds_draft() {
        let mut buffer = CaseEditBuffer::default();
        assert!(buffer.draft().is_none());

        buffer.enter_edit(&robbery()).unwrap();
        assert_eq!(buffer.draft(), Some(&EditableFields::from_case(&robbery())));
        assert_eq!(buffer.enter_edit(&robbery()), Err(EditError::AlreadyEditing));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let case = robbery();
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&case).unwrap();
        buffer.set_field(EditField::Title("Burglary".into())).unwrap();
        buffer.cancel().unwrap();

        assert_eq!(buffer.mode(), &PanelMode::Viewing);
        assert!(buffer.draft().is_none());
        assert_eq!(case.title, "Robbery");
    }

    #[test]
    fn test_set_field_outside_edit_mode() {
        let mut buffer = CaseEditBuffer::default();
        assert_eq!(
            buffer.set_field(EditField::Title("x".into())),
            Err(EditError::NotEditing)
        );
    }

    #[test]
    fn test_clearing_optional_fields() {
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&robbery()).unwrap();
        buffer.set_field(EditField::AssignedTo(String::new())).unwrap();
        buffer.set_field(EditField::Description(String::new())).unwrap();

        let draft = buffer.draft().unwrap();
        assert_eq!(draft.assigned_to, None);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_save_builds_args_from_draft() {
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&robbery()).unwrap();
        buffer.set_field(EditField::Status(CaseStatus::Closed)).unwrap();

        let args = buffer.begin_save(CaseId(7)).unwrap();
        assert_eq!(args.case_id, CaseId(7));
        assert_eq!(args.title, "Robbery");
        assert_eq!(args.status, CaseStatus::Closed);
        assert_eq!(args.description.as_deref(), Some("Corner store"));
        assert_eq!(args.assigned_to.as_deref(), Some("Det. Reyes"));
        assert!(buffer.is_saving());
        assert_eq!(buffer.begin_save(CaseId(7)), Err(EditError::SaveInFlight));
        assert_eq!(buffer.cancel(), Err(EditError::SaveInFlight));
    }

    #[test]
    fn test_blank_title_blocks_save() {
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&robbery()).unwrap();
        buffer.set_field(EditField::Title("   ".into())).unwrap();

        assert_eq!(buffer.begin_save(CaseId(7)), Err(EditError::BlankTitle));
        assert!(!buffer.is_saving());
    }

    #[test]
    fn test_failed_save_keeps_draft() {
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&robbery()).unwrap();
        buffer.set_field(EditField::Title("Armed robbery".into())).unwrap();
        buffer.begin_save(CaseId(7)).unwrap();

        assert_eq!(buffer.finish_save(false), None);
        assert_matches!(
            buffer.mode(),
            PanelMode::Editing { draft, save_in_flight: false } if draft.title == "Armed robbery"
        );
    }

    #[test]
    fn test_successful_save_returns_to_viewing() {
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&robbery()).unwrap();
        buffer.set_field(EditField::Title("Armed robbery".into())).unwrap();
        buffer.begin_save(CaseId(7)).unwrap();

        let committed = buffer.finish_save(true).unwrap();
        assert_eq!(committed.title, "Armed robbery");
        assert_eq!(buffer.mode(), &PanelMode::Viewing);

        let proposed = committed.applied_to(&robbery());
        assert_eq!(proposed.title, "Armed robbery");
        assert_eq!(proposed.case_number, "C-0007");
        assert_eq!(proposed.updated_at, 2);
    }

    #[test]
    fn test_finish_save_without_save_in_flight_keeps_draft() {
        let mut buffer = CaseEditBuffer::default();
        buffer.enter_edit(&robbery()).unwrap();
        buffer.set_field(EditField::Title("Never saved".into())).unwrap();

        assert_eq!(buffer.finish_save(true), None);
        assert_matches!(
            buffer.mode(),
            PanelMode::Editing { draft, save_in_flight: false } if draft.title == "Never saved"
        );

        let mut viewing = CaseEditBuffer::default();
        assert_eq!(viewing.finish_save(true), None);
        assert_eq!(viewing.mode(), &PanelMode::Viewing);
    }
}
