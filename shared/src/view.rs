//! Serializable projection of the `Model` handed to the shell.
//!
//! Every label is resolved through the model's catalog here so the shell
//! renders strings verbatim.

use serde::{Deserialize, Serialize};

use crate::data_store::CaseDataStore;
use crate::edit_buffer::{EditableFields, PanelMode};
use crate::i18n::{evidence_type_key, keys, status_key, Translate};
use crate::model::{Case, CaseEvidence, CaseNote, CaseStatus, EvidenceId, EvidenceType, Model, NoteId};
use crate::{format_timestamp, ToastKind, ToastMessage};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub code: Option<String>,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            code: t.code.clone(),
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderView {
    pub case_number: String,
    pub title: String,
    pub status: String,
    pub status_label: String,
    pub status_color: String,
    pub back_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InfoView {
    pub description_label: String,
    pub description: String,
    pub assigned_to_label: String,
    pub assigned_to: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_label: String,
    pub created_at_label: String,
    pub updated_at_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftView {
    pub title: String,
    pub description: String,
    pub status: String,
    pub assigned_to: String,
    pub status_options: Vec<OptionView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeView {
    Viewing {
        edit_label: String,
    },
    Editing {
        draft: DraftView,
        can_save: bool,
        can_cancel: bool,
        is_saving: bool,
        save_label: String,
        cancel_label: String,
        title_label: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceItemView {
    pub id: EvidenceId,
    pub headline: String,
    pub evidence_type: EvidenceType,
    pub notes: Option<String>,
    pub added_by: String,
    pub added_at: String,
    pub can_remove: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceSectionView {
    pub heading: String,
    pub count: usize,
    pub items: Vec<EvidenceItemView>,
    pub empty_label: String,
    pub add_label: String,
    pub remove_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteItemView {
    pub id: NoteId,
    pub note: String,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesSectionView {
    pub heading: String,
    pub count: usize,
    pub items: Vec<NoteItemView>,
    pub empty_label: String,
    pub draft: String,
    pub placeholder: String,
    pub add_label: String,
    pub can_add: bool,
    pub is_adding: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceModalView {
    pub heading: String,
    pub type_label: String,
    pub type_options: Vec<OptionView>,
    pub identifier_label: String,
    pub identifier: String,
    pub notes_label: String,
    pub notes: String,
    pub can_submit: bool,
    pub is_submitting: bool,
    pub submit_label: String,
    pub cancel_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CasePanelView {
    pub header: HeaderView,
    pub info: InfoView,
    pub mode: ModeView,
    pub evidence: EvidenceSectionView,
    pub notes: NotesSectionView,
    pub modal: Option<EvidenceModalView>,
    pub is_loading: bool,
    /// Set after a save until the owner supplies a refreshed case.
    pub pending_refresh: bool,
    pub proposed_case: Option<Case>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Closed,
    Open(Box<CasePanelView>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub state: ViewState,
    pub toast: Option<ToastView>,
}

impl ViewModel {
    #[must_use]
    pub fn panel(&self) -> Option<&CasePanelView> {
        match &self.state {
            ViewState::Open(panel) => Some(panel),
            ViewState::Closed => None,
        }
    }
}

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    let state = match model.displayed_case() {
        Some(case) => ViewState::Open(Box::new(panel_view(model, case))),
        None => ViewState::Closed,
    };

    ViewModel {
        state,
        toast: model.active_toast.as_ref().map(ToastView::from),
    }
}

fn panel_view(model: &Model, case: &Case) -> CasePanelView {
    let t = &model.catalog;

    CasePanelView {
        header: header_view(t, case),
        info: info_view(t, case),
        mode: mode_view(t, model.editor.mode()),
        evidence: evidence_view(t, &model.store),
        notes: notes_view(t, &model.store, &model.note_draft),
        modal: model.evidence_modal_open.then(|| modal_view(model)),
        is_loading: model.store.loading(),
        pending_refresh: model.proposed_case.is_some(),
        proposed_case: model.proposed_case.clone(),
    }
}

fn header_view(t: &impl Translate, case: &Case) -> HeaderView {
    HeaderView {
        case_number: case.case_number.clone(),
        title: case.title.clone(),
        status: case.status.as_str().to_string(),
        status_label: status_label(t, &case.status),
        status_color: case.status.color().hex().to_string(),
        back_label: t.t(keys::BACK),
    }
}

/// Known statuses go through the catalog; anything else is shown as sent.
fn status_label(t: &impl Translate, status: &CaseStatus) -> String {
    let label = if status.is_known() {
        t.translate(&status_key(status))
            .map_or_else(|| status.as_str().to_string(), str::to_string)
    } else {
        status.as_str().to_string()
    };
    label.to_uppercase()
}

fn info_view(t: &impl Translate, case: &Case) -> InfoView {
    InfoView {
        description_label: t.t(keys::DESCRIPTION),
        description: case
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| t.t(keys::NO_DESCRIPTION)),
        assigned_to_label: t.t(keys::ASSIGNED_TO),
        assigned_to: case
            .assigned_to
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| t.t(keys::UNASSIGNED)),
        created_by: case.created_by.clone(),
        created_at: format_timestamp(case.created_at),
        updated_at: format_timestamp(case.updated_at),
        created_by_label: t.t(keys::CREATED_BY),
        created_at_label: t.t(keys::CREATED_AT),
        updated_at_label: t.t(keys::UPDATED_AT),
    }
}

fn mode_view(t: &impl Translate, mode: &PanelMode) -> ModeView {
    match mode {
        PanelMode::Viewing => ModeView::Viewing {
            edit_label: t.t(keys::EDIT),
        },
        PanelMode::Editing {
            draft,
            save_in_flight,
        } => ModeView::Editing {
            draft: draft_view(t, draft),
            can_save: draft.is_committable() && !save_in_flight,
            can_cancel: !save_in_flight,
            is_saving: *save_in_flight,
            save_label: t.t(keys::SAVE),
            cancel_label: t.t(keys::CANCEL),
            title_label: t.t(keys::TITLE),
        },
    }
}

fn draft_view(t: &impl Translate, draft: &EditableFields) -> DraftView {
    let mut status_options: Vec<OptionView> = CaseStatus::SELECTABLE
        .iter()
        .map(|s| OptionView {
            value: s.as_str().to_string(),
            label: status_label(t, s),
            selected: *s == draft.status,
        })
        .collect();

    // Keep an unrecognised status selectable so saving does not silently change it.
    if !draft.status.is_known() {
        status_options.push(OptionView {
            value: draft.status.as_str().to_string(),
            label: status_label(t, &draft.status),
            selected: true,
        });
    }

    DraftView {
        title: draft.title.clone(),
        description: draft.description.clone().unwrap_or_default(),
        status: draft.status.as_str().to_string(),
        assigned_to: draft.assigned_to.clone().unwrap_or_default(),
        status_options,
    }
}

fn evidence_item(store: &CaseDataStore, evidence: &CaseEvidence) -> EvidenceItemView {
    EvidenceItemView {
        id: evidence.id,
        headline: evidence.headline(),
        evidence_type: evidence.evidence_type,
        notes: evidence.notes.clone().filter(|n| !n.is_empty()),
        added_by: evidence.added_by.clone(),
        added_at: format_timestamp(evidence.added_at),
        can_remove: !store.is_removing(evidence.id),
    }
}

fn evidence_view(t: &impl Translate, store: &CaseDataStore) -> EvidenceSectionView {
    EvidenceSectionView {
        heading: t.t(keys::EVIDENCE),
        count: store.evidence().len(),
        items: store.evidence().iter().map(|e| evidence_item(store, e)).collect(),
        empty_label: t.t(keys::NO_EVIDENCE),
        add_label: t.t(keys::ADD_EVIDENCE),
        remove_label: t.t(keys::REMOVE),
    }
}

fn note_item(note: &CaseNote) -> NoteItemView {
    NoteItemView {
        id: note.id,
        note: note.note.clone(),
        created_by: note.created_by.clone(),
        created_at: format_timestamp(note.created_at),
    }
}

fn notes_view(t: &impl Translate, store: &CaseDataStore, draft: &str) -> NotesSectionView {
    NotesSectionView {
        heading: t.t(keys::NOTES),
        count: store.notes().len(),
        items: store.notes().iter().map(note_item).collect(),
        empty_label: t.t(keys::NO_NOTES),
        draft: draft.to_string(),
        placeholder: t.t(keys::ADD_NOTE_PLACEHOLDER),
        add_label: t.t(keys::ADD_NOTE),
        can_add: !draft.trim().is_empty() && !store.is_adding_note(),
        is_adding: store.is_adding_note(),
    }
}

fn modal_view(model: &Model) -> EvidenceModalView {
    let t = &model.catalog;
    let form = &model.evidence_form;
    let is_submitting = model.store.is_adding_evidence();

    EvidenceModalView {
        heading: t.t(keys::ADD_EVIDENCE),
        type_label: t.t(keys::EVIDENCE_TYPE),
        type_options: EvidenceType::ALL
            .iter()
            .map(|ty| OptionView {
                value: ty.as_str().to_string(),
                label: t.t(&evidence_type_key(*ty)),
                selected: *ty == form.evidence_type,
            })
            .collect(),
        identifier_label: t.t(keys::EVIDENCE_IDENTIFIER),
        identifier: form.identifier.clone(),
        notes_label: t.t(keys::NOTES),
        notes: form.notes.clone(),
        can_submit: form.is_submittable() && !is_submitting,
        is_submitting,
        submit_label: t.t(keys::ADD),
        cancel_label: t.t(keys::CANCEL),
    }
}
