use serde::{Deserialize, Serialize};

use crate::capabilities::RpcResult;
use crate::config::PanelConfig;
use crate::data_store::{EvidenceFormField, RefreshTicket, SessionToken};
use crate::edit_buffer::EditField;
use crate::model::{Case, EvidenceId};

// --- Event enum: large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Noop,

    // Shell setup
    Configured {
        config: PanelConfig,
    },
    /// Raw translation document as fetched by the shell.
    LocaleLoaded {
        document: String,
    },

    // Case lifecycle, driven by the list screen
    CaseOpened {
        case: Box<Case>,
    },
    CaseReplaced {
        case: Box<Case>,
    },
    BackRequested,
    RefreshRequested,

    // Edit flow
    EditRequested,
    EditFieldChanged(EditField),
    CancelEditRequested,
    SaveRequested,

    // Notes
    NoteDraftChanged {
        text: String,
    },
    AddNoteRequested,

    // Evidence
    EvidenceModalOpened,
    EvidenceModalClosed,
    EvidenceFormChanged(EvidenceFormField),
    AddEvidenceRequested,
    RemoveEvidenceRequested {
        evidence_id: EvidenceId,
    },

    DismissToast,

    // Capability responses (boxed to keep enum size small)
    EvidenceFetched {
        ticket: RefreshTicket,
        result: Box<RpcResult>,
    },
    NotesFetched {
        ticket: RefreshTicket,
        result: Box<RpcResult>,
    },
    SaveResponse {
        session: SessionToken,
        result: Box<RpcResult>,
    },
    AddNoteResponse {
        session: SessionToken,
        result: Box<RpcResult>,
    },
    AddEvidenceResponse {
        session: SessionToken,
        result: Box<RpcResult>,
    },
    RemoveEvidenceResponse {
        session: SessionToken,
        evidence_id: EvidenceId,
        result: Box<RpcResult>,
    },
}

impl Event {
    /// Stable name for log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configured { .. } => "configured",
            Self::LocaleLoaded { .. } => "locale_loaded",
            Self::CaseOpened { .. } => "case_opened",
            Self::CaseReplaced { .. } => "case_replaced",
            Self::BackRequested => "back_requested",
            Self::RefreshRequested => "refresh_requested",
            Self::EditRequested => "edit_requested",
            Self::EditFieldChanged(_) => "edit_field_changed",
            Self::CancelEditRequested => "cancel_edit_requested",
            Self::SaveRequested => "save_requested",
            Self::NoteDraftChanged { .. } => "note_draft_changed",
            Self::AddNoteRequested => "add_note_requested",
            Self::EvidenceModalOpened => "evidence_modal_opened",
            Self::EvidenceModalClosed => "evidence_modal_closed",
            Self::EvidenceFormChanged(_) => "evidence_form_changed",
            Self::AddEvidenceRequested => "add_evidence_requested",
            Self::RemoveEvidenceRequested { .. } => "remove_evidence_requested",
            Self::DismissToast => "dismiss_toast",
            Self::EvidenceFetched { .. } => "evidence_fetched",
            Self::NotesFetched { .. } => "notes_fetched",
            Self::SaveResponse { .. } => "save_response",
            Self::AddNoteResponse { .. } => "add_note_response",
            Self::AddEvidenceResponse { .. } => "add_evidence_response",
            Self::RemoveEvidenceResponse { .. } => "remove_evidence_response",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::BackRequested
                | Self::RefreshRequested
                | Self::EditRequested
                | Self::EditFieldChanged(_)
                | Self::CancelEditRequested
                | Self::SaveRequested
                | Self::NoteDraftChanged { .. }
                | Self::AddNoteRequested
                | Self::EvidenceModalOpened
                | Self::EvidenceModalClosed
                | Self::EvidenceFormChanged(_)
                | Self::AddEvidenceRequested
                | Self::RemoveEvidenceRequested { .. }
                | Self::DismissToast
        )
    }
}
