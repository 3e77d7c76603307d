use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PanelConfig;
use crate::data_store::{CaseDataStore, EvidenceForm};
use crate::edit_buffer::CaseEditBuffer;
use crate::i18n::Catalog;
use crate::{AppError, ToastKind, ToastMessage};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(CaseId);
typed_id!(EvidenceId);
typed_id!(NoteId);

// --- Case status ---

/// Lifecycle status of a case.
///
/// Statuses the panel does not know about are carried through verbatim in
/// `Other` so a newer server never breaks rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseStatus {
    #[default]
    Open,
    Active,
    Closed,
    Archived,
    Other(String),
}

impl CaseStatus {
    /// Statuses offered by the edit selector, in display order.
    pub const SELECTABLE: [Self; 4] = [Self::Open, Self::Active, Self::Closed, Self::Archived];

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "open" => Self::Open,
            "active" => Self::Active,
            "closed" => Self::Closed,
            "archived" => Self::Archived,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Archived => "archived",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    #[must_use]
    pub const fn color(&self) -> StatusColor {
        match self {
            Self::Open => StatusColor::Green,
            Self::Active => StatusColor::Blue,
            Self::Closed | Self::Other(_) => StatusColor::Grey,
            Self::Archived => StatusColor::DarkGrey,
        }
    }
}

impl From<String> for CaseStatus {
    fn from(s: String) -> Self {
        match Self::parse(&s) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<CaseStatus> for String {
    fn from(status: CaseStatus) -> Self {
        match status {
            CaseStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Green,
    Blue,
    Grey,
    DarkGrey,
}

impl StatusColor {
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Green => "#4CAF50",
            Self::Blue => "#2196F3",
            Self::Grey => "#9E9E9E",
            Self::DarkGrey => "#607D8B",
        }
    }
}

/// Pure lookup used by the header badge. Unrecognised values fall back to grey.
#[must_use]
pub fn status_color(status: &str) -> StatusColor {
    CaseStatus::parse(status).color()
}

// --- Records ---

/// Snapshot of a case as supplied by the list screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub case_number: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: CaseStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    #[default]
    Fingerprint,
    Dna,
    Magazine,
    #[serde(other)]
    Other,
}

impl EvidenceType {
    pub const ALL: [Self; 4] = [Self::Fingerprint, Self::Dna, Self::Magazine, Self::Other];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::Dna => "dna",
            Self::Magazine => "magazine",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEvidence {
    pub id: EvidenceId,
    pub evidence_type: EvidenceType,
    pub evidence_identifier: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub added_by: String,
    pub added_at: i64,
}

impl CaseEvidence {
    /// `TYPE: identifier`, the way the evidence list headlines an entry.
    #[must_use]
    pub fn headline(&self) -> String {
        format!(
            "{}: {}",
            self.evidence_type.as_str().to_uppercase(),
            self.evidence_identifier
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseNote {
    pub id: NoteId,
    pub note: String,
    pub created_by: String,
    pub created_at: i64,
}

// --- Root model ---

/// Everything the panel holds between events.
///
/// `case` is the committed snapshot owned by the list screen and is only
/// ever replaced wholesale. `proposed_case` is the post-save overlay shown
/// until the owner pushes a refreshed snapshot.
#[derive(Debug, Default)]
pub struct Model {
    pub case: Option<Case>,
    pub proposed_case: Option<Case>,
    pub editor: CaseEditBuffer,
    pub store: CaseDataStore,
    pub evidence_modal_open: bool,
    pub evidence_form: EvidenceForm,
    pub note_draft: String,
    pub catalog: Catalog,
    pub active_toast: Option<ToastMessage>,
    pub config: PanelConfig,
}

impl Model {
    /// The case as currently displayed: the post-save overlay if any,
    /// otherwise the committed snapshot.
    #[must_use]
    pub fn displayed_case(&self) -> Option<&Case> {
        self.proposed_case.as_ref().or(self.case.as_ref())
    }

    #[must_use]
    pub fn current_case_id(&self) -> Option<CaseId> {
        self.case.as_ref().map(|c| c.id)
    }

    #[must_use]
    pub fn is_current(&self, case_id: CaseId) -> bool {
        self.current_case_id() == Some(case_id)
    }

    pub fn show_toast(&mut self, toast: ToastMessage) {
        self.active_toast = Some(toast);
    }

    /// Error toast lasting as long as the configured toast duration.
    pub fn show_error(&mut self, error: &AppError) {
        let toast = ToastMessage::from_error(error).with_duration(self.config.toast_duration_ms);
        self.show_toast(toast);
    }

    pub fn show_success(&mut self, message: impl Into<String>) {
        self.show_toast(ToastMessage::new(message, ToastKind::Success));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    /// Drop every per-case substate. Used when attaching or detaching a case.
    pub fn reset_case_state(&mut self) {
        self.proposed_case = None;
        self.editor = CaseEditBuffer::default();
        self.evidence_modal_open = false;
        self.evidence_form = EvidenceForm::default();
        self.note_draft.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("open"), StatusColor::Green);
        assert_eq!(status_color("active"), StatusColor::Blue);
        assert_eq!(status_color("closed"), StatusColor::Grey);
        assert_eq!(status_color("archived"), StatusColor::DarkGrey);
        assert_eq!(status_color("reopened"), StatusColor::Grey);
        assert_eq!(status_color(""), StatusColor::Grey);
    }

    #[test]
    fn test_default_status_is_open() {
        assert_eq!(CaseStatus::default(), CaseStatus::Open);
    }

    #[test]
    fn test_unknown_status_round_trips_verbatim() {
        let status: CaseStatus = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(status, CaseStatus::Other("under_review".into()));
        assert!(!status.is_known());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"under_review\"");
    }

    #[test]
    fn test_case_deserializes_with_nulls() {
        let case: Case = serde_json::from_value(serde_json::json!({
            "id": 7,
            "case_number": "C-0007",
            "title": "Robbery",
            "description": null,
            "status": "open",
            "assigned_to": null,
            "created_by": "dispatch",
            "created_at": 1_700_000_000_000_i64,
            "updated_at": 1_700_000_000_000_i64
        }))
        .unwrap();

        assert_eq!(case.id, CaseId(7));
        assert_eq!(case.status, CaseStatus::Open);
        assert!(case.description.is_none());
        assert!(case.assigned_to.is_none());
    }

    #[test]
    fn test_unknown_evidence_type_maps_to_other() {
        let evidence: CaseEvidence = serde_json::from_value(serde_json::json!({
            "id": 3,
            "evidence_type": "footprint",
            "evidence_identifier": "FP-1",
            "added_by": "officer",
            "added_at": 0
        }))
        .unwrap();

        assert_eq!(evidence.evidence_type, EvidenceType::Other);
        assert_eq!(evidence.notes, None);
        assert_eq!(evidence.headline(), "OTHER: FP-1");
    }

    #[test]
    fn test_displayed_case_prefers_proposal() {
        let committed = Case {
            id: CaseId(1),
            case_number: "C-1".into(),
            title: "Old".into(),
            description: None,
            status: CaseStatus::Open,
            assigned_to: None,
            created_by: "a".into(),
            created_at: 0,
            updated_at: 0,
        };
        let mut model = Model {
            case: Some(committed.clone()),
            ..Model::default()
        };
        assert_eq!(model.displayed_case(), Some(&committed));

        let proposed = Case {
            title: "New".into(),
            ..committed.clone()
        };
        model.proposed_case = Some(proposed.clone());
        assert_eq!(model.displayed_case(), Some(&proposed));
        assert_eq!(model.case.as_ref().map(|c| c.title.as_str()), Some("Old"));
    }
}
