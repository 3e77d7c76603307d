//! Read-only key to string lookup, injected by the shell.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{CaseStatus, EvidenceType};

pub const KEY_PREFIX: &str = "laptop.desktop_screen.cases_app";

pub mod keys {
    pub const BACK: &str = "laptop.desktop_screen.cases_app.back";
    pub const EDIT: &str = "laptop.desktop_screen.cases_app.edit";
    pub const CANCEL: &str = "laptop.desktop_screen.cases_app.cancel";
    pub const SAVE: &str = "laptop.desktop_screen.cases_app.save";
    pub const TITLE: &str = "laptop.desktop_screen.cases_app.title";
    pub const DESCRIPTION: &str = "laptop.desktop_screen.cases_app.description";
    pub const NO_DESCRIPTION: &str = "laptop.desktop_screen.cases_app.no_description";
    pub const ASSIGNED_TO: &str = "laptop.desktop_screen.cases_app.assigned_to";
    pub const UNASSIGNED: &str = "laptop.desktop_screen.cases_app.unassigned";
    pub const CREATED_BY: &str = "laptop.desktop_screen.cases_app.created_by";
    pub const CREATED_AT: &str = "laptop.desktop_screen.cases_app.created_at";
    pub const UPDATED_AT: &str = "laptop.desktop_screen.cases_app.updated_at";
    pub const EVIDENCE: &str = "laptop.desktop_screen.cases_app.evidence";
    pub const ADD_EVIDENCE: &str = "laptop.desktop_screen.cases_app.add_evidence";
    pub const NO_EVIDENCE: &str = "laptop.desktop_screen.cases_app.no_evidence";
    pub const REMOVE: &str = "laptop.desktop_screen.cases_app.remove";
    pub const NOTES: &str = "laptop.desktop_screen.cases_app.notes";
    pub const ADD_NOTE: &str = "laptop.desktop_screen.cases_app.add_note";
    pub const ADD_NOTE_PLACEHOLDER: &str = "laptop.desktop_screen.cases_app.add_note_placeholder";
    pub const NO_NOTES: &str = "laptop.desktop_screen.cases_app.no_notes";
    pub const EVIDENCE_TYPE: &str = "laptop.desktop_screen.cases_app.evidence_type";
    pub const EVIDENCE_IDENTIFIER: &str = "laptop.desktop_screen.cases_app.evidence_identifier";
    pub const ADD: &str = "laptop.desktop_screen.cases_app.add";
}

pub trait Translate {
    fn translate(&self, key: &str) -> Option<&str>;

    /// Looks `key` up, falling back to the key itself so a missing entry is
    /// visible rather than blank.
    fn t(&self, key: &str) -> String {
        self.translate(key).unwrap_or(key).to_string()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse translations: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("translation root must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(&value)
    }

    /// Flattens a nested translation document into dotted keys.
    /// Non-string leaves are ignored.
    pub fn from_json_value(value: &Value) -> Result<Self, CatalogError> {
        let Value::Object(map) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut entries = HashMap::new();
        let mut stack: Vec<(String, &Value)> = map
            .iter()
            .map(|(k, v)| (k.clone(), v))
            .collect();

        while let Some((path, node)) = stack.pop() {
            match node {
                Value::String(s) => {
                    entries.insert(path, s.clone());
                }
                Value::Object(children) => {
                    stack.extend(
                        children
                            .iter()
                            .map(|(k, v)| (format!("{path}.{k}"), v)),
                    );
                }
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

#[must_use]
pub fn status_key(status: &CaseStatus) -> String {
    format!("{KEY_PREFIX}.status_{}", status.as_str())
}

#[must_use]
pub fn evidence_type_key(evidence_type: EvidenceType) -> String {
    format!("{KEY_PREFIX}.evidence_{}", evidence_type.as_str())
}
