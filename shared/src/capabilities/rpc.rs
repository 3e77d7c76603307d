//! Remote procedure capability.
//!
//! Every server interaction is a single named call carrying JSON arguments
//! and resolving to a JSON value. The shell decides how the call travels
//! (see `http.rs` for the HTTP routing).

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{CaseId, CaseStatus, EvidenceId, EvidenceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Procedure {
    GetCaseEvidence,
    GetCaseNotes,
    UpdateCase,
    AddCaseNote,
    AddEvidenceToCase,
    RemoveEvidenceFromCase,
}

impl Procedure {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetCaseEvidence => "evidences:getCaseEvidence",
            Self::GetCaseNotes => "evidences:getCaseNotes",
            Self::UpdateCase => "evidences:updateCase",
            Self::AddCaseNote => "evidences:addCaseNote",
            Self::AddEvidenceToCase => "evidences:addEvidenceToCase",
            Self::RemoveEvidenceFromCase => "evidences:removeEvidenceFromCase",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::GetCaseEvidence,
            Self::GetCaseNotes,
            Self::UpdateCase,
            Self::AddCaseNote,
            Self::AddEvidenceToCase,
            Self::RemoveEvidenceFromCase,
        ]
        .into_iter()
        .find(|p| p.name() == name)
    }

    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::GetCaseEvidence | Self::GetCaseNotes)
    }
}

// --- Arguments ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseIdArgs {
    pub case_id: CaseId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseArgs {
    pub case_id: CaseId,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCaseNoteArgs {
    pub case_id: CaseId,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEvidenceArgs {
    pub case_id: CaseId,
    pub evidence_type: EvidenceType,
    pub evidence_identifier: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEvidenceArgs {
    pub evidence_id: EvidenceId,
}

// --- Operation ---

/// `{name, arguments}`, exactly what goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCall {
    pub name: String,
    pub arguments: Value,
}

impl RemoteCall {
    pub fn new<A: Serialize>(procedure: Procedure, arguments: &A) -> Result<Self, RpcError> {
        let arguments =
            serde_json::to_value(arguments).map_err(|e| RpcError::Serialization {
                procedure: procedure.name().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: procedure.name().to_string(),
            arguments,
        })
    }

    #[must_use]
    pub fn procedure(&self) -> Option<Procedure> {
        Procedure::from_name(&self.name)
    }
}

impl Operation for RemoteCall {
    type Output = RpcResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RpcError {
    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("server rejected the call with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("could not encode arguments for {procedure}: {message}")]
    Serialization { procedure: String, message: String },
}

impl RpcError {
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

pub type RpcResult = Result<Value, RpcError>;

/// Decodes a successful call result into the expected shape.
pub fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::malformed(e.to_string()))
}

// --- Capability ---

#[derive(Capability)]
pub struct Rpc<Ev> {
    context: CapabilityContext<RemoteCall, Ev>,
}

impl<Ev> Rpc<Ev> {
    pub fn new(context: CapabilityContext<RemoteCall, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Rpc<Ev>
where
    Ev: Send + 'static,
{
    /// Issues `call` and dispatches `make_event` with the outcome once the
    /// shell resolves it. Control returns immediately.
    pub fn invoke<F>(&self, call: RemoteCall, make_event: F)
    where
        F: FnOnce(RpcResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(call).await;
            ctx.update_app(make_event(result));
        });
    }
}
