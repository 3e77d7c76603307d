//! Evidence and note lists for the attached case.
//!
//! Every mutation is followed by a full refresh instead of a local patch:
//! `added_by`, `added_at` and server-side validation only exist on the
//! server. A refresh fetches both lists concurrently and commits them
//! together once both have arrived. Each refresh carries a `RefreshTicket`;
//! only the ticket of the most recent refresh for the attached case may
//! commit, everything else is discarded on arrival. Mutation answers carry
//! the `SessionToken` of the attach that issued them, so reopening the same
//! case also retires them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::capabilities::{
    decode, AddCaseNoteArgs, AddEvidenceArgs, CaseIdArgs, Procedure, RemoteCall,
    RemoveEvidenceArgs, Rpc, RpcError, RpcResult,
};
use crate::event::Event;
use crate::model::{CaseEvidence, CaseId, CaseNote, EvidenceId, EvidenceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefreshTicket {
    pub case_id: CaseId,
    pub generation: u64,
}

/// Identifies one attach of a case. Reattaching the same case yields a new
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken {
    pub case_id: CaseId,
    pub session: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// One half of the join has arrived.
    Waiting,
    /// Both lists were replaced.
    Committed,
    /// The refresh failed; the lists are unchanged.
    Failed(RpcError),
    /// The ticket is no longer current; nothing changed.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    AddEvidence,
    RemoveEvidence(EvidenceId),
    AddNote,
}

impl Mutation {
    #[must_use]
    pub const fn procedure(self) -> Procedure {
        match self {
            Self::AddEvidence => Procedure::AddEvidenceToCase,
            Self::RemoveEvidence(_) => Procedure::RemoveEvidenceFromCase,
            Self::AddNote => Procedure::AddCaseNote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Accepted by the server; a refresh has been issued.
    Applied(RefreshTicket),
    Failed(RpcError),
    /// Answer issued under an earlier attach.
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceForm {
    pub evidence_type: EvidenceType,
    pub identifier: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceFormField {
    Type(EvidenceType),
    Identifier(String),
    Notes(String),
}

impl EvidenceForm {
    pub fn apply(&mut self, field: EvidenceFormField) {
        match field {
            EvidenceFormField::Type(t) => self.evidence_type = t,
            EvidenceFormField::Identifier(s) => self.identifier = s,
            EvidenceFormField::Notes(s) => self.notes = s,
        }
    }

    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.identifier.trim().is_empty()
    }

    /// `None` while the identifier is blank.
    #[must_use]
    pub fn to_args(&self, case_id: CaseId) -> Option<AddEvidenceArgs> {
        if !self.is_submittable() {
            return None;
        }
        Some(AddEvidenceArgs {
            case_id,
            evidence_type: self.evidence_type,
            evidence_identifier: self.identifier.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRefresh {
    ticket: RefreshTicket,
    evidence: Option<Vec<CaseEvidence>>,
    notes: Option<Vec<CaseNote>>,
}

#[derive(Debug, Default)]
pub struct CaseDataStore {
    case_id: Option<CaseId>,
    session: u64,
    generation: u64,
    pending: Option<PendingRefresh>,
    evidence: Vec<CaseEvidence>,
    notes: Vec<CaseNote>,
    adding_evidence: bool,
    adding_note: bool,
    removing: HashSet<EvidenceId>,
}

impl CaseDataStore {
    #[must_use]
    pub const fn case_id(&self) -> Option<CaseId> {
        self.case_id
    }

    #[must_use]
    pub fn evidence(&self) -> &[CaseEvidence] {
        &self.evidence
    }

    #[must_use]
    pub fn notes(&self) -> &[CaseNote] {
        &self.notes
    }

    #[must_use]
    pub const fn loading(&self) -> bool {
        self.pending.is_some()
    }

    /// `None` while detached.
    #[must_use]
    pub fn session(&self) -> Option<SessionToken> {
        self.case_id.map(|case_id| SessionToken {
            case_id,
            session: self.session,
        })
    }

    #[must_use]
    pub fn is_session(&self, token: SessionToken) -> bool {
        self.session() == Some(token)
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn is_adding_evidence(&self) -> bool {
        self.adding_evidence
    }

    #[must_use]
    pub const fn is_adding_note(&self) -> bool {
        self.adding_note
    }

    #[must_use]
    pub fn is_removing(&self, evidence_id: EvidenceId) -> bool {
        self.removing.contains(&evidence_id)
    }

    /// Switches to `case_id`, dropping everything held for the previous case.
    /// Answers still in flight become stale, even when `case_id` is the case
    /// already attached.
    pub fn attach(&mut self, case_id: CaseId) {
        self.clear();
        self.case_id = Some(case_id);
    }

    pub fn detach(&mut self) {
        self.clear();
        self.case_id = None;
    }

    fn clear(&mut self) {
        self.session += 1;
        self.generation += 1;
        self.pending = None;
        self.evidence.clear();
        self.notes.clear();
        self.adding_evidence = false;
        self.adding_note = false;
        self.removing.clear();
    }

    /// Opens a new join for the attached case. Any older join is superseded.
    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        let case_id = self.case_id?;
        self.generation += 1;
        let ticket = RefreshTicket {
            case_id,
            generation: self.generation,
        };
        self.pending = Some(PendingRefresh {
            ticket,
            evidence: None,
            notes: None,
        });
        Some(ticket)
    }

    #[must_use]
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.pending.as_ref().is_some_and(|p| p.ticket == ticket)
    }

    /// Issues `getCaseEvidence` and `getCaseNotes` for the attached case.
    pub fn refresh(&mut self, rpc: &Rpc<Event>) -> Result<Option<RefreshTicket>, RpcError> {
        let Some(case_id) = self.case_id else {
            return Ok(None);
        };
        let args = CaseIdArgs { case_id };
        let evidence_call = RemoteCall::new(Procedure::GetCaseEvidence, &args)?;
        let notes_call = RemoteCall::new(Procedure::GetCaseNotes, &args)?;

        let Some(ticket) = self.begin_refresh() else {
            return Ok(None);
        };
        debug!(case_id = %ticket.case_id, generation = ticket.generation, "refreshing case data");

        rpc.invoke(evidence_call, move |result| Event::EvidenceFetched {
            ticket,
            result: Box::new(result),
        });
        rpc.invoke(notes_call, move |result| Event::NotesFetched {
            ticket,
            result: Box::new(result),
        });

        Ok(Some(ticket))
    }

    pub fn accept_evidence(&mut self, ticket: RefreshTicket, result: RpcResult) -> RefreshOutcome {
        self.accept(ticket, result, |pending, value| {
            pending.evidence = Some(decode(value)?);
            Ok(())
        })
    }

    pub fn accept_notes(&mut self, ticket: RefreshTicket, result: RpcResult) -> RefreshOutcome {
        self.accept(ticket, result, |pending, value| {
            pending.notes = Some(decode(value)?);
            Ok(())
        })
    }

    fn accept<F>(&mut self, ticket: RefreshTicket, result: RpcResult, store: F) -> RefreshOutcome
    where
        F: FnOnce(&mut PendingRefresh, serde_json::Value) -> Result<(), RpcError>,
    {
        if !self.is_current(ticket) {
            debug!(
                case_id = %ticket.case_id,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale fetch result"
            );
            return RefreshOutcome::Stale;
        }

        let Some(pending) = self.pending.as_mut() else {
            return RefreshOutcome::Stale;
        };

        if let Err(e) = result.and_then(|value| store(pending, value)) {
            warn!(case_id = %ticket.case_id, error = %e, "case data refresh failed");
            self.pending = None;
            return RefreshOutcome::Failed(e);
        }

        let complete = pending.evidence.is_some() && pending.notes.is_some();
        if !complete {
            return RefreshOutcome::Waiting;
        }

        if let Some(PendingRefresh {
            evidence: Some(evidence),
            notes: Some(notes),
            ..
        }) = self.pending.take()
        {
            info!(
                case_id = %ticket.case_id,
                evidence = evidence.len(),
                notes = notes.len(),
                "case data refreshed"
            );
            self.evidence = evidence;
            self.notes = notes;
        }
        RefreshOutcome::Committed
    }

    /// Sends `addEvidenceToCase`. The identifier is a precondition checked by
    /// the caller through `EvidenceForm::to_args`.
    pub fn add_evidence(&mut self, args: AddEvidenceArgs, rpc: &Rpc<Event>) -> Result<(), RpcError> {
        let Some(session) = self.session().filter(|s| s.case_id == args.case_id) else {
            return Ok(());
        };
        let call = RemoteCall::new(Procedure::AddEvidenceToCase, &args)?;
        self.adding_evidence = true;
        debug!(case_id = %args.case_id, evidence_type = %args.evidence_type, "adding evidence");
        rpc.invoke(call, move |result| Event::AddEvidenceResponse {
            session,
            result: Box::new(result),
        });
        Ok(())
    }

    pub fn remove_evidence(&mut self, evidence_id: EvidenceId, rpc: &Rpc<Event>) -> Result<(), RpcError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        let call = RemoteCall::new(Procedure::RemoveEvidenceFromCase, &RemoveEvidenceArgs { evidence_id })?;
        self.removing.insert(evidence_id);
        debug!(case_id = %session.case_id, %evidence_id, "removing evidence");
        rpc.invoke(call, move |result| Event::RemoveEvidenceResponse {
            session,
            evidence_id,
            result: Box::new(result),
        });
        Ok(())
    }

    /// Sends `addCaseNote` with the trimmed text. Blank text is a no-op.
    pub fn add_note(&mut self, text: &str, rpc: &Rpc<Event>) -> Result<bool, RpcError> {
        let note = text.trim();
        let Some(session) = self.session() else {
            return Ok(false);
        };
        if note.is_empty() {
            return Ok(false);
        }
        let call = RemoteCall::new(
            Procedure::AddCaseNote,
            &AddCaseNoteArgs {
                case_id: session.case_id,
                note: note.to_string(),
            },
        )?;
        self.adding_note = true;
        debug!(case_id = %session.case_id, len = note.len(), "adding note");
        rpc.invoke(call, move |result| Event::AddNoteResponse {
            session,
            result: Box::new(result),
        });
        Ok(true)
    }

    /// Settles a mutation answer. Success triggers a refresh; failure leaves
    /// the lists untouched.
    pub fn finish_mutation(
        &mut self,
        mutation: Mutation,
        session: SessionToken,
        result: &RpcResult,
        rpc: &Rpc<Event>,
    ) -> MutationOutcome {
        let case_id = session.case_id;
        if !self.is_session(session) {
            debug!(
                %case_id,
                session = session.session,
                current = self.session,
                procedure = mutation.procedure().name(),
                "discarding stale mutation result"
            );
            return MutationOutcome::Stale;
        }

        match mutation {
            Mutation::AddEvidence => self.adding_evidence = false,
            Mutation::AddNote => self.adding_note = false,
            Mutation::RemoveEvidence(id) => {
                self.removing.remove(&id);
            }
        }

        if let Err(e) = result {
            warn!(%case_id, procedure = mutation.procedure().name(), error = %e, "mutation failed");
            return MutationOutcome::Failed(e.clone());
        }

        match self.refresh(rpc) {
            Ok(Some(ticket)) => MutationOutcome::Applied(ticket),
            Ok(None) => MutationOutcome::Stale,
            Err(e) => MutationOutcome::Failed(e),
        }
    }
}
