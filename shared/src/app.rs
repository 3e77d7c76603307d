use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, Procedure, RemoteCall, RpcResult};
use crate::data_store::{EvidenceForm, Mutation, MutationOutcome, RefreshOutcome, SessionToken};
use crate::event::Event;
use crate::i18n::Catalog;
use crate::model::{Case, EvidenceId, Model};
use crate::view::{self, ViewModel};
use crate::AppError;

#[derive(Default)]
pub struct App;

impl App {
    fn fail(model: &mut Model, error: &AppError) {
        warn!(code = error.code(), error = %error, "surfacing failure");
        model.show_error(error);
    }

    fn open_case(case: Case, model: &mut Model, caps: &Capabilities) {
        info!(case_id = %case.id, case_number = %case.case_number, "case opened");
        model.reset_case_state();
        model.store.attach(case.id);
        model.case = Some(case);
        Self::refresh(model, caps);
    }

    fn close_case(model: &mut Model) {
        if let Some(case_id) = model.current_case_id() {
            info!(%case_id, "case closed");
        }
        model.case = None;
        model.reset_case_state();
        model.store.detach();
    }

    fn refresh(model: &mut Model, caps: &Capabilities) {
        if let Err(e) = model.store.refresh(&caps.rpc) {
            Self::fail(model, &AppError::from(e));
        }
    }

    fn handle_refresh_outcome(outcome: RefreshOutcome, model: &mut Model) {
        if let RefreshOutcome::Failed(e) = outcome {
            Self::fail(model, &AppError::from(e).with_context("operation", "refresh"));
        }
    }

    fn handle_save_response(session: SessionToken, result: RpcResult, model: &mut Model) {
        let case_id = session.case_id;
        if !model.store.is_session(session) {
            debug!(%case_id, session = session.session, "discarding save result from an earlier session");
            return;
        }

        match result {
            Ok(_) => {
                let Some(draft) = model.editor.finish_save(true) else {
                    return;
                };
                model.proposed_case = model.case.as_ref().map(|case| draft.applied_to(case));
                info!(%case_id, status = %draft.status, "case saved, awaiting refreshed snapshot");
                model.show_success("Case updated");
            }
            Err(e) => {
                model.editor.finish_save(false);
                Self::fail(
                    model,
                    &AppError::from(e).with_context("procedure", Procedure::UpdateCase.name()),
                );
            }
        }
    }

    fn handle_mutation_response(
        mutation: Mutation,
        session: SessionToken,
        result: &RpcResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        match model.store.finish_mutation(mutation, session, result, &caps.rpc) {
            MutationOutcome::Applied(ticket) => {
                debug!(case_id = %session.case_id, generation = ticket.generation, "mutation applied");
                match mutation {
                    Mutation::AddNote => {
                        model.note_draft.clear();
                        model.show_success("Note added");
                    }
                    Mutation::AddEvidence => {
                        model.evidence_modal_open = false;
                        model.evidence_form = EvidenceForm::default();
                        model.show_success("Evidence added");
                    }
                    Mutation::RemoveEvidence(_) => model.show_success("Evidence removed"),
                }
            }
            MutationOutcome::Failed(e) => Self::fail(
                model,
                &AppError::from(e).with_context("procedure", mutation.procedure().name()),
            ),
            MutationOutcome::Stale => {}
        }
    }

    fn request_save(model: &mut Model, caps: &Capabilities) {
        let Some(session) = model.store.session() else {
            return;
        };
        let case_id = session.case_id;
        let args = match model.editor.begin_save(case_id) {
            Ok(args) => args,
            Err(e) => {
                debug!(%case_id, reason = %e, "save ignored");
                return;
            }
        };

        match RemoteCall::new(Procedure::UpdateCase, &args) {
            Ok(call) => {
                debug!(%case_id, "saving case");
                caps.rpc.invoke(call, move |result| Event::SaveResponse {
                    session,
                    result: Box::new(result),
                });
            }
            Err(e) => {
                model.editor.finish_save(false);
                Self::fail(model, &AppError::from(e));
            }
        }
    }

    fn request_add_note(model: &mut Model, caps: &Capabilities) {
        if model.store.is_adding_note() {
            debug!("note already in flight");
            return;
        }
        match model.store.add_note(&model.note_draft, &caps.rpc) {
            Ok(true) => {}
            Ok(false) => debug!("blank note ignored"),
            Err(e) => Self::fail(model, &AppError::from(e)),
        }
    }

    fn request_add_evidence(model: &mut Model, caps: &Capabilities) {
        if model.store.is_adding_evidence() {
            debug!("evidence already in flight");
            return;
        }
        let Some(case_id) = model.current_case_id() else {
            return;
        };
        let Some(args) = model.evidence_form.to_args(case_id) else {
            debug!(%case_id, "evidence without identifier ignored");
            return;
        };
        if let Err(e) = model.store.add_evidence(args, &caps.rpc) {
            Self::fail(model, &AppError::from(e));
        }
    }

    fn request_remove_evidence(evidence_id: EvidenceId, model: &mut Model, caps: &Capabilities) {
        if model.store.is_removing(evidence_id) {
            return;
        }
        if !model.store.evidence().iter().any(|e| e.id == evidence_id) {
            debug!(%evidence_id, "evidence not in the current list");
            return;
        }
        if let Err(e) = model.store.remove_evidence(evidence_id, &caps.rpc) {
            Self::fail(model, &AppError::from(e));
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "update"
        );

        match event {
            Event::Noop => return,

            Event::Configured { config } => match config.validate() {
                Ok(()) => {
                    info!(origin = %config.origin, "panel configured");
                    model.config = config;
                }
                Err(e) => Self::fail(model, &AppError::from(e)),
            },

            Event::LocaleLoaded { document } => match Catalog::from_json_str(&document) {
                Ok(catalog) => {
                    debug!(entries = catalog.len(), "translations loaded");
                    model.catalog = catalog;
                }
                Err(e) => Self::fail(model, &AppError::from(e)),
            },

            Event::CaseOpened { case } => Self::open_case(*case, model, caps),

            Event::CaseReplaced { case } => {
                if model.is_current(case.id) {
                    debug!(case_id = %case.id, "committed snapshot replaced");
                    model.case = Some(*case);
                    model.proposed_case = None;
                } else {
                    Self::open_case(*case, model, caps);
                }
            }

            Event::BackRequested => Self::close_case(model),

            Event::RefreshRequested => Self::refresh(model, caps),

            Event::EditRequested => {
                let Some(case) = model.displayed_case().cloned() else {
                    return;
                };
                if let Err(e) = model.editor.enter_edit(&case) {
                    debug!(reason = %e, "edit ignored");
                }
            }

            Event::EditFieldChanged(field) => {
                if let Err(e) = model.editor.set_field(field) {
                    debug!(reason = %e, "field change ignored");
                }
            }

            Event::CancelEditRequested => {
                if let Err(e) = model.editor.cancel() {
                    debug!(reason = %e, "cancel ignored");
                }
            }

            Event::SaveRequested => Self::request_save(model, caps),

            Event::SaveResponse { session, result } => {
                Self::handle_save_response(session, *result, model);
            }

            Event::NoteDraftChanged { text } => model.note_draft = text,

            Event::AddNoteRequested => Self::request_add_note(model, caps),

            Event::AddNoteResponse { session, result } => {
                Self::handle_mutation_response(Mutation::AddNote, session, &result, model, caps);
            }

            Event::EvidenceModalOpened => model.evidence_modal_open = true,

            Event::EvidenceModalClosed => {
                model.evidence_modal_open = false;
                if !model.store.is_adding_evidence() {
                    model.evidence_form = EvidenceForm::default();
                }
            }

            Event::EvidenceFormChanged(field) => model.evidence_form.apply(field),

            Event::AddEvidenceRequested => Self::request_add_evidence(model, caps),

            Event::AddEvidenceResponse { session, result } => {
                Self::handle_mutation_response(
                    Mutation::AddEvidence,
                    session,
                    &result,
                    model,
                    caps,
                );
            }

            Event::RemoveEvidenceRequested { evidence_id } => {
                Self::request_remove_evidence(evidence_id, model, caps);
            }

            Event::RemoveEvidenceResponse {
                session,
                evidence_id,
                result,
            } => {
                Self::handle_mutation_response(
                    Mutation::RemoveEvidence(evidence_id),
                    session,
                    &result,
                    model,
                    caps,
                );
            }

            Event::EvidenceFetched { ticket, result } => {
                let outcome = model.store.accept_evidence(ticket, *result);
                Self::handle_refresh_outcome(outcome, model);
            }

            Event::NotesFetched { ticket, result } => {
                let outcome = model.store.accept_notes(ticket, *result);
                Self::handle_refresh_outcome(outcome, model);
            }

            Event::DismissToast => model.clear_toast(),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Effect, RpcError};
    use crate::config::PanelConfig;
    use crate::edit_buffer::{EditField, PanelMode};
    use crate::model::{CaseId, CaseStatus};
    use crate::ToastKind;
    use assert_matches::assert_matches;
    use crux_core::testing::AppTester;

    fn robbery() -> Case {
        Case {
            id: CaseId(7),
            case_number: "C-0007".into(),
            title: "Robbery".into(),
            description: None,
            status: CaseStatus::Open,
            assigned_to: None,
            created_by: "dispatch".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn opened() -> (AppTester<App, Effect>, Model) {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let _ = app.update(
            Event::CaseOpened {
                case: Box::new(robbery()),
            },
            &mut model,
        );
        (app, model)
    }

    #[test]
    fn test_open_case_issues_both_fetches() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();

        let update = app.update(
            Event::CaseOpened {
                case: Box::new(robbery()),
            },
            &mut model,
        );

        let names: Vec<_> = update
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Rpc(request) => Some(request.operation.name.clone()),
                Effect::Render(_) => None,
            })
            .collect();
        assert_eq!(names, ["evidences:getCaseEvidence", "evidences:getCaseNotes"]);
        assert!(model.store.loading());
        assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
    }

    #[test]
    fn test_edit_requires_open_case() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let _ = app.update(Event::EditRequested, &mut model);
        assert_eq!(model.editor.mode(), &PanelMode::Viewing);
    }

    #[test]
    fn test_save_failure_keeps_editing_and_raises_toast() {
        let (app, mut model) = opened();
        let _ = app.update(Event::EditRequested, &mut model);
        let _ = app.update(
            Event::EditFieldChanged(EditField::Title("Armed robbery".into())),
            &mut model,
        );

        let _ = app.update(
            Event::SaveResponse {
                session: model.store.session().unwrap(),
                result: Box::new(Err(RpcError::Timeout { timeout_ms: 30_000 })),
            },
            &mut model,
        );
        assert!(model.editor.is_editing());

        let _ = app.update(Event::SaveRequested, &mut model);
        assert!(model.editor.is_saving());
        let _ = app.update(
            Event::SaveResponse {
                session: model.store.session().unwrap(),
                result: Box::new(Err(RpcError::Rejected {
                    status: 500,
                    message: String::new(),
                })),
            },
            &mut model,
        );

        assert_matches!(
            model.editor.mode(),
            PanelMode::Editing { draft, save_in_flight: false } if draft.title == "Armed robbery"
        );
        let toast = model.active_toast.as_ref().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.code.as_deref(), Some("SERVER_ERROR"));
        assert_eq!(model.case.as_ref().unwrap().title, "Robbery");
    }

    #[test]
    fn test_successful_save_shows_proposed_case() {
        let (app, mut model) = opened();
        let _ = app.update(Event::EditRequested, &mut model);
        let _ = app.update(
            Event::EditFieldChanged(EditField::Status(CaseStatus::Closed)),
            &mut model,
        );
        let _ = app.update(Event::SaveRequested, &mut model);
        let _ = app.update(
            Event::SaveResponse {
                session: model.store.session().unwrap(),
                result: Box::new(Ok(serde_json::Value::Null)),
            },
            &mut model,
        );

        assert_eq!(model.editor.mode(), &PanelMode::Viewing);
        assert_eq!(model.case.as_ref().unwrap().status, CaseStatus::Open);
        assert_eq!(
            model.displayed_case().map(|c| c.status.clone()),
            Some(CaseStatus::Closed)
        );
        assert!(app.view(&model).panel().unwrap().pending_refresh);

        let _ = app.update(
            Event::CaseReplaced {
                case: Box::new(Case {
                    status: CaseStatus::Closed,
                    updated_at: 10,
                    ..robbery()
                }),
            },
            &mut model,
        );
        assert!(model.proposed_case.is_none());
        assert!(!app.view(&model).panel().unwrap().pending_refresh);
    }

    #[test]
    fn test_blank_title_save_is_inert() {
        let (app, mut model) = opened();
        let _ = app.update(Event::EditRequested, &mut model);
        let _ = app.update(
            Event::EditFieldChanged(EditField::Title("  ".into())),
            &mut model,
        );

        let update = app.update(Event::SaveRequested, &mut model);
        assert!(!update.effects.iter().any(|e| matches!(e, Effect::Rpc(_))));
        assert!(!model.editor.is_saving());
    }

    #[test]
    fn test_save_response_for_closed_case_is_ignored() {
        let (app, mut model) = opened();
        let _ = app.update(Event::EditRequested, &mut model);
        let _ = app.update(Event::SaveRequested, &mut model);
        let session = model.store.session().unwrap();
        let _ = app.update(Event::BackRequested, &mut model);

        let _ = app.update(
            Event::SaveResponse {
                session,
                result: Box::new(Ok(serde_json::Value::Null)),
            },
            &mut model,
        );
        assert!(model.proposed_case.is_none());
        assert!(model.active_toast.is_none());
        assert!(app.view(&model).panel().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let _ = app.update(
            Event::Configured {
                config: PanelConfig {
                    request_timeout_ms: 0,
                    ..PanelConfig::default()
                },
            },
            &mut model,
        );
        assert_eq!(model.config, PanelConfig::default());
        assert_eq!(
            model.active_toast.as_ref().and_then(|t| t.code.as_deref()),
            Some("CONFIG_ERROR")
        );

        let _ = app.update(Event::DismissToast, &mut model);
        assert!(model.active_toast.is_none());
    }

    #[test]
    fn test_locale_document_is_parsed_into_catalog() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let _ = app.update(
            Event::LocaleLoaded {
                document: r#"{"laptop":{"desktop_screen":{"cases_app":{"edit":"Bearbeiten"}}}}"#.into(),
            },
            &mut model,
        );
        assert_eq!(model.catalog.len(), 1);
        assert!(model.active_toast.is_none());

        let _ = app.update(
            Event::LocaleLoaded {
                document: "[\"not\", \"an object\"]".into(),
            },
            &mut model,
        );
        assert_eq!(model.catalog.len(), 1);
        assert_eq!(
            model.active_toast.as_ref().and_then(|t| t.code.as_deref()),
            Some("DESERIALIZATION_ERROR")
        );
    }
}
