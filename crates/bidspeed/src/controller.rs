//! Pipeline stage controller.
//!
//! One operation per stage. Each checks its gate, marks the stage in flight,
//! calls the remote service without holding the session lock, then applies
//! the normalized result and reports the outcome to the notification sink.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::BidSpeedConfig;
use crate::error::ServiceError;
use crate::fixture;
use crate::gate::{self, GateRejection};
use crate::model::{AnalysisResult, SolutionResult, SupplierResult, UploadedFile};
use crate::normalize::{normalize, Envelope};
use crate::notify::{Notification, NotificationLevel, NotificationSink, PhaseChange};
use crate::sanitize;
use crate::services::{HttpStageClient, StageServices, UploadPolicy};
use crate::state::{Phase, PipelineSession, PipelineState, Stage};

pub const ANALYSIS_COMPLETED: &str = "Bid analysis completed";
pub const ANALYSIS_INVALID_RESPONSE: &str = "Analysis failed, the response format is invalid";
pub const ANALYSIS_FAILED: &str = "Bid analysis failed, please retry";
pub const SOLUTION_COMPLETED: &str = "Technical solution generated";
pub const SOLUTION_FAILED: &str = "Technical solution generation failed, please retry";
pub const SUPPLIERS_COMPLETED: &str = "Supplier search completed";
pub const SUPPLIERS_FAILED: &str = "Supplier search failed, please retry";
pub const UPLOAD_FAILED: &str = "File upload failed, please retry";
pub const FIXTURE_LOADED: &str = "Demo data loaded, the full workflow is available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The document was refused before any upload was attempted.
    InvalidUpload,
    /// Network error, timeout, non-2xx status or undecodable body.
    Transport,
    /// The service answered but reported failure.
    ServiceReported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: FailureKind,
    /// The text that was sent to the notification sink.
    pub message: String,
}

/// Result of one controller operation. No outcome is fatal: every failure
/// leaves the operation callable again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    /// Gate closed. Nothing was called and nothing changed.
    Rejected(GateRejection),
    /// The same stage is already in flight for this session.
    AlreadyRunning,
    Failed(StageFailure),
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed)
    }
}

/// Clears the in-flight flag of a stage when dropped, including when the
/// stage future is dropped mid-call.
struct InFlightGuard<'a> {
    session: &'a PipelineSession,
    stage: Stage,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(stage = %self.stage, "Stage abandoned before completion");
            self.session.lock().set_in_flight(self.stage, false);
        }
    }
}

pub struct StageController {
    services: StageServices,
    sink: Arc<dyn NotificationSink>,
    upload_policy: UploadPolicy,
}

impl StageController {
    pub fn new(services: StageServices, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            services,
            sink,
            upload_policy: UploadPolicy::default(),
        }
    }

    /// HTTP-backed controller with the configured upload policy.
    pub fn from_config(
        config: &BidSpeedConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, ServiceError> {
        let client = HttpStageClient::from_config(config)?;
        Ok(Self::new(StageServices::http(client), sink).with_upload_policy(config.upload.policy()))
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.upload_policy
    }

    /// Validates and uploads a local document, then records the result.
    pub async fn upload(&self, session: &PipelineSession, path: &Path) -> StageOutcome {
        let span = info_span!("stage",
            stage = %Stage::Upload,
            session = %session.id(),
            file = %sanitize::redact_path(path),
            path_hash = %sanitize::hash_path(path),
        );
        self.upload_inner(session, path).instrument(span).await
    }

    async fn upload_inner(&self, session: &PipelineSession, path: &Path) -> StageOutcome {
        let document = match self.upload_policy.prepare(path).await {
            Ok(document) => document,
            Err(e) => {
                let message = e.to_string();
                warn!(error = %e, "Document refused");
                self.notify(session, Some(Stage::Upload), NotificationLevel::Error, &message);
                return StageOutcome::Failed(StageFailure {
                    stage: Stage::Upload,
                    kind: FailureKind::InvalidUpload,
                    message,
                });
            }
        };

        match self.services.upload.upload(document).await {
            Ok(file) => self.upload_complete(session, file),
            Err(e) => self.upload_failed(session, &e.to_string()),
        }
    }

    /// Records a successful upload. Any analysis of the previous document is
    /// discarded; solution and supplier results are kept.
    pub fn upload_complete(&self, session: &PipelineSession, file: UploadedFile) -> StageOutcome {
        let message = format!("File {} uploaded successfully", file.filename);
        info!(
            session = %session.id(),
            file = %file.stored_name(),
            "Upload recorded"
        );
        self.apply(session, |state| {
            state.set_uploaded_file(Some(file));
            state.set_analysis_result(None);
            state.record_failure(None);
        });
        self.notify(session, Some(Stage::Upload), NotificationLevel::Success, &message);
        StageOutcome::Completed
    }

    /// Records a failed upload. The previous upload is forgotten.
    pub fn upload_failed(&self, session: &PipelineSession, reason: &str) -> StageOutcome {
        warn!(session = %session.id(), reason = %reason, "Upload failed");
        self.apply(session, |state| {
            state.set_uploaded_file(None);
            state.record_failure(Some(Stage::Upload));
        });
        self.notify(
            session,
            Some(Stage::Upload),
            NotificationLevel::Error,
            UPLOAD_FAILED,
        );
        StageOutcome::Failed(StageFailure {
            stage: Stage::Upload,
            kind: FailureKind::Transport,
            message: UPLOAD_FAILED.to_string(),
        })
    }

    pub async fn run_analysis(&self, session: &PipelineSession) -> StageOutcome {
        let span = info_span!("stage",
            stage = %Stage::Analyze,
            session = %session.id(),
            file = tracing::field::Empty,
        );
        self.analysis_inner(session).instrument(span).await
    }

    async fn analysis_inner(&self, session: &PipelineSession) -> StageOutcome {
        let stage = Stage::Analyze;
        let (guard, file) = match self.begin(session, stage, |state| {
            gate::require_uploaded_file(state).cloned()
        }) {
            Ok(begun) => begun,
            Err(outcome) => return outcome,
        };
        tracing::Span::current().record("file", file.stored_name().as_str());

        let response = self.services.analysis.analyze(&file.file_path).await;

        let body = match response {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Analysis request failed");
                return self.fail(session, guard, FailureKind::Transport, ANALYSIS_FAILED, |s| {
                    s.set_analysis_result(None)
                });
            }
        };

        let envelope = Envelope::read(&body);
        if !envelope.is_success() {
            let message = envelope
                .error
                .unwrap_or_else(|| ANALYSIS_INVALID_RESPONSE.to_string());
            warn!(message = %message, "Analysis reported failure");
            return self.fail(session, guard, FailureKind::ServiceReported, &message, |s| {
                s.set_analysis_result(None)
            });
        }

        let result: AnalysisResult = normalize(&body);
        info!(
            total_words = result.metadata.total_words,
            checklist_items = result.tech_checklist.len(),
            "Analysis stored"
        );
        self.finish(session, guard, |state| {
            state.set_analysis_result(Some(result));
            state.record_failure(None);
        });
        self.notify(session, Some(stage), NotificationLevel::Success, ANALYSIS_COMPLETED);
        StageOutcome::Completed
    }

    pub async fn run_solution_generation(&self, session: &PipelineSession) -> StageOutcome {
        let span = info_span!("stage", stage = %Stage::GenerateSolution, session = %session.id());
        self.solution_inner(session).instrument(span).await
    }

    async fn solution_inner(&self, session: &PipelineSession) -> StageOutcome {
        let stage = Stage::GenerateSolution;
        let (guard, analysis) = match self.begin(session, stage, |state| {
            gate::require_analysis_result(state).cloned()
        }) {
            Ok(begun) => begun,
            Err(outcome) => return outcome,
        };

        let response = self.services.solution.generate_solution(&analysis).await;
        match self.accept_response(response, SOLUTION_FAILED) {
            Ok(body) => {
                let result: SolutionResult = normalize(&body);
                info!(
                    solutions = result.technical_solutions.len(),
                    phases = result.implementation_plan.phases.len(),
                    "Solution stored"
                );
                self.finish(session, guard, |state| {
                    state.set_solution_result(result);
                    state.record_failure(None);
                });
                self.notify(session, Some(stage), NotificationLevel::Success, SOLUTION_COMPLETED);
                StageOutcome::Completed
            }
            Err((kind, message)) => self.fail(session, guard, kind, &message, |_| {}),
        }
    }

    pub async fn run_supplier_search(&self, session: &PipelineSession) -> StageOutcome {
        let span = info_span!("stage", stage = %Stage::FindSuppliers, session = %session.id());
        self.supplier_inner(session).instrument(span).await
    }

    async fn supplier_inner(&self, session: &PipelineSession) -> StageOutcome {
        let stage = Stage::FindSuppliers;
        let (guard, requirements) = match self.begin(session, stage, |state| {
            gate::require_solution_result(state).map(|s| s.key_requirements.clone())
        }) {
            Ok(begun) => begun,
            Err(outcome) => return outcome,
        };

        let response = self.services.supplier.find_suppliers(&requirements).await;
        match self.accept_response(response, SUPPLIERS_FAILED) {
            Ok(body) => {
                let result: SupplierResult = normalize(&body);
                info!(
                    total_found = result.total_found,
                    listed = result.top_suppliers.len(),
                    "Suppliers stored"
                );
                self.finish(session, guard, |state| {
                    state.set_supplier_result(result);
                    state.record_failure(None);
                });
                self.notify(session, Some(stage), NotificationLevel::Success, SUPPLIERS_COMPLETED);
                StageOutcome::Completed
            }
            Err((kind, message)) => self.fail(session, guard, kind, &message, |_| {}),
        }
    }

    /// Fills every slot from the built-in demo data. No service is called.
    pub fn load_fixture(&self, session: &PipelineSession) -> StageOutcome {
        let demo = fixture::demo();
        info!(session = %session.id(), "Loading demo fixture");
        self.apply(session, |state| {
            state.set_uploaded_file(Some(demo.uploaded_file));
            state.set_analysis_result(Some(demo.analysis));
            state.set_solution_result(demo.solution);
            state.set_supplier_result(demo.suppliers);
            state.record_failure(None);
        });
        self.notify(session, None, NotificationLevel::Success, FIXTURE_LOADED);
        StageOutcome::Completed
    }

    /// Checks gate and flag, marks the stage in flight and snapshots its
    /// input. The lock is released before returning.
    fn begin<'s, T>(
        &self,
        session: &'s PipelineSession,
        stage: Stage,
        input: impl FnOnce(&PipelineState) -> Result<T, GateRejection>,
    ) -> Result<(InFlightGuard<'s>, T), StageOutcome> {
        let begun = {
            let mut state = session.lock();
            match input(&state) {
                Err(rejection) => Err(StageOutcome::Rejected(rejection)),
                Ok(_) if state.is_in_flight(stage) => Err(StageOutcome::AlreadyRunning),
                Ok(value) => {
                    let from = state.phase();
                    state.set_in_flight(stage, true);
                    Ok((from, state.phase(), value))
                }
            }
        };

        match begun {
            Ok((from, to, value)) => {
                debug!("Stage started");
                self.emit_phase(session, from, to);
                let guard = InFlightGuard {
                    session,
                    stage,
                    armed: true,
                };
                Ok((guard, value))
            }
            Err(StageOutcome::Rejected(rejection)) => {
                debug!(reason = %rejection, "Gate closed");
                self.notify(session, Some(stage), NotificationLevel::Warning, rejection.message());
                Err(StageOutcome::Rejected(rejection))
            }
            Err(outcome) => {
                debug!("Stage already in flight, ignoring");
                Err(outcome)
            }
        }
    }

    /// Separates usable solution/supplier bodies from failures. Only an
    /// explicit `success: false` counts as service-reported failure.
    fn accept_response(
        &self,
        response: Result<Value, ServiceError>,
        generic: &str,
    ) -> Result<Value, (FailureKind, String)> {
        match response {
            Err(e) => {
                warn!(error = %e, "Stage request failed");
                Err((FailureKind::Transport, generic.to_string()))
            }
            Ok(body) if !body.is_object() => {
                warn!("Stage response is not a JSON object");
                Err((FailureKind::ServiceReported, generic.to_string()))
            }
            Ok(body) => {
                let envelope = Envelope::read(&body);
                if envelope.is_explicit_failure() {
                    let message = envelope.error.unwrap_or_else(|| generic.to_string());
                    warn!(message = %message, "Stage reported failure");
                    Err((FailureKind::ServiceReported, message))
                } else {
                    Ok(body)
                }
            }
        }
    }

    fn fail(
        &self,
        session: &PipelineSession,
        guard: InFlightGuard<'_>,
        kind: FailureKind,
        message: &str,
        rollback: impl FnOnce(&mut PipelineState),
    ) -> StageOutcome {
        let stage = guard.stage;
        self.finish(session, guard, |state| {
            rollback(state);
            state.record_failure(Some(stage));
        });
        self.notify(session, Some(stage), NotificationLevel::Error, message);
        StageOutcome::Failed(StageFailure {
            stage,
            kind,
            message: message.to_string(),
        })
    }

    /// Applies the stage result and clears the flag in one critical section.
    fn finish(
        &self,
        session: &PipelineSession,
        guard: InFlightGuard<'_>,
        update: impl FnOnce(&mut PipelineState),
    ) {
        let stage = guard.stage;
        self.apply(session, |state| {
            update(state);
            state.set_in_flight(stage, false);
        });
        guard.disarm();
    }

    fn apply(&self, session: &PipelineSession, update: impl FnOnce(&mut PipelineState)) {
        let (from, to) = {
            let mut state = session.lock();
            let from = state.phase();
            update(&mut state);
            (from, state.phase())
        };
        self.emit_phase(session, from, to);
    }

    fn emit_phase(&self, session: &PipelineSession, from: Phase, to: Phase) {
        if from != to {
            self.sink.phase_changed(PhaseChange {
                session_id: session.id().to_string(),
                from,
                to,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    fn notify(
        &self,
        session: &PipelineSession,
        stage: Option<Stage>,
        level: NotificationLevel,
        message: &str,
    ) {
        self.sink
            .notify(Notification::new(session.id(), stage, level, message));
    }
}
