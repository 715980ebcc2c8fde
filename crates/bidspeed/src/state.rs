//! Session state owned by the stage controller.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnalysisResult, SolutionResult, SupplierResult, UploadedFile};

/// One step of the bid workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Upload,
    Analyze,
    GenerateSolution,
    FindSuppliers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Upload => write!(f, "upload"),
            Stage::Analyze => write!(f, "analyze"),
            Stage::GenerateSolution => write!(f, "generate-solution"),
            Stage::FindSuppliers => write!(f, "find-suppliers"),
        }
    }
}

/// Per-stage in-flight markers. Only same-stage reentrancy is guarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub analyzing: bool,
    pub generating_solution: bool,
    pub searching_suppliers: bool,
}

impl InFlight {
    pub fn is_set(&self, stage: Stage) -> bool {
        match stage {
            Stage::Upload => false,
            Stage::Analyze => self.analyzing,
            Stage::GenerateSolution => self.generating_solution,
            Stage::FindSuppliers => self.searching_suppliers,
        }
    }

    fn set(&mut self, stage: Stage, value: bool) {
        match stage {
            Stage::Upload => {}
            Stage::Analyze => self.analyzing = value,
            Stage::GenerateSolution => self.generating_solution = value,
            Stage::FindSuppliers => self.searching_suppliers = value,
        }
    }

    pub fn any(&self) -> bool {
        self.analyzing || self.generating_solution || self.searching_suppliers
    }
}

/// Explicit tag summarizing where the current document is in the workflow.
///
/// Derived from the artifact slots on every read, so it can never disagree
/// with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "stage", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Uploaded,
    Analyzing,
    Analyzed,
    GeneratingSolution,
    SolutionReady,
    SearchingSuppliers,
    SuppliersFound,
    StageFailed(Stage),
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::Analyzing | Phase::GeneratingSolution | Phase::SearchingSuppliers
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Uploaded => write!(f, "Uploaded"),
            Phase::Analyzing => write!(f, "Analyzing"),
            Phase::Analyzed => write!(f, "Analyzed"),
            Phase::GeneratingSolution => write!(f, "Generating solution"),
            Phase::SolutionReady => write!(f, "Solution ready"),
            Phase::SearchingSuppliers => write!(f, "Searching suppliers"),
            Phase::SuppliersFound => write!(f, "Suppliers found"),
            Phase::StageFailed(stage) => write!(f, "Stage {} failed", stage),
        }
    }
}

/// Artifacts and in-flight flags of one workflow session.
///
/// Fields are read through accessors; only the controller mutates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineState {
    uploaded_file: Option<UploadedFile>,
    analysis_result: Option<AnalysisResult>,
    solution_result: Option<SolutionResult>,
    supplier_result: Option<SupplierResult>,
    in_flight: InFlight,
    last_failure: Option<Stage>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded_file(&self) -> Option<&UploadedFile> {
        self.uploaded_file.as_ref()
    }

    pub fn analysis_result(&self) -> Option<&AnalysisResult> {
        self.analysis_result.as_ref()
    }

    pub fn solution_result(&self) -> Option<&SolutionResult> {
        self.solution_result.as_ref()
    }

    pub fn supplier_result(&self) -> Option<&SupplierResult> {
        self.supplier_result.as_ref()
    }

    pub fn in_flight(&self) -> InFlight {
        self.in_flight
    }

    pub fn is_in_flight(&self, stage: Stage) -> bool {
        self.in_flight.is_set(stage)
    }

    pub fn last_failure(&self) -> Option<Stage> {
        self.last_failure
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.searching_suppliers {
            return Phase::SearchingSuppliers;
        }
        if self.in_flight.generating_solution {
            return Phase::GeneratingSolution;
        }
        if self.in_flight.analyzing {
            return Phase::Analyzing;
        }
        if let Some(stage) = self.last_failure {
            return Phase::StageFailed(stage);
        }
        // Progress of the current document: each step counts only when the
        // previous one is present.
        match (
            self.uploaded_file.is_some(),
            self.analysis_result.is_some(),
            self.solution_result.is_some(),
            self.supplier_result.is_some(),
        ) {
            (false, ..) => Phase::Idle,
            (true, false, ..) => Phase::Uploaded,
            (true, true, false, _) => Phase::Analyzed,
            (true, true, true, false) => Phase::SolutionReady,
            (true, true, true, true) => Phase::SuppliersFound,
        }
    }

    pub(crate) fn set_uploaded_file(&mut self, file: Option<UploadedFile>) {
        self.uploaded_file = file;
    }

    pub(crate) fn set_analysis_result(&mut self, result: Option<AnalysisResult>) {
        self.analysis_result = result;
    }

    pub(crate) fn set_solution_result(&mut self, result: SolutionResult) {
        self.solution_result = Some(result);
    }

    pub(crate) fn set_supplier_result(&mut self, result: SupplierResult) {
        self.supplier_result = Some(result);
    }

    pub(crate) fn set_in_flight(&mut self, stage: Stage, value: bool) {
        self.in_flight.set(stage, value);
    }

    pub(crate) fn record_failure(&mut self, stage: Option<Stage>) {
        self.last_failure = stage;
    }
}

/// A single workflow session: one [`PipelineState`] behind a lock.
///
/// The lock is only held for short synchronous sections, never across a
/// remote call.
#[derive(Debug)]
pub struct PipelineSession {
    id: String,
    state: Mutex<PipelineState>,
}

impl PipelineSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(PipelineState::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> PipelineState {
        self.lock().clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PipelineState> {
        // A panic while holding the lock cannot leave a half-written slot:
        // every mutation is a single assignment.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for PipelineSession {
    fn default() -> Self {
        Self::new()
    }
}
