//! Stage preconditions.
//!
//! Pure predicates over a [`PipelineState`]. A closed gate is a user-facing
//! warning, never an error, and never mutates state.

use std::fmt;

use serde::Serialize;

use crate::model::{AnalysisResult, SolutionResult, UploadedFile};
use crate::state::{Phase, PipelineState};

pub fn can_analyze(state: &PipelineState) -> bool {
    require_uploaded_file(state).is_ok()
}

pub fn can_generate_solution(state: &PipelineState) -> bool {
    require_analysis_result(state).is_ok()
}

pub fn can_find_suppliers(state: &PipelineState) -> bool {
    require_solution_result(state).is_ok()
}

/// Input of the analysis stage, if its gate is open.
pub fn require_uploaded_file(state: &PipelineState) -> Result<&UploadedFile, GateRejection> {
    state.uploaded_file().ok_or(GateRejection::NoUploadedFile)
}

/// Input of the solution stage, if its gate is open.
pub fn require_analysis_result(state: &PipelineState) -> Result<&AnalysisResult, GateRejection> {
    state
        .analysis_result()
        .ok_or(GateRejection::NoAnalysisResult)
}

/// The supplier stage consumes the solution's key requirements.
pub fn require_solution_result(state: &PipelineState) -> Result<&SolutionResult, GateRejection> {
    state
        .solution_result()
        .ok_or(GateRejection::NoSolutionResult)
}

/// Why a stage was refused before any remote call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    NoUploadedFile,
    NoAnalysisResult,
    NoSolutionResult,
}

impl GateRejection {
    /// Warning text for the notification sink.
    pub fn message(&self) -> &'static str {
        match self {
            GateRejection::NoUploadedFile => "Please upload a bid document first",
            GateRejection::NoAnalysisResult => "Please complete the bid analysis first",
            GateRejection::NoSolutionResult => "Please generate a technical solution first",
        }
    }
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Phase of a session together with which stages may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateView {
    pub phase: Phase,
    pub can_analyze: bool,
    pub can_generate_solution: bool,
    pub can_find_suppliers: bool,
}

pub fn view(state: &PipelineState) -> GateView {
    GateView {
        phase: state.phase(),
        can_analyze: can_analyze(state),
        can_generate_solution: can_generate_solution(state),
        can_find_suppliers: can_find_suppliers(state),
    }
}
