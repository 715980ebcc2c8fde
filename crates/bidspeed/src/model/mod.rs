//! Typed artifacts produced by each pipeline stage.

pub mod analysis;
pub mod solution;
pub mod supplier;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use analysis::{
    AiSummary, AnalysisMetadata, AnalysisResult, ChecklistItem, Priority, ScoringRule,
    TechSpecification, NO_DATA,
};
pub use solution::{
    ArchitectureLayer, DeviationEntry, DeviationStatus, ImplementationPhase, ImplementationPlan,
    KeyRequirements, SolutionOverview, SolutionResult, SystemArchitecture, TechnicalSolution,
};
pub use supplier::{ContactInfo, PastProject, Supplier, SupplierResult};

/// A document accepted by the upload transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name shown to the user.
    pub filename: String,
    /// Server-side path handed to the analysis service.
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_path: Option<String>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_path: file_path.into(),
            original_file_path: None,
        }
    }

    /// File name component of `file_path`, for log fields.
    pub fn stored_name(&self) -> String {
        crate::sanitize::redact_path(Path::new(&self.file_path))
    }
}
