//! Built-in demo data for previewing the workflow without live services.

use serde_json::Value;

use crate::model::{AnalysisResult, SolutionResult, SupplierResult, UploadedFile};
use crate::normalize::normalize;

const DEMO_JSON: &str = include_str!("../fixtures/demo.json");

pub const DEMO_FILENAME: &str = "demo_bid.pdf";
pub const DEMO_FILE_PATH: &str = "test_data/sample_bid.txt";

/// A complete set of artifacts, as if every stage had succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoFixture {
    pub uploaded_file: UploadedFile,
    pub analysis: AnalysisResult,
    pub solution: SolutionResult,
    pub suppliers: SupplierResult,
}

/// Builds the demo fixture. Artifacts go through the same normalizer as
/// service responses.
pub fn demo() -> DemoFixture {
    let raw: Value = match serde_json::from_str(DEMO_JSON) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "Embedded demo fixture is not valid JSON");
            Value::Null
        }
    };

    DemoFixture {
        uploaded_file: UploadedFile::new(DEMO_FILENAME, DEMO_FILE_PATH),
        analysis: normalize(&raw["analysis"]),
        solution: normalize(&raw["solution"]),
        suppliers: normalize(&raw["suppliers"]),
    }
}
