//! Remote collaborators of the stage controller.
//!
//! Every service returns the raw JSON body; envelope handling and
//! normalization happen in the controller so that mocks and the HTTP client
//! share one code path.

pub mod http;
pub mod upload;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ServiceError;
use crate::model::{AnalysisResult, KeyRequirements, UploadedFile};

pub use http::HttpStageClient;
pub use upload::{PreparedUpload, UploadPolicy};

/// Accepts a document and returns where the server stored it.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, document: PreparedUpload) -> Result<UploadedFile, ServiceError>;
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, file_path: &str) -> Result<Value, ServiceError>;
}

#[async_trait]
pub trait SolutionService: Send + Sync {
    async fn generate_solution(&self, analysis: &AnalysisResult) -> Result<Value, ServiceError>;
}

#[async_trait]
pub trait SupplierService: Send + Sync {
    async fn find_suppliers(&self, requirements: &KeyRequirements)
        -> Result<Value, ServiceError>;
}

/// The four services a controller talks to.
#[derive(Clone)]
pub struct StageServices {
    pub upload: Arc<dyn UploadTransport>,
    pub analysis: Arc<dyn AnalysisService>,
    pub solution: Arc<dyn SolutionService>,
    pub supplier: Arc<dyn SupplierService>,
}

impl StageServices {
    /// Routes every stage through one HTTP client.
    pub fn http(client: HttpStageClient) -> Self {
        let client = Arc::new(client);
        Self {
            upload: client.clone(),
            analysis: client.clone(),
            solution: client.clone(),
            supplier: client,
        }
    }

    /// Services that refuse every call. Useful when only the demo fixture
    /// is needed.
    pub fn offline() -> Self {
        let offline = Arc::new(Offline);
        Self {
            upload: offline.clone(),
            analysis: offline.clone(),
            solution: offline.clone(),
            supplier: offline,
        }
    }
}

struct Offline;

impl Offline {
    fn refuse<T>(&self, what: &str) -> Result<T, ServiceError> {
        Err(ServiceError::Unavailable(format!("{} is offline", what)))
    }
}

#[async_trait]
impl UploadTransport for Offline {
    async fn upload(&self, _document: PreparedUpload) -> Result<UploadedFile, ServiceError> {
        self.refuse("upload")
    }
}

#[async_trait]
impl AnalysisService for Offline {
    async fn analyze(&self, _file_path: &str) -> Result<Value, ServiceError> {
        self.refuse("analysis")
    }
}

#[async_trait]
impl SolutionService for Offline {
    async fn generate_solution(&self, _analysis: &AnalysisResult) -> Result<Value, ServiceError> {
        self.refuse("solution generation")
    }
}

#[async_trait]
impl SupplierService for Offline {
    async fn find_suppliers(
        &self,
        _requirements: &KeyRequirements,
    ) -> Result<Value, ServiceError> {
        self.refuse("supplier search")
    }
}
