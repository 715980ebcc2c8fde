//! HTTP client for the BidSpeed `/api/*` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};

use super::{AnalysisService, PreparedUpload, SolutionService, SupplierService, UploadTransport};
use crate::config::BidSpeedConfig;
use crate::error::ServiceError;
use crate::model::{AnalysisResult, KeyRequirements, UploadedFile};
use crate::sanitize;

/// Maximum length of an error body kept for logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const UPLOAD_ENDPOINT: &str = "upload";
pub const ANALYZE_ENDPOINT: &str = "analyze";
pub const GENERATE_SOLUTION_ENDPOINT: &str = "generate-solution";
pub const FIND_SUPPLIERS_ENDPOINT: &str = "find-suppliers";

/// Extracts the `error` field of a JSON body, or a truncated copy of the
/// raw text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    sanitize::truncate(&message, MAX_ERROR_BODY_LENGTH)
}

/// Talks to all four stage endpoints of one BidSpeed server.
#[derive(Clone)]
pub struct HttpStageClient {
    client: Client,
    base_url: String,
}

impl HttpStageClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(
            "Creating stage client for {} (timeout {:?})",
            sanitize::redact_url(&base_url),
            timeout
        );
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|source| ServiceError::Transport {
                endpoint: sanitize::redact_url(&base_url),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &BidSpeedConfig) -> Result<Self, ServiceError> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ServiceError> {
        let url = self.endpoint_url(endpoint);
        debug!("POST {}", sanitize::redact_url(&url));

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        read_json(endpoint, response).await
    }
}

/// Rejects non-2xx responses and decodes the body.
async fn read_json(endpoint: &str, response: Response) -> Result<Value, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!("{} returned {}: {}", endpoint, status, message);
        return Err(ServiceError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ServiceError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl UploadTransport for HttpStageClient {
    async fn upload(&self, document: PreparedUpload) -> Result<UploadedFile, ServiceError> {
        let url = self.endpoint_url(UPLOAD_ENDPOINT);
        info!(
            "Uploading {} ({} bytes, {})",
            document.filename,
            document.bytes.len(),
            document.mime_type
        );

        let part = Part::bytes(document.bytes)
            .file_name(document.filename)
            .mime_str(&document.mime_type)
            .map_err(|source| ServiceError::Transport {
                endpoint: UPLOAD_ENDPOINT.to_string(),
                source,
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: UPLOAD_ENDPOINT.to_string(),
                source,
            })?;

        let body = read_json(UPLOAD_ENDPOINT, response).await?;
        serde_json::from_value(body).map_err(|e| ServiceError::Decode {
            endpoint: UPLOAD_ENDPOINT.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl AnalysisService for HttpStageClient {
    async fn analyze(&self, file_path: &str) -> Result<Value, ServiceError> {
        self.post_json(ANALYZE_ENDPOINT, &json!({ "file_path": file_path }))
            .await
    }
}

#[async_trait]
impl SolutionService for HttpStageClient {
    async fn generate_solution(&self, analysis: &AnalysisResult) -> Result<Value, ServiceError> {
        self.post_json(
            GENERATE_SOLUTION_ENDPOINT,
            &json!({ "bid_analysis": analysis }),
        )
        .await
    }
}

#[async_trait]
impl SupplierService for HttpStageClient {
    async fn find_suppliers(
        &self,
        requirements: &KeyRequirements,
    ) -> Result<Value, ServiceError> {
        self.post_json(
            FIND_SUPPLIERS_ENDPOINT,
            &json!({ "requirements": requirements }),
        )
        .await
    }
}
