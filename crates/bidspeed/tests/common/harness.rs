//! Test harness for isolated controller tests.
//!
//! The `TestHarness` wires a `StageController` to:
//! - scripted services that replay queued responses and count calls
//! - a sink that records every notification and phase change
//! - a temporary directory for documents to upload

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Notify;

use bidspeed::error::ServiceError;
use bidspeed::model::{AnalysisResult, KeyRequirements, UploadedFile};
use bidspeed::notify::{Notification, NotificationLevel, NotificationSink, PhaseChange};
use bidspeed::services::{
    AnalysisService, PreparedUpload, SolutionService, StageServices, SupplierService,
    UploadTransport,
};
use bidspeed::{Phase, PipelineSession, StageController, UploadPolicy};

/// Lets a test pause a service call until it decides to release it.
#[derive(Default)]
pub struct Hold {
    pub entered: Notify,
    pub release: Notify,
}

/// Replays queued responses in order. An empty queue answers with a
/// transport-style error.
#[derive(Default)]
pub struct ScriptedService {
    responses: Mutex<VecDeque<Result<Value, ServiceError>>>,
    inputs: Mutex<Vec<Value>>,
    calls: AtomicUsize,
    hold: Option<Arc<Hold>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits on `hold.release` after signalling `hold.entered`.
    pub fn held(hold: Arc<Hold>) -> Self {
        Self {
            hold: Some(hold),
            ..Self::default()
        }
    }

    pub fn respond(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn fail_transport(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ServiceError::Unavailable("connection refused".to_string())));
    }

    pub fn fail_status(&self, status: u16, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ServiceError::Status {
                endpoint: "scripted".to_string(),
                status,
                message: message.to_string(),
            }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inputs received so far, serialized to JSON.
    pub fn inputs(&self) -> Vec<Value> {
        self.inputs.lock().unwrap().clone()
    }

    async fn answer(&self, input: Value) -> Result<Value, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input);
        if let Some(hold) = &self.hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Unavailable("no scripted response".to_string())))
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn analyze(&self, file_path: &str) -> Result<Value, ServiceError> {
        self.answer(Value::String(file_path.to_string())).await
    }
}

#[async_trait]
impl SolutionService for ScriptedService {
    async fn generate_solution(&self, analysis: &AnalysisResult) -> Result<Value, ServiceError> {
        self.answer(serde_json::to_value(analysis).unwrap()).await
    }
}

#[async_trait]
impl SupplierService for ScriptedService {
    async fn find_suppliers(
        &self,
        requirements: &KeyRequirements,
    ) -> Result<Value, ServiceError> {
        self.answer(serde_json::to_value(requirements).unwrap())
            .await
    }
}

/// Upload transport that stores files under `uploads/` unless told to fail.
#[derive(Default)]
pub struct ScriptedUpload {
    failures: Mutex<VecDeque<ServiceError>>,
    received: Mutex<Vec<PreparedUpload>>,
    stored_as: Mutex<Option<String>>,
}

impl ScriptedUpload {
    pub fn fail_next(&self, status: u16) {
        self.failures.lock().unwrap().push_back(ServiceError::Status {
            endpoint: "upload".to_string(),
            status,
            message: "upload rejected".to_string(),
        });
    }

    /// Overrides the server-side path returned for the next uploads.
    pub fn store_as(&self, file_path: &str) {
        *self.stored_as.lock().unwrap() = Some(file_path.to_string());
    }

    pub fn received(&self) -> Vec<PreparedUpload> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadTransport for ScriptedUpload {
    async fn upload(&self, document: PreparedUpload) -> Result<UploadedFile, ServiceError> {
        let filename = document.filename.clone();
        self.received.lock().unwrap().push(document);
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let file_path = self
            .stored_as
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("uploads/{}", filename));
        Ok(UploadedFile::new(filename, file_path))
    }
}

/// Something the controller reported.
#[derive(Debug, Clone)]
pub enum Recorded {
    Notification(Notification),
    Phase(PhaseChange),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Notification(n) => Some(n),
                Recorded::Phase(_) => None,
            })
            .collect()
    }

    /// Target phases in the order they were reported.
    pub fn phases(&self) -> Vec<Phase> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Phase(change) => Some(change.to),
                Recorded::Notification(_) => None,
            })
            .collect()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// `(level, message)` of the most recent notification.
    pub fn last(&self) -> Option<(NotificationLevel, String)> {
        self.last_notification().map(|n| (n.level, n.message))
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.events
            .lock()
            .unwrap()
            .push(Recorded::Notification(notification));
    }

    fn phase_changed(&self, change: PhaseChange) {
        self.events.lock().unwrap().push(Recorded::Phase(change));
    }
}

/// Test harness providing an isolated controller and session.
pub struct TestHarness {
    temp_dir: TempDir,
    pub controller: StageController,
    pub session: PipelineSession,
    pub sink: Arc<RecordingSink>,
    pub upload: Arc<ScriptedUpload>,
    pub analysis: Arc<ScriptedService>,
    pub solution: Arc<ScriptedService>,
    pub supplier: Arc<ScriptedService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_services(
            ScriptedService::new(),
            ScriptedService::new(),
            ScriptedService::new(),
        )
    }

    pub fn with_services(
        analysis: ScriptedService,
        solution: ScriptedService,
        supplier: ScriptedService,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let sink = Arc::new(RecordingSink::default());
        let upload = Arc::new(ScriptedUpload::default());
        let analysis = Arc::new(analysis);
        let solution = Arc::new(solution);
        let supplier = Arc::new(supplier);

        let services = StageServices {
            upload: upload.clone(),
            analysis: analysis.clone(),
            solution: solution.clone(),
            supplier: supplier.clone(),
        };
        let controller = StageController::new(services, sink.clone());

        Self {
            temp_dir,
            controller,
            session: PipelineSession::with_id("test-session"),
            sink,
            upload,
            analysis,
            solution,
            supplier,
        }
    }

    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.controller = self.controller.with_upload_policy(policy);
        self
    }

    /// Writes a document into the harness temp directory.
    pub fn write_document(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write document");
        path
    }

    /// Copies a file from `tests/fixtures/inputs/` into the temp directory.
    pub fn fixture_document(&self, name: &str) -> PathBuf {
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/inputs")
            .join(name);
        let contents = std::fs::read(&source).expect("Failed to read fixture input");
        self.write_document(name, &contents)
    }

    /// Records an upload without going through the transport.
    pub fn mark_uploaded(&self, filename: &str) -> UploadedFile {
        let file = UploadedFile::new(filename, format!("uploads/{}", filename));
        self.controller.upload_complete(&self.session, file.clone());
        file
    }

    pub fn total_service_calls(&self) -> usize {
        self.analysis.calls() + self.solution.calls() + self.supplier.calls()
    }
}
