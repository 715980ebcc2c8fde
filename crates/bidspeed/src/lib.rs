pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod fixture;
pub mod gate;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod sanitize;
pub mod services;
pub mod state;

pub use config::{load_config, BidSpeedConfig};
pub use controller::{FailureKind, StageController, StageFailure, StageOutcome};
pub use error::{BidSpeedError, ConfigError, Result, ServiceError, UploadError};
pub use gate::{GateRejection, GateView};
pub use model::{AnalysisResult, SolutionResult, SupplierResult, UploadedFile};
pub use normalize::{normalize, Normalized};
pub use notify::{
    BroadcastSink, LogSink, NoopSink, Notification, NotificationLevel, NotificationSink,
    PhaseChange, StageEvent,
};
pub use services::{StageServices, UploadPolicy};
pub use state::{Phase, PipelineSession, PipelineState, Stage};
