use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use bidspeed::cli::CliArgs;
use bidspeed::config::{default_config_path, load_config, BidSpeedConfig};
use bidspeed::logging::init_logging;
use bidspeed::{
    BroadcastSink, LogSink, NotificationSink, PipelineSession, StageController, StageOutcome,
};

/// Explicit path first, then the default location, then built-in defaults.
fn resolve_config(explicit: Option<&Path>) -> bidspeed::Result<BidSpeedConfig> {
    if let Some(path) = explicit {
        return Ok(load_config(path)?);
    }
    match default_config_path() {
        Some(path) if path.exists() => Ok(load_config(&path)?),
        _ => {
            info!("No config file found, using defaults");
            Ok(BidSpeedConfig::default())
        }
    }
}

fn build_controller(
    config: &BidSpeedConfig,
    sink: Arc<dyn NotificationSink>,
) -> bidspeed::Result<StageController> {
    Ok(StageController::from_config(config, sink)?)
}

/// Waits for the event printer to flush. Returns false if the task panicked
/// or was cancelled.
async fn drain_event_stream(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Event stream task failed");
            false
        }
    }
}

async fn run_pipeline(
    controller: &StageController,
    session: &PipelineSession,
    document: PathBuf,
) -> bool {
    let outcome = controller.upload(session, &document).await;
    if !outcome.is_completed() {
        return false;
    }

    for step in 0..3 {
        let outcome = match step {
            0 => controller.run_analysis(session).await,
            1 => controller.run_solution_generation(session).await,
            _ => controller.run_supplier_search(session).await,
        };
        if outcome != StageOutcome::Completed {
            warn!(?outcome, "Pipeline stopped");
            return false;
        }
    }
    true
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    init_logging(args.log_format);

    let config = match resolve_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut event_task = None;
    let sink: Arc<dyn NotificationSink> = if args.events {
        let broadcast = BroadcastSink::new(config.notifications.channel_capacity);
        let mut rx = broadcast.subscribe();
        event_task = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(line) => println!("{}", line),
                        Err(e) => warn!(error = %e, "Failed to encode event"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));
        Arc::new(broadcast)
    } else {
        Arc::new(LogSink)
    };

    let controller = match build_controller(&config, sink) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "Failed to create service client");
            return ExitCode::FAILURE;
        }
    };

    let session = PipelineSession::new();
    info!(session = %session.id(), "Session started");

    let succeeded = match (args.demo, args.document) {
        (true, _) => controller.load_fixture(&session).is_completed(),
        (false, Some(document)) => run_pipeline(&controller, &session, document).await,
        (false, None) => false,
    };

    // Closes the event channel.
    drop(controller);
    if let Some(task) = event_task {
        drain_event_stream(task).await;
    }

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) if !args.events => println!("{}", json),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to encode session state"),
    }

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
