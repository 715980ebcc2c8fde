//! Tracing subscriber setup for the `bidspeed` binary.
//!
//! `RUST_LOG` overrides the default filter. Records emitted through the
//! `log` facade (HTTP and config layers) are bridged into tracing.

use std::sync::Once;

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info,hyper=warn,h2=warn,reqwest=warn";

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    #[value(alias = "text")]
    Pretty,
    /// One JSON object per line.
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        if let Err(e) = tracing_log::LogTracer::init() {
            eprintln!("Failed to bridge log records: {}", e);
        }

        let registry = Registry::default().with(env_filter());
        let installed = match format {
            LogFormat::Json => tracing::subscriber::set_global_default(
                registry.with(fmt::layer().json().with_target(true)),
            ),
            LogFormat::Pretty => {
                tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
            }
        };

        if let Err(e) = installed {
            eprintln!("Failed to install tracing subscriber: {}", e);
        }
    });
}
