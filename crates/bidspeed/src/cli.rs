//! Command-line arguments of the `bidspeed` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

/// Uploads a bid document and runs analysis, solution generation and
/// supplier search against a BidSpeed server, then prints the session state
/// as JSON.
#[derive(Parser, Debug)]
#[command(name = "bidspeed", version, about)]
pub struct CliArgs {
    #[arg(
        value_name = "DOCUMENT",
        required_unless_present = "demo",
        conflicts_with = "demo",
        help = "Bid document to upload (pdf, doc, docx or txt)"
    )]
    pub document: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Config file (default: <config dir>/bidspeed/config.json)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Load the built-in demo data instead of calling services")]
    pub demo: bool,

    #[arg(long, help = "Stream stage events to stdout as JSON lines")]
    pub events: bool,

    #[arg(long, value_enum, default_value = "pretty", help = "Log output format")]
    pub log_format: LogFormat,
}
