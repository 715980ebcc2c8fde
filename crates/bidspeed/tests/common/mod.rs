//! Shared test utilities for bidspeed integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a controller to scripted services and a recording sink
//! - Builders for service responses and config files

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{RecordingSink, ScriptedService, ScriptedUpload, TestHarness};
