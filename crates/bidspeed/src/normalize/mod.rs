//! Result normalization for stage artifacts.
//!
//! Every remote response is untrusted. Each artifact type declares a static
//! [`Shape`] and [`normalize`] coerces raw JSON into it, so nothing
//! downstream ever has to branch on a missing field.

pub mod shape;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use shape::{Field, Shape, Variant};

/// An artifact type with a declared wire shape.
pub trait Normalized: DeserializeOwned + Default {
    /// Shape the raw response is coerced into before deserialization.
    const SHAPE: Shape;

    /// Human-readable artifact name for log lines.
    const NAME: &'static str;
}

/// Top-level keys that describe the response rather than the artifact.
const ENVELOPE_KEYS: &[&str] = &["success", "error"];

/// Coerces a raw response into `T`. Total: never fails.
///
/// Envelope keys are stripped; every other unknown key is kept.
pub fn normalize<T: Normalized>(raw: &Value) -> T {
    let shaped = match raw {
        Value::Object(fields) => {
            let mut body = fields.clone();
            for key in ENVELOPE_KEYS {
                body.remove(*key);
            }
            T::SHAPE.apply(&Value::Object(body))
        }
        _ => T::SHAPE.apply(raw),
    };
    match serde_json::from_value(shaped) {
        Ok(value) => value,
        Err(e) => {
            // Unreachable as long as SHAPE and the serde model agree.
            tracing::error!(artifact = T::NAME, error = %e, "Shape and model disagree, using defaults");
            T::default()
        }
    }
}

/// The `success` / `error` wrapper keys a stage response may carry next to
/// the artifact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub success: Option<bool>,
    pub error: Option<String>,
}

impl Envelope {
    pub fn read(raw: &Value) -> Self {
        Self {
            success: raw.get("success").and_then(Value::as_bool),
            error: raw
                .get("error")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Strict form used by the analysis stage: only `success: true` counts.
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }

    /// Lenient form: only an explicit `success: false` counts as failure.
    pub fn is_explicit_failure(&self) -> bool {
        self.success == Some(false)
    }
}
