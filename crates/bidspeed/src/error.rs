use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BidSpeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Failure talking to one of the remote stage services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Unsupported document type '{0}', only PDF, Word or TXT documents are accepted")]
    UnsupportedType(String),

    #[error("File '{filename}' is {size} bytes, the limit is {limit} bytes")]
    TooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BidSpeedError>;
