//! Error types for wattcast.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Crate-level error.
///
/// Generation itself never fails: dataset problems degrade to synthetic
/// defaults. These variants cover the I/O edges around it.
#[derive(Error, Debug)]
pub enum WattcastError {
    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{count} configuration error(s), first: {first}")]
    Config { count: usize, first: ConfigError },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Failure to deliver an alert to the external endpoint.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("alert request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("alert endpoint {url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("alert dispatch is not configured")]
    NotConfigured,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, WattcastError>;
