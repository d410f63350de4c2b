// src/error.rs
// =============================================================================
// Error types for the exporter.
//
// Two kinds of failures exist:
// - Fatal, pre-flight failures (bad configuration, failed login). These abort
//   the run before any traversal happens.
// - Per-request failures (a node, a listing page, a binary, an output file).
//   These are caught where they happen, logged, counted and skipped.
//
// thiserror generates the Display and Error impls from the attributes below.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unusable configuration, detected before login.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("invalid depth {0}: use -1 for unbounded or a non-negative number")]
    InvalidDepth(i64),

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    #[error("unable to create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Login / logout failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unable to post {action} form: {source}")]
    Transport {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{action} was rejected with HTTP 403")]
    Rejected { action: &'static str },

    #[error("login failed, no session cookie was issued; please check your credentials")]
    NoSession,
}

/// Everything that can go wrong with a single remote request.
///
/// All variants are recoverable: the crawler skips the node, page or binary
/// and keeps going.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("unable to decode response from {url} (HTTP {status}): {message}; body: {snippet}")]
    Decode {
        url: String,
        status: u16,
        message: String,
        snippet: String,
    },

    #[error("remote fault {code} for {url}: {message}")]
    RemoteFault {
        url: String,
        code: i64,
        message: String,
    },

    #[error("no item returned for id {0}")]
    Missing(String),

    #[error("filesystem error on {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn transport(url: &str, error: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// True when the remote system itself reported the failure.
    pub fn is_remote_fault(&self) -> bool {
        matches!(self, FetchError::RemoteFault { .. })
    }
}

/// Output sink failures (serialising or writing a JSON document).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("unable to serialize document for {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
