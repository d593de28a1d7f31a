//! Checker Errors
//!
//! Error taxonomy of the checking service. Configuration errors end the
//! session, analysis failures and cancellation are local to one iteration,
//! and `NotEnabled`/`OutOfOrder` are contract violations by the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or re-reading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Cannot find project configuration at {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read project configuration {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project configuration {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid checker option '{option}': {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

/// Errors surfaced by the checking service.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// Fatal for the session.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An analyzer threw unexpectedly; only the current iteration is lost.
    #[error("Analysis failed: {0:#}")]
    AnalysisFailure(anyhow::Error),

    /// The iteration was superseded by a newer one.
    #[error("Operation was cancelled")]
    Cancelled,

    #[error("EsLint is not enabled in the checker")]
    NotEnabled,

    #[error("Operation called out of order: expected {expected}, service is {actual}")]
    OutOfOrder {
        expected: &'static str,
        actual: String,
    },

    #[error("Checking service has failed and cannot run further iterations")]
    Failed,

    #[error("Checking service has been disposed")]
    Disposed,
}

/// Stable classification used on the worker wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Configuration,
    AnalysisFailure,
    Cancelled,
    NotEnabled,
    OutOfOrder,
    Failed,
    Disposed,
}

impl ErrorKind {
    /// Whether the session can no longer continue after an error of this kind.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::Configuration | ErrorKind::Failed | ErrorKind::Disposed)
    }
}

impl CheckerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckerError::Configuration(_) => ErrorKind::Configuration,
            CheckerError::AnalysisFailure(_) => ErrorKind::AnalysisFailure,
            CheckerError::Cancelled => ErrorKind::Cancelled,
            CheckerError::NotEnabled => ErrorKind::NotEnabled,
            CheckerError::OutOfOrder { .. } => ErrorKind::OutOfOrder,
            CheckerError::Failed => ErrorKind::Failed,
            CheckerError::Disposed => ErrorKind::Disposed,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CheckerError::Cancelled)
    }
}

pub type Result<T, E = CheckerError> = std::result::Result<T, E>;
