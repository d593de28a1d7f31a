use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cancellation::CancellationTokenDescriptor;
use crate::error::{CheckerError, ErrorKind, Result};
use crate::service::IterationReport;

/// Host to worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WorkerRequest {
    /// Run one full iteration, observing `token`.
    Iterate { token: CancellationTokenDescriptor },
    Shutdown,
}

/// Worker to host, one per `Iterate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WorkerResponse {
    Issues(IterationReport),
    Cancelled,
    Failed { kind: ErrorKind, message: String },
}

impl WorkerResponse {
    pub fn from_result(result: Result<IterationReport>) -> Self {
        match result {
            Ok(report) => WorkerResponse::Issues(report),
            Err(CheckerError::Cancelled) => WorkerResponse::Cancelled,
            Err(error) => WorkerResponse::failed(&error),
        }
    }

    pub fn failed(error: &CheckerError) -> Self {
        WorkerResponse::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Error)]
#[error("checker worker is no longer running")]
pub struct WorkerGone;
