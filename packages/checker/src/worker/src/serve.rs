// Worker Server
//
// Serves the worker protocol over a pair of byte streams, one JSON document
// per line. Used by the worker process on stdin/stdout.

use std::io::{BufRead, Write};

use anyhow::Context;

use super::protocol::{WorkerRequest, WorkerResponse};
use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::service::CheckingService;

/// Answer requests from `reader` on `writer` until `Shutdown` or end of
/// input. A service that could not be created answers every request with
/// its construction error.
pub fn serve<R, W, F>(reader: R, mut writer: W, factory: F) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Result<CheckingService>,
{
    let mut service = factory();
    if let Err(error) = &service {
        tracing::error!(%error, "failed to create checking service");
    }

    for line in reader.lines() {
        let line = line.context("failed to read worker request")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: WorkerRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed worker request");
                continue;
            }
        };

        let response = match request {
            WorkerRequest::Shutdown => break,
            WorkerRequest::Iterate { token } => {
                let token = CancellationToken::from_descriptor(&token);
                let response = match service.as_mut() {
                    Ok(service) => WorkerResponse::from_result(service.run_iteration_with_token(&token)),
                    Err(error) => WorkerResponse::failed(error),
                };
                token.cleanup_cancellation();
                response
            }
        };

        let encoded = serde_json::to_string(&response).context("failed to encode worker response")?;
        writeln!(writer, "{}", encoded).context("failed to write worker response")?;
        writer.flush().context("failed to flush worker response")?;
    }

    if let Ok(service) = service.as_mut() {
        service.dispose();
    }
    Ok(())
}
