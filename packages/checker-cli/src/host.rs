// Host Client
//
// Spawns the worker process, drives it over the JSON-lines protocol and
// prints what it reports. The worker owns the checking service; the host
// only owns cancellation tokens and the output.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use checker::issue::{IssueFilter, IssueSeverity};
use checker::logging::LogLevel;
use checker::worker::{WorkerRequest, WorkerResponse};
use checker::{CancellationToken, Issue, IterationReport};
use thiserror::Error;

use crate::args::CheckArgs;

/// The worker process went away while a request was outstanding.
#[derive(Debug, Error)]
#[error("service died: {0}")]
pub struct ServiceDied(pub String);

pub struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    /// Lines of the worker's stdout, read on a separate thread.
    responses: Receiver<io::Result<String>>,
    timeout: Option<Duration>,
}

impl WorkerProcess {
    pub fn spawn<S: AsRef<OsStr>>(program: impl AsRef<OsStr>, args: &[S]) -> anyhow::Result<Self> {
        let mut child = Command::new(program.as_ref())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start worker {:?}", program.as_ref()))?;

        let stdin = child.stdin.take().context("worker stdin is not piped")?;
        let stdout = child.stdout.take().context("worker stdout is not piped")?;

        let (sender, responses) = mpsc::channel();
        thread::Builder::new()
            .name("worker-output".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let failed = line.is_err();
                    if sender.send(line).is_err() || failed {
                        break;
                    }
                }
            })
            .context("failed to start worker output reader")?;

        Ok(Self {
            child,
            stdin,
            responses,
            timeout: None,
        })
    }

    /// Cancel an iteration the worker has not answered within `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one iteration in the worker and wait for its answer.
    ///
    /// Once the timeout elapses `token` is cancelled and the worker's
    /// answer, usually [`WorkerResponse::Cancelled`], is still awaited.
    pub fn iterate(&mut self, token: &CancellationToken) -> Result<WorkerResponse, ServiceDied> {
        let request = WorkerRequest::Iterate {
            token: token.to_descriptor(),
        };
        self.send(&request)?;
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        loop {
            let line = self.next_line(deadline, token)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(response) => return Ok(response),
                Err(error) => tracing::warn!(%error, "ignoring malformed worker response"),
            }
        }
    }

    fn next_line(&mut self, deadline: Option<Instant>, token: &CancellationToken) -> Result<String, ServiceDied> {
        loop {
            let received = match deadline {
                Some(deadline) if !token.is_cancellation_requested() => {
                    match self.responses.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                        Ok(line) => Some(line),
                        Err(RecvTimeoutError::Timeout) => {
                            tracing::warn!("worker did not answer in time, cancelling the iteration");
                            token.request_cancellation();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => None,
                    }
                }
                _ => self.responses.recv().ok(),
            };

            return match received {
                Some(Ok(line)) => Ok(line),
                Some(Err(error)) => Err(self.died(&format!("failed to read response: {}", error))),
                None => Err(self.died("worker closed its output")),
            };
        }
    }

    /// Ask the worker to stop and wait for it to exit.
    pub fn shutdown(mut self) -> anyhow::Result<()> {
        self.send(&WorkerRequest::Shutdown)?;
        let status = self.child.wait().context("failed to wait for worker")?;
        tracing::debug!(%status, "worker exited");
        Ok(())
    }

    fn send(&mut self, request: &WorkerRequest) -> Result<(), ServiceDied> {
        let written = serde_json::to_string(request)
            .map_err(anyhow::Error::from)
            .and_then(|encoded| {
                writeln!(self.stdin, "{}", encoded)?;
                self.stdin.flush()?;
                Ok(())
            });
        written.map_err(|error| self.died(&format!("failed to send request: {}", error)))
    }

    fn died(&mut self, reason: &str) -> ServiceDied {
        match self.child.wait() {
            Ok(status) => ServiceDied(format!("{} ({})", reason, status)),
            Err(_) => ServiceDied(reason.to_string()),
        }
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Clean,
    IssuesFound,
}

/// Write `issues` followed by a summary line.
pub fn print_issues(out: &mut impl Write, issues: &[Issue]) -> std::io::Result<()> {
    for issue in issues {
        writeln!(out, "{}", issue)?;
    }
    let errors = issues
        .iter()
        .filter(|issue| issue.severity == IssueSeverity::Error)
        .count();
    let warnings = issues.len() - errors;
    if issues.is_empty() {
        writeln!(out, "No issues found.")
    } else {
        writeln!(out, "Found {} error(s) and {} warning(s).", errors, warnings)
    }
}

fn report_status(report: &IterationReport, filter: &IssueFilter, out: &mut impl Write) -> anyhow::Result<CheckStatus> {
    let issues = filter.apply(report.issues.clone());
    print_issues(out, &issues)?;
    out.flush()?;
    let has_errors = issues.iter().any(|issue| issue.severity == IssueSeverity::Error);
    Ok(if has_errors {
        CheckStatus::IssuesFound
    } else {
        CheckStatus::Clean
    })
}

/// Check the project of `args` with a worker started from `program`.
///
/// Without `--watch` this runs a single iteration. In watch mode it only
/// returns when the worker dies or the session fails for good, so the result
/// is always an error there.
pub fn run_check(
    program: impl AsRef<OsStr>,
    args: &CheckArgs,
    log_level: LogLevel,
    out: &mut impl Write,
) -> anyhow::Result<CheckStatus> {
    let filter = args.issue_filter()?;
    let timeout = args.timeout.map(Duration::from_millis);
    let mut worker =
        WorkerProcess::spawn(program, &args.service.worker_command_line(log_level))?.with_timeout(timeout);
    let interval = Duration::from_millis(args.interval);
    let mut reported_once = false;

    loop {
        let token = if timeout.is_some() {
            CancellationToken::with_unique_marker_file()
        } else {
            CancellationToken::new()
        };
        let response = worker.iterate(&token);
        token.cleanup_cancellation();

        match response? {
            WorkerResponse::Issues(report) => {
                tracing::debug!(
                    iteration = report.iteration,
                    updated = report.diff.updated_files().len(),
                    removed = report.diff.removed_files().len(),
                    "iteration finished"
                );
                if !args.watch {
                    let status = report_status(&report, &filter, out)?;
                    worker.shutdown()?;
                    return Ok(status);
                }
                if !reported_once || !report.diff.is_empty() {
                    report_status(&report, &filter, out)?;
                    reported_once = true;
                }
            }
            WorkerResponse::Cancelled => {
                if !args.watch {
                    return Err(anyhow!("check cancelled, the worker did not answer in time"));
                }
                tracing::info!("iteration cancelled");
            }
            WorkerResponse::Failed { kind, message } => {
                if !args.watch || kind.is_fatal() {
                    return Err(anyhow!("{}", message));
                }
                tracing::warn!(?kind, %message, "iteration failed");
            }
        }

        thread::sleep(interval);
    }
}
