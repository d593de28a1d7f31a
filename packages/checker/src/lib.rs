#![deny(clippy::all)]

/**
 * Incremental Checking Service
 *
 * Keeps a persistent program snapshot across the recompilations of a watch
 * session, re-checks only the files a change can affect, and merges type
 * checker and linter findings into one ordered issue stream.
 */
// Re-export the shared diagnostic types for capability implementors
pub use ts;

pub mod cancellation;
pub mod config;
pub mod error;
pub mod file_system;
pub mod issue;
pub mod lint;
pub mod logging;
pub mod program;
pub mod service;
pub mod testing;
pub mod typecheck;
pub mod worker;

pub use cancellation::CancellationToken;
pub use config::CheckerOptions;
pub use error::{CheckerError, ConfigurationError, ErrorKind, Result};
pub use issue::{Issue, IssueOrigin, IssueSeverity};
pub use service::{CheckingService, IterationReport, ServiceState};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
