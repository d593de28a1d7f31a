/**
 * fork-checker
 *
 * Command line host of the checking service. `check` drives a worker process
 * over the JSON-lines protocol and prints the issues it reports; `worker` is
 * that process.
 */
pub mod args;
pub mod capabilities;
pub mod host;
pub mod trace;
pub mod worker_process;

pub use args::{CheckArgs, Cli, Command, ServiceArgs};
pub use host::{run_check, CheckStatus, ServiceDied, WorkerProcess};
pub use trace::init_tracing;
pub use worker_process::run_worker;
