//! The `worker` side of the process boundary: a checking service with the
//! command capabilities, served on stdin/stdout.

use std::io;
use std::sync::Arc;

use checker::file_system::NativeFileSystem;
use checker::lint::LintCapability;
use checker::logging::LogLevel;
use checker::worker::serve;
use checker::CheckingService;

use crate::args::ServiceArgs;
use crate::capabilities::{EslintCapability, TscCapability};

pub fn run_worker(args: &ServiceArgs, log_level: LogLevel) -> anyhow::Result<()> {
    let options = args.checker_options(log_level);
    tracing::info!(project = %options.tsconfig, eslint = options.eslint, "starting checker worker");

    let linter = options
        .eslint
        .then(|| Box::new(EslintCapability::new(args.eslint_bin.as_str())) as Box<dyn LintCapability>);
    let type_checker = Box::new(TscCapability::new(args.tsc.as_str()));

    serve(io::stdin().lock(), io::stdout().lock(), move || {
        CheckingService::new(options, Arc::new(NativeFileSystem::new()), type_checker, linter)
    })
}
