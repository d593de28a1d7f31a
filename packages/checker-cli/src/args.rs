//! Command line arguments of `fork-checker`.

use checker::issue::IssueFilter;
use checker::logging::LogLevel;
use checker::CheckerOptions;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fork-checker")]
#[command(about = "Incremental type checking and linting in a separate process", long_about = None)]
pub struct Cli {
    /// Verbosity of stderr logging; `RUST_LOG` wins when set.
    #[arg(long = "log-level", global = true, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check a project once, or keep re-checking it with `--watch`.
    Check(CheckArgs),
    /// Serve the worker protocol on stdin/stdout.
    #[command(hide = true)]
    Worker(ServiceArgs),
}

/// Arguments shared by the host and the worker process.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Path to tsconfig.json.
    #[arg(long = "project", short = 'p', value_name = "PATH", default_value = "tsconfig.json")]
    pub project: String,

    /// Lint changed files with eslint.
    #[arg(long)]
    pub eslint: bool,

    /// Report syntactic diagnostics as well.
    #[arg(long)]
    pub syntactic: bool,

    /// Type checker executable.
    #[arg(long = "tsc", value_name = "PROGRAM", default_value = "tsc")]
    pub tsc: String,

    /// Linter executable.
    #[arg(long = "eslint-bin", value_name = "PROGRAM", default_value = "eslint")]
    pub eslint_bin: String,
}

impl ServiceArgs {
    pub fn checker_options(&self, log_level: LogLevel) -> CheckerOptions {
        CheckerOptions {
            log_level,
            ..CheckerOptions::new(self.project.as_str())
                .with_eslint(self.eslint)
                .with_syntactic_errors(self.syntactic)
        }
    }

    /// Command line of a worker process serving these arguments.
    pub fn worker_command_line(&self, log_level: LogLevel) -> Vec<String> {
        let mut args = vec![
            "worker".to_string(),
            "--project".to_string(),
            self.project.clone(),
            "--tsc".to_string(),
            self.tsc.clone(),
            "--eslint-bin".to_string(),
            self.eslint_bin.clone(),
            "--log-level".to_string(),
            log_level_name(log_level).to_string(),
        ];
        if self.eslint {
            args.push("--eslint".to_string());
        }
        if self.syntactic {
            args.push("--syntactic".to_string());
        }
        args
    }
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Keep checking and report after every change.
    #[arg(long)]
    pub watch: bool,

    /// Milliseconds between iterations in watch mode.
    #[arg(long, value_name = "MS", default_value_t = 250)]
    pub interval: u64,

    /// Cancel an iteration the worker has not answered after this many
    /// milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Type checker codes to leave out of the report, e.g. `TS2304`.
    #[arg(long = "ignore-diagnostic", value_name = "CODE")]
    pub ignore_diagnostics: Vec<String>,

    /// Lint rules to leave out of the report.
    #[arg(long = "ignore-lint", value_name = "RULE")]
    pub ignore_lints: Vec<String>,

    #[arg(long = "ignore-lint-warnings")]
    pub ignore_lint_warnings: bool,

    /// Only report issues of files matching one of these globs.
    #[arg(long = "report-files", value_name = "GLOB")]
    pub report_files: Vec<String>,
}

impl CheckArgs {
    pub fn issue_filter(&self) -> anyhow::Result<IssueFilter> {
        let filter = IssueFilter::new()
            .ignore_diagnostics(self.ignore_diagnostics.iter().cloned())
            .ignore_lints(self.ignore_lints.iter().cloned())
            .ignore_lint_warnings(self.ignore_lint_warnings);
        if self.report_files.is_empty() {
            return Ok(filter);
        }
        Ok(filter.report_files(&self.report_files)?)
    }
}

fn log_level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
