/**
 * fork-checker
 *
 * Checks a TypeScript project in a worker process.
 */
use std::process::ExitCode;

use checker_cli::{init_tracing, run_check, run_worker, CheckStatus, Cli, Command};
use clap::Parser;

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Command::Check(args) => {
            let program = std::env::current_exe()?;
            let mut stdout = std::io::stdout().lock();
            match run_check(program, &args, cli.log_level, &mut stdout)? {
                CheckStatus::Clean => Ok(ExitCode::SUCCESS),
                CheckStatus::IssuesFound => Ok(ExitCode::FAILURE),
            }
        }
        Command::Worker(args) => {
            run_worker(&args, cli.log_level)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

pub fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
