// eslint Capability
//
// Lints one file per call with `eslint --format json`.

use std::process::Command;

use anyhow::{bail, Context};
use checker::file_system::normalize_path;
use checker::lint::{LintCapability, LintReport};

/// Notice eslint reports instead of findings for files it ignores.
const IGNORED_NOTICE: &str = "File ignored";

#[derive(Debug, Clone)]
pub struct EslintCapability {
    program: String,
}

impl EslintCapability {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl LintCapability for EslintCapability {
    fn lint_file(&self, path: &str) -> anyhow::Result<Option<LintReport>> {
        let output = Command::new(&self.program)
            .args(["--format", "json", path])
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        // Exit code 1 only means findings were reported.
        if !matches!(output.status.code(), Some(0 | 1)) {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_eslint_output(&String::from_utf8_lossy(&output.stdout), path)
    }
}

/// Pick the report of `path` out of eslint's JSON output. `None` when eslint
/// ignores the file.
pub fn parse_eslint_output(output: &str, path: &str) -> anyhow::Result<Option<LintReport>> {
    let reports: Vec<LintReport> = serde_json::from_str(output).context("malformed eslint output")?;
    let path = normalize_path(path);

    let Some(mut report) = reports
        .into_iter()
        .find(|report| normalize_path(&report.file_path) == path)
    else {
        return Ok(None);
    };

    let ignored = report
        .findings
        .iter()
        .any(|finding| finding.rule_id.is_none() && finding.message.starts_with(IGNORED_NOTICE));
    if ignored {
        return Ok(None);
    }

    report.file_path = path;
    Ok(Some(report))
}
