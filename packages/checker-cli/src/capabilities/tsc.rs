// tsc Capability
//
// Runs `tsc --noEmit --pretty false` over the whole project once per program
// version and serves per-file diagnostics from that run.

use std::process::Command;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context};
use checker::file_system::join;
use checker::program::ProgramSnapshot;
use checker::typecheck::TypeCheckCapability;
use once_cell::sync::Lazy;
use regex::Regex;
use ts::{Diagnostic, DiagnosticCategory};

static LOCATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+)\((\d+),(\d+)\): (error|warning|message|suggestion) TS(\d+): (.*)$").unwrap()
});

static UNLOCATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(error|warning|message|suggestion) TS(\d+): (.*)$").unwrap());

/// One diagnostic as printed by `tsc --pretty false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TscDiagnostic {
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
    pub category: DiagnosticCategory,
    pub code: i32,
    pub message: String,
}

impl TscDiagnostic {
    /// Codes below 2000 are reported by the parser.
    pub fn is_syntactic(&self) -> bool {
        (1000..2000).contains(&self.code)
    }

    fn to_diagnostic(&self, snapshot: &ProgramSnapshot<'_>) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(self.category, self.code, self.message.as_str());
        let Some(file) = &self.file else {
            return diagnostic;
        };
        match snapshot.record(file) {
            Some(record) => diagnostic.at(file.as_str(), record.offset_of(self.line, self.column), 0),
            None => {
                diagnostic.file = Some(file.clone());
                diagnostic
            }
        }
    }
}

/// Parse `tsc` output. Relative file names are resolved against `base_dir`;
/// indented lines continue the message of the diagnostic above them.
pub fn parse_tsc_output(output: &str, base_dir: &str) -> Vec<TscDiagnostic> {
    let mut diagnostics: Vec<TscDiagnostic> = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(captures) = LOCATED.captures(line) {
            diagnostics.push(TscDiagnostic {
                file: Some(join(base_dir, &captures[1])),
                line: captures[2].parse().unwrap_or(1),
                column: captures[3].parse().unwrap_or(1),
                category: DiagnosticCategory::parse(&captures[4]).unwrap_or(DiagnosticCategory::Error),
                code: captures[5].parse().unwrap_or_default(),
                message: captures[6].to_string(),
            });
        } else if let Some(captures) = UNLOCATED.captures(line) {
            diagnostics.push(TscDiagnostic {
                file: None,
                line: 1,
                column: 1,
                category: DiagnosticCategory::parse(&captures[1]).unwrap_or(DiagnosticCategory::Error),
                code: captures[2].parse().unwrap_or_default(),
                message: captures[3].to_string(),
            });
        } else if line.starts_with(' ') && !line.trim().is_empty() {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line);
            }
        }
    }

    diagnostics
}

#[derive(Debug)]
struct TscRun {
    version: u64,
    config_path: String,
    diagnostics: Vec<TscDiagnostic>,
}

#[derive(Debug)]
pub struct TscCapability {
    program: String,
    last_run: Mutex<Option<TscRun>>,
}

impl TscCapability {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            last_run: Mutex::new(None),
        }
    }

    fn run(&self, snapshot: &ProgramSnapshot<'_>) -> anyhow::Result<Vec<TscDiagnostic>> {
        tracing::debug!(program = %self.program, version = snapshot.version(), "running type checker");
        let output = Command::new(&self.program)
            .args(["--noEmit", "--pretty", "false", "-p", snapshot.config_path()])
            .current_dir(snapshot.base_dir())
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        let diagnostics = parse_tsc_output(&String::from_utf8_lossy(&output.stdout), snapshot.base_dir());
        if !output.status.success() && diagnostics.is_empty() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(diagnostics)
    }

    /// Diagnostics of the run for the snapshot's version that satisfy
    /// `keep`, running the type checker first when the version is new.
    fn select(
        &self,
        snapshot: &ProgramSnapshot<'_>,
        keep: impl Fn(&TscDiagnostic) -> bool,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        let mut last_run = self.last_run.lock().map_err(|_| anyhow!("type checker cache is poisoned"))?;

        let is_current = last_run
            .as_ref()
            .is_some_and(|run| run.version == snapshot.version() && run.config_path == snapshot.config_path());
        if !is_current {
            *last_run = Some(TscRun {
                version: snapshot.version(),
                config_path: snapshot.config_path().to_string(),
                diagnostics: self.run(snapshot)?,
            });
        }

        Ok(last_run
            .iter()
            .flat_map(|run| run.diagnostics.iter())
            .filter(|diagnostic| keep(diagnostic))
            .map(|diagnostic| diagnostic.to_diagnostic(snapshot))
            .collect())
    }
}

impl TypeCheckCapability for TscCapability {
    fn semantic_diagnostics(&self, snapshot: &ProgramSnapshot<'_>, file: &str) -> anyhow::Result<Vec<Diagnostic>> {
        self.select(snapshot, |diagnostic| {
            diagnostic.file.as_deref() == Some(file) && !diagnostic.is_syntactic()
        })
    }

    fn syntactic_diagnostics(&self, snapshot: &ProgramSnapshot<'_>, file: &str) -> anyhow::Result<Vec<Diagnostic>> {
        self.select(snapshot, |diagnostic| {
            diagnostic.file.as_deref() == Some(file) && diagnostic.is_syntactic()
        })
    }

    /// Option diagnostics and diagnostics of files outside the program,
    /// such as declaration files of dependencies.
    fn global_diagnostics(&self, snapshot: &ProgramSnapshot<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        self.select(snapshot, |diagnostic| match &diagnostic.file {
            Some(file) => !snapshot.contains(file),
            None => true,
        })
    }
}
