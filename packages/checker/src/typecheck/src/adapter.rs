use ts::Diagnostic;

use super::capability::TypeCheckCapability;
use crate::error::{CheckerError, Result};
use crate::program::{ProgramSnapshot, ProgramState};

/// Asks the capability for the diagnostics of single files and assembles
/// the diagnostics of the whole program.
pub struct TypeCheckerAdapter {
    capability: Box<dyn TypeCheckCapability>,
    check_syntactic_errors: bool,
}

impl TypeCheckerAdapter {
    pub fn new(capability: Box<dyn TypeCheckCapability>, check_syntactic_errors: bool) -> Self {
        Self {
            capability,
            check_syntactic_errors,
        }
    }

    pub fn check_syntactic_errors(&self) -> bool {
        self.check_syntactic_errors
    }

    /// Syntactic diagnostics first when enabled, then semantic ones. Every
    /// returned diagnostic is attributed to `path` unless the capability
    /// placed it elsewhere.
    pub fn file_diagnostics(&self, snapshot: &ProgramSnapshot<'_>, path: &str) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        if self.check_syntactic_errors {
            diagnostics.extend(
                self.capability
                    .syntactic_diagnostics(snapshot, path)
                    .map_err(|error| failure(path, error))?,
            );
        }
        diagnostics.extend(
            self.capability
                .semantic_diagnostics(snapshot, path)
                .map_err(|error| failure(path, error))?,
        );

        for diagnostic in &mut diagnostics {
            if diagnostic.file.is_none() {
                diagnostic.file = Some(path.to_string());
            }
        }
        Ok(diagnostics)
    }

    pub fn global_diagnostics(&self, snapshot: &ProgramSnapshot<'_>) -> Result<Vec<Diagnostic>> {
        self.capability.global_diagnostics(snapshot).map_err(|error| {
            tracing::warn!(%error, "global type check failed");
            CheckerError::AnalysisFailure(error)
        })
    }

    /// The last-known diagnostics of the program: global diagnostics, then
    /// those of every file in record order.
    pub fn diagnostics(&self, state: &ProgramState) -> Vec<Diagnostic> {
        state
            .global_diagnostics()
            .iter()
            .chain(state.records().flat_map(|record| record.diagnostics()))
            .cloned()
            .collect()
    }
}

fn failure(path: &str, error: anyhow::Error) -> CheckerError {
    tracing::warn!(file = %path, error = %format!("{:#}", error), "type check failed");
    CheckerError::AnalysisFailure(error.context(format!("type checking {}", path)))
}

impl std::fmt::Debug for TypeCheckerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCheckerAdapter")
            .field("check_syntactic_errors", &self.check_syntactic_errors)
            .finish_non_exhaustive()
    }
}
