// Checker Options
//
// Configuration accepted by the checking service at construction.

use serde::{Deserialize, Serialize};
use ts::CompilerOptions;

use crate::error::ConfigurationError;
use crate::logging::LogLevel;

/// Options of one checking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerOptions {
    /// Path of the project's tsconfig document.
    pub tsconfig: String,
    /// Compiler options that win over the ones in the tsconfig.
    pub compiler_options: CompilerOptions,
    /// Whether a linter takes part in the session.
    pub eslint: bool,
    /// Report syntactic diagnostics in addition to semantic ones.
    pub check_syntactic_errors: bool,
    pub log_level: LogLevel,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            tsconfig: "./tsconfig.json".to_string(),
            compiler_options: CompilerOptions::default(),
            eslint: false,
            check_syntactic_errors: false,
            log_level: LogLevel::default(),
        }
    }
}

impl CheckerOptions {
    pub fn new(tsconfig: impl Into<String>) -> Self {
        Self {
            tsconfig: tsconfig.into(),
            ..Self::default()
        }
    }

    pub fn with_eslint(mut self, eslint: bool) -> Self {
        self.eslint = eslint;
        self
    }

    pub fn with_syntactic_errors(mut self, check_syntactic_errors: bool) -> Self {
        self.check_syntactic_errors = check_syntactic_errors;
        self
    }

    pub fn with_compiler_options(mut self, compiler_options: CompilerOptions) -> Self {
        self.compiler_options = compiler_options;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.tsconfig.trim().is_empty() {
            return Err(ConfigurationError::InvalidOption {
                option: "tsconfig",
                reason: "path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
