use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        }
    }
}

/// Analyzer an issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueOrigin {
    #[serde(rename = "typescript")]
    TypeScript,
    #[serde(rename = "eslint")]
    EsLint,
}

/// A normalized finding. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// `None` for program-wide diagnostics.
    pub file_path: Option<String>,
    pub line: usize,
    pub column: usize,
    pub severity: IssueSeverity,
    pub message: String,
    pub origin: IssueOrigin,
    /// `TS2322` for type checker issues, the rule id for lint issues.
    pub code: String,
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = self.severity.as_str().to_ascii_uppercase();
        match &self.file_path {
            Some(file) => write!(
                f,
                "{} in {}({},{}): {}: {}",
                severity, file, self.line, self.column, self.code, self.message
            ),
            None => write!(f, "{}: {}: {}", severity, self.code, self.message),
        }
    }
}
