use serde::{Deserialize, Deserializer, Serialize};

/// Severity of a lint finding. Deserializes from the numeric levels (`0`,
/// `1`, `2`) as well as the named ones (`"off"`, `"warn"`, `"error"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Off,
    Warning,
    Error,
}

impl<'de> Deserialize<'de> for LintSeverity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Level(u8),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Level(0) => Ok(LintSeverity::Off),
            Raw::Level(1) => Ok(LintSeverity::Warning),
            Raw::Level(2) => Ok(LintSeverity::Error),
            Raw::Level(other) => Err(serde::de::Error::custom(format!(
                "unknown lint severity level {}",
                other
            ))),
            Raw::Name(name) => match name.to_ascii_lowercase().as_str() {
                "off" => Ok(LintSeverity::Off),
                "warn" | "warning" => Ok(LintSeverity::Warning),
                "error" => Ok(LintSeverity::Error),
                _ => Err(serde::de::Error::custom(format!("unknown lint severity '{}'", name))),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintFinding {
    /// Findings without a location (ignored-file notices) sit at 1:1.
    #[serde(default = "first_position")]
    pub line: usize,
    #[serde(default = "first_position")]
    pub column: usize,
    pub severity: LintSeverity,
    /// Missing for parser errors reported by the linter.
    #[serde(default)]
    pub rule_id: Option<String>,
    pub message: String,
}

fn first_position() -> usize {
    1
}

/// The findings of one lint run over one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub file_path: String,
    #[serde(default, alias = "messages")]
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    pub fn new(file_path: impl Into<String>, findings: Vec<LintFinding>) -> Self {
        Self {
            file_path: file_path.into(),
            findings,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// The linting engine the service drives.
pub trait LintCapability: Send {
    /// Lint one file. `Ok(None)` means the linter ignores the file.
    fn lint_file(&self, path: &str) -> anyhow::Result<Option<LintReport>>;
}

impl<T: LintCapability + Sync + ?Sized> LintCapability for std::sync::Arc<T> {
    fn lint_file(&self, path: &str) -> anyhow::Result<Option<LintReport>> {
        (**self).lint_file(path)
    }
}
