use glob::Pattern;

use super::issue::{Issue, IssueOrigin, IssueSeverity};

/// Host-side filter applied to the issues of an iteration before they are
/// reported.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Type checker codes to drop, written as in `TS2322` or as `2322`.
    pub ignore_diagnostics: Vec<String>,
    /// Lint rule ids to drop.
    pub ignore_lints: Vec<String>,
    pub ignore_lint_warnings: bool,
    /// When set, only issues of files matching one of the patterns are kept.
    report_files: Vec<Pattern>,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_diagnostics(mut self, codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore_diagnostics.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn ignore_lints(mut self, rules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore_lints.extend(rules.into_iter().map(Into::into));
        self
    }

    pub fn ignore_lint_warnings(mut self, ignore: bool) -> Self {
        self.ignore_lint_warnings = ignore;
        self
    }

    pub fn report_files<S: AsRef<str>>(
        mut self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Result<Self, glob::PatternError> {
        for pattern in patterns {
            self.report_files.push(Pattern::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    pub fn allows(&self, issue: &Issue) -> bool {
        match issue.origin {
            IssueOrigin::TypeScript => {
                let code = issue.code.trim_start_matches("TS");
                if self
                    .ignore_diagnostics
                    .iter()
                    .any(|ignored| ignored.trim_start_matches("TS") == code)
                {
                    return false;
                }
            }
            IssueOrigin::EsLint => {
                if self.ignore_lint_warnings && issue.severity == IssueSeverity::Warning {
                    return false;
                }
                if self.ignore_lints.iter().any(|rule| *rule == issue.code) {
                    return false;
                }
            }
        }

        if self.report_files.is_empty() {
            return true;
        }
        match &issue.file_path {
            Some(file) => self.report_files.iter().any(|pattern| pattern.matches(file)),
            None => true,
        }
    }

    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        issues.into_iter().filter(|issue| self.allows(issue)).collect()
    }
}
