use ts::{flatten_diagnostic_message_text, Diagnostic, DiagnosticCategory};

use super::issue::{Issue, IssueOrigin, IssueSeverity};
use crate::lint::{LintReport, LintSeverity};
use crate::program::ProgramSnapshot;

/// Code used for lint findings without a rule, such as parse errors.
const PARSE_ERROR_CODE: &str = "parse-error";

/// Convert type checker diagnostics into issues. Positions are looked up in
/// the snapshot the diagnostics were produced from; a diagnostic without a
/// known position is placed at 1:1.
pub fn issues_from_ts_diagnostics(diagnostics: &[Diagnostic], snapshot: &ProgramSnapshot<'_>) -> Vec<Issue> {
    diagnostics
        .iter()
        .map(|diagnostic| {
            let (line, column) = match (&diagnostic.file, diagnostic.start) {
                (Some(file), Some(start)) => snapshot
                    .record(file)
                    .map_or((1, 1), |record| record.line_and_column(start)),
                _ => (1, 1),
            };

            Issue {
                file_path: diagnostic.file.clone(),
                line,
                column,
                severity: match diagnostic.category {
                    DiagnosticCategory::Error => IssueSeverity::Error,
                    _ => IssueSeverity::Warning,
                },
                message: flatten_diagnostic_message_text(&diagnostic.message_text, "\n"),
                origin: IssueOrigin::TypeScript,
                code: format!("TS{}", diagnostic.code),
            }
        })
        .collect()
}

/// Convert lint reports into issues, dropping findings turned off.
pub fn issues_from_lint_reports<'a>(reports: impl IntoIterator<Item = &'a LintReport>) -> Vec<Issue> {
    let mut issues = Vec::new();
    for report in reports {
        for finding in &report.findings {
            let severity = match finding.severity {
                LintSeverity::Off => continue,
                LintSeverity::Warning => IssueSeverity::Warning,
                LintSeverity::Error => IssueSeverity::Error,
            };
            issues.push(Issue {
                file_path: Some(report.file_path.clone()),
                line: finding.line,
                column: finding.column,
                severity,
                message: finding.message.clone(),
                origin: IssueOrigin::EsLint,
                code: finding
                    .rule_id
                    .clone()
                    .unwrap_or_else(|| PARSE_ERROR_CODE.to_string()),
            });
        }
    }
    issues
}
