use std::sync::{Arc, Mutex};

use anyhow::{bail, Context};

use super::lock;
use crate::cancellation::CancellationToken;
use crate::file_system::FileSystem;
use crate::lint::{LintCapability, LintFinding, LintReport, LintSeverity};

#[derive(Debug, Clone)]
struct LintRule {
    needle: String,
    rule_id: String,
    severity: LintSeverity,
    message: String,
}

/// Linter reporting a finding for every occurrence of a configured text.
///
/// It can cancel a token after a number of files, to observe how quickly a
/// lint pass stops.
pub struct RuleLinter {
    fs: Arc<dyn FileSystem>,
    rules: Vec<LintRule>,
    ignored: Vec<String>,
    linted: Mutex<Vec<String>>,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
    failing: Mutex<Option<String>>,
}

impl RuleLinter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            rules: Vec::new(),
            ignored: Vec::new(),
            linted: Mutex::new(Vec::new()),
            cancel_after: Mutex::new(None),
            failing: Mutex::new(None),
        }
    }

    pub fn with_rule(mut self, needle: &str, rule_id: &str, severity: LintSeverity, message: &str) -> Self {
        self.rules.push(LintRule {
            needle: needle.to_string(),
            rule_id: rule_id.to_string(),
            severity,
            message: message.to_string(),
        });
        self
    }

    /// Files ending with `suffix` are ignored by the linter.
    pub fn ignoring(mut self, suffix: &str) -> Self {
        self.ignored.push(suffix.to_string());
        self
    }

    /// Request cancellation of `token` once `files` more files were linted.
    pub fn cancel_after(&self, files: usize, token: CancellationToken) {
        let target = lock(&self.linted).len() + files;
        *lock(&self.cancel_after) = Some((target, token));
    }

    pub fn fail_on(&self, path: Option<&str>) {
        *lock(&self.failing) = path.map(str::to_string);
    }

    /// Files linted since the last call, in lint order.
    pub fn take_linted_files(&self) -> Vec<String> {
        let mut linted = lock(&self.linted);
        let taken = std::mem::take(&mut *linted);
        if let Some((target, _)) = lock(&self.cancel_after).as_mut() {
            *target = target.saturating_sub(taken.len());
        }
        taken
    }
}

impl LintCapability for RuleLinter {
    fn lint_file(&self, path: &str) -> anyhow::Result<Option<LintReport>> {
        if self.ignored.iter().any(|suffix| path.ends_with(suffix)) {
            return Ok(None);
        }

        let linted = {
            let mut linted = lock(&self.linted);
            linted.push(path.to_string());
            linted.len()
        };
        let result = self.lint(path);

        let mut cancel_after = lock(&self.cancel_after);
        if matches!(cancel_after.as_ref(), Some((target, _)) if linted >= *target) {
            if let Some((_, token)) = cancel_after.take() {
                token.request_cancellation();
            }
        }
        result
    }
}

impl RuleLinter {
    fn lint(&self, path: &str) -> anyhow::Result<Option<LintReport>> {
        if lock(&self.failing).as_deref() == Some(path) {
            bail!("linter crashed on {}", path);
        }

        let text = self
            .fs
            .read_file(path)
            .with_context(|| format!("failed to read {}", path))?;

        let mut findings = Vec::new();
        for (line_index, line) in text.lines().enumerate() {
            for rule in &self.rules {
                for (start, _) in line.match_indices(&rule.needle) {
                    findings.push(LintFinding {
                        line: line_index + 1,
                        column: line[..start].chars().count() + 1,
                        severity: rule.severity,
                        rule_id: Some(rule.rule_id.clone()),
                        message: rule.message.clone(),
                    });
                }
            }
        }
        Ok(Some(LintReport::new(path, findings)))
    }
}

impl std::fmt::Debug for RuleLinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleLinter")
            .field("rules", &self.rules)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}
