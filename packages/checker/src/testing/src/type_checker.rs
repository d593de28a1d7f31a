use std::sync::Mutex;

use anyhow::bail;
use once_cell::sync::Lazy;
use regex::Regex;
use ts::Diagnostic;

use super::lock;
use crate::cancellation::CancellationToken;
use crate::program::ProgramSnapshot;
use crate::typecheck::TypeCheckCapability;

static NAMED_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s*\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#).unwrap());

#[derive(Debug, Clone)]
struct TextRule {
    needle: String,
    code: i32,
    message: String,
}

/// Type checker reporting a diagnostic for every occurrence of a configured
/// text, plus optional import checks against the resolved dependencies.
///
/// Share it through an `Arc` to inspect which files were checked.
#[derive(Debug, Default)]
pub struct RuleTypeChecker {
    rules: Vec<TextRule>,
    check_imports: bool,
    global: Vec<Diagnostic>,
    checked: Mutex<Vec<String>>,
    failing: Mutex<Option<String>>,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
}

impl RuleTypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `code` at every occurrence of `needle`.
    pub fn with_rule(mut self, needle: &str, code: i32, message: &str) -> Self {
        self.rules.push(TextRule {
            needle: needle.to_string(),
            code,
            message: message.to_string(),
        });
        self
    }

    /// Report `TS2307` for named imports whose module does not resolve and
    /// `TS2305` for names none of the resolved modules export.
    pub fn with_import_checks(mut self) -> Self {
        self.check_imports = true;
        self
    }

    pub fn with_global_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.global.push(diagnostic);
        self
    }

    /// Make checking `path` fail, or stop failing with `None`.
    pub fn fail_on(&self, path: Option<&str>) {
        *lock(&self.failing) = path.map(str::to_string);
    }

    /// Request cancellation of `token` once `files` more files were checked.
    pub fn cancel_after(&self, files: usize, token: CancellationToken) {
        let target = lock(&self.checked).len() + files;
        *lock(&self.cancel_after) = Some((target, token));
    }

    /// Files semantically checked since the last call, in check order.
    pub fn take_checked_files(&self) -> Vec<String> {
        let taken = std::mem::take(&mut *lock(&self.checked));
        if let Some((target, _)) = lock(&self.cancel_after).as_mut() {
            *target = target.saturating_sub(taken.len());
        }
        taken
    }

    fn import_diagnostics(&self, snapshot: &ProgramSnapshot<'_>, file: &str, text: &str) -> Vec<Diagnostic> {
        let dependencies = snapshot.dependencies(file);
        let mut diagnostics = Vec::new();

        for captures in NAMED_IMPORT.captures_iter(text) {
            let (Some(names), Some(specifier)) = (captures.get(1), captures.get(2)) else {
                continue;
            };

            if dependencies.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        2307,
                        format!(
                            "Cannot find module '{}' or its corresponding type declarations.",
                            specifier.as_str()
                        ),
                    )
                    .at(file, specifier.start(), specifier.len()),
                );
                continue;
            }

            let mut offset = names.start();
            for entry in names.as_str().split(',') {
                let entry_start = offset;
                offset += entry.len() + 1;

                let Some(name) = entry.split_whitespace().next() else {
                    continue;
                };
                let exported = dependencies.iter().any(|dependency| {
                    snapshot
                        .source_text(dependency)
                        .is_some_and(|source| exports(source, name))
                });
                if !exported {
                    let start = entry_start + entry.find(name).unwrap_or(0);
                    diagnostics.push(
                        Diagnostic::error(
                            2305,
                            format!(
                                "Module '\"{}\"' has no exported member '{}'.",
                                specifier.as_str(),
                                name
                            ),
                        )
                        .at(file, start, name.len()),
                    );
                }
            }
        }
        diagnostics
    }
}

fn exports(source: &str, name: &str) -> bool {
    let pattern = format!(
        r"\bexport\s+(?:declare\s+)?(?:default\s+)?(?:const|let|var|function|class|interface|type|enum)\s+{}\b",
        regex::escape(name)
    );
    Regex::new(&pattern).is_ok_and(|regex| regex.is_match(source))
}

impl TypeCheckCapability for RuleTypeChecker {
    fn semantic_diagnostics(&self, snapshot: &ProgramSnapshot<'_>, file: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let checked = {
            let mut checked = lock(&self.checked);
            checked.push(file.to_string());
            checked.len()
        };
        let mut cancel_after = lock(&self.cancel_after);
        if matches!(cancel_after.as_ref(), Some((target, _)) if checked >= *target) {
            if let Some((_, token)) = cancel_after.take() {
                token.request_cancellation();
            }
        }
        drop(cancel_after);

        if lock(&self.failing).as_deref() == Some(file) {
            bail!("type checker crashed on {}", file);
        }

        let Some(text) = snapshot.source_text(file) else {
            bail!("{} is not part of the program", file);
        };

        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            for (start, _) in text.match_indices(&rule.needle) {
                diagnostics.push(
                    Diagnostic::error(rule.code, rule.message.as_str()).at(file, start, rule.needle.len()),
                );
            }
        }
        if self.check_imports {
            diagnostics.extend(self.import_diagnostics(snapshot, file, text));
        }
        diagnostics.sort_by_key(|diagnostic| diagnostic.start);
        Ok(diagnostics)
    }

    /// Unbalanced braces are a syntax error.
    fn syntactic_diagnostics(&self, snapshot: &ProgramSnapshot<'_>, file: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let text = snapshot.source_text(file).unwrap_or_default();
        let opened = text.matches('{').count();
        let closed = text.matches('}').count();
        if opened > closed {
            return Ok(vec![Diagnostic::error(1005, "'}' expected.").at(file, text.len(), 0)]);
        }
        if closed > opened {
            let start = text.rfind('}').unwrap_or(0);
            return Ok(vec![
                Diagnostic::error(1128, "Declaration or statement expected.").at(file, start, 1),
            ]);
        }
        Ok(Vec::new())
    }

    fn global_diagnostics(&self, _snapshot: &ProgramSnapshot<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.global.clone())
    }
}
