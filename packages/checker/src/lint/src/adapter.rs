use indexmap::IndexSet;

use super::api::{LintCapability, LintReport};
use super::cache::ReportCache;
use crate::cancellation::CancellationToken;
use crate::error::{CheckerError, Result};
use crate::program::IterationDiff;

const DECLARATION_EXTENSIONS: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

pub fn is_declaration_file(path: &str) -> bool {
    DECLARATION_EXTENSIONS.iter().any(|extension| path.ends_with(extension))
}

/// Result of asking the linter about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// The file is not linted at all. Its cache entry stays as it is.
    Excluded,
    /// The linter ran and found nothing.
    Clean,
    Reported(LintReport),
}

/// Drives the lint capability over the files of an iteration diff and
/// maintains the report cache.
pub struct LintAdapter {
    capability: Box<dyn LintCapability>,
    cache: ReportCache,
    /// Updated files not linted yet because an earlier update was cut short.
    deferred: IndexSet<String>,
}

impl LintAdapter {
    pub fn new(capability: Box<dyn LintCapability>) -> Self {
        Self {
            capability,
            cache: ReportCache::new(),
            deferred: IndexSet::new(),
        }
    }

    /// Declaration files are never linted.
    pub fn is_file_excluded(&self, path: &str) -> bool {
        is_declaration_file(path)
    }

    pub fn get_report(&self, path: &str) -> Result<LintOutcome> {
        if self.is_file_excluded(path) {
            return Ok(LintOutcome::Excluded);
        }

        let report = self.capability.lint_file(path).map_err(|error| {
            tracing::warn!(file = %path, error = %format!("{:#}", error), "lint failed");
            CheckerError::AnalysisFailure(error.context(format!("linting {}", path)))
        })?;

        Ok(match report {
            None => LintOutcome::Excluded,
            Some(report) if report.is_clean() => LintOutcome::Clean,
            Some(mut report) => {
                report.file_path = path.to_string();
                LintOutcome::Reported(report)
            }
        })
    }

    /// Fold one iteration diff into the cache.
    ///
    /// The token is polled before every file. When the update stops early,
    /// through cancellation or a linter failure, the files not yet linted
    /// keep their previous entries and are linted first on the next update.
    pub fn update(&mut self, diff: &IterationDiff, token: &CancellationToken) -> Result<()> {
        for path in diff.removed_files() {
            self.deferred.shift_remove(path);
            if self.cache.remove(path).is_some() {
                tracing::debug!(file = %path, "dropped lint report of removed file");
            }
        }

        let mut queue: IndexSet<String> = std::mem::take(&mut self.deferred);
        queue.extend(diff.updated_files().iter().cloned());

        let files: Vec<String> = queue.into_iter().collect();
        for (index, path) in files.iter().enumerate() {
            let outcome = token
                .throw_if_cancellation_requested()
                .and_then(|()| self.get_report(path));

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(error) => {
                    self.deferred.extend(files[index..].iter().cloned());
                    tracing::debug!(deferred = self.deferred.len(), "lint update interrupted");
                    return Err(error);
                }
            };

            match outcome {
                LintOutcome::Excluded => {}
                LintOutcome::Clean => {
                    self.cache.remove(path);
                }
                LintOutcome::Reported(report) => self.cache.insert(report),
            }
        }

        tracing::debug!(linted = files.len(), cached = self.cache.len(), "lint cache updated");
        Ok(())
    }

    /// Keep a diff that will never reach [`update`](Self::update): its
    /// removed files leave the cache now, its updated files are linted by
    /// the next update.
    pub fn defer(&mut self, diff: &IterationDiff) {
        for path in diff.removed_files() {
            self.deferred.shift_remove(path);
            self.cache.remove(path);
        }
        self.deferred.extend(diff.updated_files().iter().cloned());
        tracing::debug!(deferred = self.deferred.len(), "deferred unlinted iteration diff");
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    pub fn reports(&self) -> impl Iterator<Item = &LintReport> {
        self.cache.reports()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.deferred.clear();
    }
}

impl std::fmt::Debug for LintAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LintAdapter")
            .field("cache", &self.cache)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
