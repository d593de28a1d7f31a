use indexmap::IndexMap;

use super::api::LintReport;

/// Latest lint report per file, in insertion order.
///
/// Holds an entry for a file exactly when the file's last lint run produced
/// findings and the file has not been removed since.
#[derive(Debug, Default, Clone)]
pub struct ReportCache {
    reports: IndexMap<String, LintReport>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, report: LintReport) {
        self.reports.insert(report.file_path.clone(), report);
    }

    pub fn remove(&mut self, path: &str) -> Option<LintReport> {
        self.reports.shift_remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&LintReport> {
        self.reports.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.reports.contains_key(path)
    }

    pub fn reports(&self) -> impl Iterator<Item = &LintReport> {
        self.reports.values()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}
