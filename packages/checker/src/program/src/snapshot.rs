// Program Snapshot
//
// Read-only view of the program state handed to the analyzer capabilities.

use indexmap::IndexMap;
use ts::CompilerOptions;

use super::record::FileRecord;
use crate::config::ProjectConfiguration;

/// A versioned, borrowed view of the program. The version changes whenever
/// the content of any file, the file set or the configuration changes.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSnapshot<'a> {
    pub(crate) version: u64,
    pub(crate) config: &'a ProjectConfiguration,
    pub(crate) records: &'a IndexMap<String, FileRecord>,
}

impl<'a> ProgramSnapshot<'a> {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn compiler_options(&self) -> &'a CompilerOptions {
        &self.config.compiler_options
    }

    pub fn config_path(&self) -> &'a str {
        &self.config.config_path
    }

    pub fn base_dir(&self) -> &'a str {
        &self.config.base_dir
    }

    /// Paths of the files of the program, in discovery order.
    pub fn files(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.records.keys().map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    pub fn record(&self, path: &str) -> Option<&'a FileRecord> {
        self.records.get(path)
    }

    pub fn source_text(&self, path: &str) -> Option<&'a str> {
        self.records.get(path).map(FileRecord::text)
    }

    /// Files `path` imports or references, as resolved in this snapshot.
    pub fn dependencies(&self, path: &str) -> &'a [String] {
        match self.records.get(path) {
            Some(record) => record.resolved_imports(),
            None => &[],
        }
    }
}
