// Iteration Diff
//
// The files that changed between two analysis iterations.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Updated and removed files of one iteration.
///
/// Both sequences are ordered, duplicate-free and disjoint. The diff is
/// immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawIterationDiff")]
pub struct IterationDiff {
    updated_files: Vec<String>,
    removed_files: Vec<String>,
}

impl IterationDiff {
    pub fn new(
        updated_files: impl IntoIterator<Item = String>,
        removed_files: impl IntoIterator<Item = String>,
    ) -> Self {
        let removed: IndexSet<String> = removed_files.into_iter().collect();
        let updated: IndexSet<String> = updated_files
            .into_iter()
            .filter(|file| !removed.contains(file))
            .collect();
        Self {
            updated_files: updated.into_iter().collect(),
            removed_files: removed.into_iter().collect(),
        }
    }

    pub fn updated_files(&self) -> &[String] {
        &self.updated_files
    }

    pub fn removed_files(&self) -> &[String] {
        &self.removed_files
    }

    pub fn is_empty(&self) -> bool {
        self.updated_files.is_empty() && self.removed_files.is_empty()
    }
}

/// Wire form; deserialized diffs go through [`IterationDiff::new`] so the
/// invariants hold for them too.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIterationDiff {
    #[serde(default)]
    updated_files: Vec<String>,
    #[serde(default)]
    removed_files: Vec<String>,
}

impl From<RawIterationDiff> for IterationDiff {
    fn from(raw: RawIterationDiff) -> Self {
        IterationDiff::new(raw.updated_files, raw.removed_files)
    }
}

/// Changes observed but not yet handed out in a diff. Accumulates across
/// failed iterations so that no change is ever skipped.
#[derive(Debug, Default)]
pub(crate) struct PendingChanges {
    updated: IndexSet<String>,
    removed: IndexSet<String>,
}

impl PendingChanges {
    pub(crate) fn mark_updated(&mut self, path: &str) {
        self.removed.shift_remove(path);
        self.updated.insert(path.to_string());
    }

    pub(crate) fn mark_removed(&mut self, path: &str) {
        self.updated.shift_remove(path);
        self.removed.insert(path.to_string());
    }

    pub(crate) fn take(&mut self) -> IterationDiff {
        let pending = std::mem::take(self);
        IterationDiff::new(pending.updated, pending.removed)
    }
}
