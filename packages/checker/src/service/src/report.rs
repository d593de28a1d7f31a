use serde::{Deserialize, Serialize};

use crate::issue::Issue;
use crate::program::IterationDiff;

/// Everything one completed iteration produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationReport {
    pub iteration: u64,
    pub diff: IterationDiff,
    /// Type checker and lint issues, merged and ordered.
    pub issues: Vec<Issue>,
}

impl IterationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|issue| issue.is_error())
    }
}
