pub mod adapter;
pub mod api;
pub mod cache;

pub use adapter::{is_declaration_file, LintAdapter, LintOutcome};
pub use api::{LintCapability, LintFinding, LintReport, LintSeverity};
pub use cache::ReportCache;
