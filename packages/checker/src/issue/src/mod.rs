pub mod filter;
pub mod issue;
pub mod normalize;
pub mod order;

pub use filter::IssueFilter;
pub use issue::{Issue, IssueOrigin, IssueSeverity};
pub use normalize::{issues_from_lint_reports, issues_from_ts_diagnostics};
pub use order::order_issues;
