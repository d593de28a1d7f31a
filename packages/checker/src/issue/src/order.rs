use indexmap::IndexMap;

use super::issue::Issue;

/// Group issues by file in order of first appearance, then sort each group
/// by line and column. The sort is stable: equal positions keep their input
/// order, and nothing is deduplicated.
pub fn order_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut groups: IndexMap<Option<String>, Vec<Issue>> = IndexMap::new();
    for issue in issues {
        groups.entry(issue.file_path.clone()).or_default().push(issue);
    }

    groups
        .into_values()
        .flat_map(|mut group| {
            group.sort_by_key(|issue| (issue.line, issue.column));
            group
        })
        .collect()
}
