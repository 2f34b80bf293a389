//! Severity completion for the bar chart.
//!
//! The bar chart shows all five levels. Levels the classifier never assigned
//! get a placeholder row instead of an empty bar.

use std::collections::BTreeSet;

use commitscope_core::{ClassifiedCommit, SeverityLevel};

/// Severity levels that no commit in `commits` carries, ascending.
///
/// # Examples
///
/// ```
/// use commitscope_classify::completion::missing_severity_levels;
///
/// let missing = missing_severity_levels(&[]);
/// assert_eq!(missing.len(), 5);
/// ```
pub fn missing_severity_levels(commits: &[ClassifiedCommit]) -> Vec<SeverityLevel> {
    let present: BTreeSet<SeverityLevel> = commits.iter().filter_map(|c| c.severity).collect();
    SeverityLevel::all()
        .into_iter()
        .filter(|level| !present.contains(level))
        .collect()
}

/// Append one placeholder row per missing severity level.
///
/// Returns the levels that were filled in.
pub fn complete_severities(commits: &mut Vec<ClassifiedCommit>) -> Vec<SeverityLevel> {
    let missing = missing_severity_levels(commits);
    for level in &missing {
        tracing::debug!(severity = %level, "adding placeholder row for missing severity");
        commits.push(ClassifiedCommit::placeholder(*level));
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitscope_core::{Category, CommitRecord};

    fn commit(severity: Option<u8>) -> ClassifiedCommit {
        ClassifiedCommit {
            record: CommitRecord {
                hash: "f".repeat(40),
                author: "alice".into(),
                email: "alice@example.com".into(),
                date: "2024-01-01 00:00:00".into(),
                message: "fix".into(),
                branches: "main".into(),
                code_changes: String::new(),
            },
            category: Some(Category::BugFix),
            severity: severity.map(|s| SeverityLevel::new(s).unwrap()),
        }
    }

    fn levels(values: &[SeverityLevel]) -> Vec<u8> {
        values.iter().map(|l| l.get()).collect()
    }

    #[test]
    fn reports_only_absent_levels() {
        let commits = vec![commit(Some(2)), commit(Some(2)), commit(Some(5))];
        assert_eq!(levels(&missing_severity_levels(&commits)), vec![1, 3, 4]);
    }

    #[test]
    fn unlabeled_commits_do_not_count() {
        let commits = vec![commit(None), commit(Some(3))];
        assert_eq!(levels(&missing_severity_levels(&commits)), vec![1, 2, 4, 5]);
    }

    #[test]
    fn completion_makes_every_level_present() {
        let mut commits = vec![commit(Some(1)), commit(Some(4))];
        let added = complete_severities(&mut commits);

        assert_eq!(levels(&added), vec![2, 3, 5]);
        assert_eq!(commits.len(), 5);
        assert!(missing_severity_levels(&commits).is_empty());
        assert!(commits[2..].iter().all(ClassifiedCommit::is_placeholder));
        assert_eq!(commits[2].record.hash, "DUMMY_2");
    }

    #[test]
    fn complete_set_is_left_alone() {
        let mut commits: Vec<_> = (1..=5).map(|s| commit(Some(s))).collect();
        assert!(complete_severities(&mut commits).is_empty());
        assert_eq!(commits.len(), 5);
    }
}
