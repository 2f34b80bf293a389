//! Category and severity tallies behind both charts and the CLI summary.

use std::collections::BTreeMap;
use std::fmt;

use commitscope_core::{Category, ClassifiedCommit, ScopeError, SeverityLevel};
use serde::{Deserialize, Serialize};

/// Share of one category in the donut chart.
///
/// # Examples
///
/// ```
/// use commitscope_charts::tally::CategoryShare;
/// use commitscope_core::Category;
///
/// let share = CategoryShare { category: Category::Testing, count: 3, percent: 30.0 };
/// assert_eq!(share.label(), "Testing\n30.0%");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Commit category.
    pub category: Category,
    /// Number of commits with this category.
    pub count: usize,
    /// `count / categorized * 100`.
    pub percent: f64,
}

impl CategoryShare {
    /// Two-line annotation drawn next to the wedge.
    pub fn label(&self) -> String {
        format!("{}\n{:.1}%", self.category, self.percent)
    }
}

/// Height of one severity bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCount {
    /// Severity level.
    pub level: SeverityLevel,
    /// Number of rows with this level, placeholders included.
    pub count: usize,
}

/// Category and severity distribution of a classified history.
///
/// Placeholder rows count toward severity bars only.
///
/// # Examples
///
/// ```
/// use commitscope_charts::tally::Distribution;
///
/// let dist = Distribution::from_commits(&[]);
/// assert_eq!(dist.total_commits, 0);
/// assert!(dist.categories.is_empty());
/// assert_eq!(dist.severities.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Real commits, placeholders excluded.
    pub total_commits: usize,
    /// Placeholder rows added by severity completion.
    pub placeholders: usize,
    /// Categories present, by descending count.
    pub categories: Vec<CategoryShare>,
    /// Severity levels 1..5, ascending.
    pub severities: Vec<SeverityCount>,
}

impl Distribution {
    /// Tally `commits`.
    ///
    /// Categories with equal counts keep label declaration order.
    pub fn from_commits(commits: &[ClassifiedCommit]) -> Self {
        let mut category_counts: BTreeMap<Category, usize> = BTreeMap::new();
        let mut severity_counts: BTreeMap<SeverityLevel, usize> =
            SeverityLevel::all().into_iter().map(|l| (l, 0)).collect();
        let mut total_commits = 0;
        let mut placeholders = 0;

        for commit in commits {
            if commit.is_placeholder() {
                placeholders += 1;
            } else {
                total_commits += 1;
                if let Some(category) = commit.category {
                    *category_counts.entry(category).or_default() += 1;
                }
            }
            if let Some(level) = commit.severity {
                *severity_counts.entry(level).or_default() += 1;
            }
        }

        let categorized: usize = category_counts.values().sum();
        let mut categories: Vec<CategoryShare> = category_counts
            .into_iter()
            .map(|(category, count)| CategoryShare {
                category,
                count,
                percent: count as f64 / categorized as f64 * 100.0,
            })
            .collect();
        // Stable sort: BTreeMap already yields declaration order.
        categories.sort_by(|a, b| b.count.cmp(&a.count));

        let severities = severity_counts
            .into_iter()
            .map(|(level, count)| SeverityCount { level, count })
            .collect();

        Self {
            total_commits,
            placeholders,
            categories,
            severities,
        }
    }

    /// Number of commits carrying a category label.
    pub fn categorized(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }

    /// Tallest severity bar.
    pub fn max_severity_count(&self) -> usize {
        self.severities.iter().map(|s| s.count).max().unwrap_or(0)
    }

    /// Pretty-printed JSON summary with camelCase keys.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, ScopeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the distribution as a markdown string.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_charts::tally::Distribution;
    ///
    /// let md = Distribution::from_commits(&[]).to_markdown();
    /// assert!(md.contains("# Commit Distribution"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Commit Distribution\n\n");
        out.push_str(&format!("**Commits:** {}\n\n", self.total_commits));

        if !self.categories.is_empty() {
            out.push_str("| Category | Commits | Share |\n");
            out.push_str("|----------|---------|-------|\n");
            for share in &self.categories {
                out.push_str(&format!(
                    "| {} | {} | {:.1}% |\n",
                    share.category, share.count, share.percent
                ));
            }
            out.push('\n');
        }

        out.push_str("| Severity | Commits |\n");
        out.push_str("|----------|---------|\n");
        for bar in &self.severities {
            out.push_str(&format!("| {} | {} |\n", bar.level, bar.count));
        }
        if self.placeholders > 0 {
            out.push_str(&format!(
                "\n_{} placeholder row(s) added for empty severity levels._\n",
                self.placeholders
            ));
        }
        out
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Commit Distribution")?;
        writeln!(f, "===================")?;
        writeln!(f, "Commits: {}\n", self.total_commits)?;

        if !self.categories.is_empty() {
            writeln!(f, "{:<20} {:>8} {:>8}", "Category", "Commits", "Share")?;
            writeln!(f, "{}", "-".repeat(38))?;
            for share in &self.categories {
                writeln!(
                    f,
                    "{:<20} {:>8} {:>7.1}%",
                    share.category.label(),
                    share.count,
                    share.percent
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "{:<20} {:>8}", "Severity", "Commits")?;
        writeln!(f, "{}", "-".repeat(29))?;
        for bar in &self.severities {
            writeln!(f, "{:<20} {:>8}", bar.level.label(), bar.count)?;
        }
        if self.placeholders > 0 {
            writeln!(
                f,
                "\n{} placeholder row(s) added for empty severity levels",
                self.placeholders
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitscope_core::CommitRecord;

    fn commit(category: Option<Category>, severity: Option<u8>) -> ClassifiedCommit {
        ClassifiedCommit {
            record: CommitRecord {
                hash: "e".repeat(40),
                author: "alice".into(),
                email: "alice@example.com".into(),
                date: "2024-01-01 00:00:00".into(),
                message: "change".into(),
                branches: "main".into(),
                code_changes: String::new(),
            },
            category,
            severity: severity.map(|s| SeverityLevel::new(s).unwrap()),
        }
    }

    #[test]
    fn categories_sorted_by_count_then_declaration() {
        let commits = vec![
            commit(Some(Category::Other), Some(1)),
            commit(Some(Category::Testing), Some(1)),
            commit(Some(Category::Testing), Some(2)),
            commit(Some(Category::BugFix), Some(3)),
            commit(Some(Category::Documentation), Some(3)),
        ];
        let dist = Distribution::from_commits(&commits);
        let order: Vec<Category> = dist.categories.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Testing,
                Category::BugFix,
                Category::Documentation,
                Category::Other
            ]
        );
        assert_eq!(dist.categories[0].count, 2);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let commits = vec![
            commit(Some(Category::BugFix), None),
            commit(Some(Category::Refactoring), None),
            commit(Some(Category::Refactoring), None),
        ];
        let dist = Distribution::from_commits(&commits);
        let sum: f64 = dist.categories.iter().map(|c| c.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((dist.categories[0].percent - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn placeholders_feed_severities_only() {
        let commits = vec![
            commit(Some(Category::BugFix), Some(2)),
            ClassifiedCommit::placeholder(SeverityLevel::new(5).unwrap()),
        ];
        let dist = Distribution::from_commits(&commits);
        assert_eq!(dist.total_commits, 1);
        assert_eq!(dist.placeholders, 1);
        assert_eq!(dist.categorized(), 1);
        assert_eq!(dist.categories[0].category, Category::BugFix);
        let counts: Vec<usize> = dist.severities.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![0, 1, 0, 0, 1]);
    }

    #[test]
    fn severities_cover_all_levels_in_order() {
        let dist = Distribution::from_commits(&[commit(None, Some(4)), commit(None, Some(4))]);
        let levels: Vec<u8> = dist.severities.iter().map(|s| s.level.get()).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
        assert_eq!(dist.max_severity_count(), 2);
        assert!(dist.categories.is_empty());
    }

    #[test]
    fn text_and_markdown_list_categories() {
        let dist = Distribution::from_commits(&[commit(Some(Category::LoginCrud), Some(3))]);
        let text = dist.to_string();
        assert!(text.contains("Login CRUD"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("Severity 3"));

        let md = dist.to_markdown();
        assert!(md.contains("| Login CRUD | 1 | 100.0% |"));
        assert!(md.contains("| 3 | 1 |"));
    }

    #[test]
    fn json_uses_labels() {
        let dist = Distribution::from_commits(&[commit(Some(Category::BugFix), Some(1))]);
        let json: serde_json::Value = serde_json::from_str(&dist.to_json().unwrap()).unwrap();
        assert_eq!(json["totalCommits"], 1);
        assert_eq!(json["categories"][0]["category"], "Bug Fix");
        assert_eq!(json["severities"][0]["level"], 1);
    }
}
