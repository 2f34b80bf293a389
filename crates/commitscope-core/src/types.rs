use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// One row of extracted git history.
///
/// Field names serialize to the CSV column headers written by the extractor.
///
/// # Examples
///
/// ```
/// use commitscope_core::CommitRecord;
///
/// let record = CommitRecord {
///     hash: "0123456789abcdef0123456789abcdef01234567".into(),
///     author: "alice".into(),
///     email: "alice@example.com".into(),
///     date: "2024-03-01 12:00:00".into(),
///     message: "fix: login redirect".into(),
///     branches: "main".into(),
///     code_changes: " src/login.rs | 2 +-".into(),
/// };
/// assert!(record.has_valid_hash());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full hexadecimal object id.
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Author name.
    #[serde(rename = "Author")]
    pub author: String,
    /// Author email.
    #[serde(rename = "Email")]
    pub email: String,
    /// Author timestamp as `%Y-%m-%d %H:%M:%S`.
    #[serde(rename = "Date")]
    pub date: String,
    /// Commit subject line.
    #[serde(rename = "Message")]
    pub message: String,
    /// Local branches containing the commit, joined with `"; "`.
    #[serde(rename = "Branches")]
    pub branches: String,
    /// `git show --stat` style summary of the commit.
    #[serde(rename = "Code Changes")]
    pub code_changes: String,
}

/// Column headers of the extracted history CSV, in order.
pub const HISTORY_COLUMNS: [&str; 7] = [
    "Hash",
    "Author",
    "Email",
    "Date",
    "Message",
    "Branches",
    "Code Changes",
];

/// Column headers of the classified CSV, in order.
pub const CLASSIFIED_COLUMNS: [&str; 9] = [
    "Hash",
    "Author",
    "Email",
    "Date",
    "Message",
    "Branches",
    "Code Changes",
    "Category",
    "Severity",
];

impl CommitRecord {
    /// Text handed to the zero-shot classifier: message, newline, code changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_core::CommitRecord;
    ///
    /// let record = CommitRecord {
    ///     hash: String::new(),
    ///     author: String::new(),
    ///     email: String::new(),
    ///     date: String::new(),
    ///     message: "docs: readme".into(),
    ///     branches: String::new(),
    ///     code_changes: "README.md | 4 ++--".into(),
    /// };
    /// assert_eq!(record.classifier_input(), "docs: readme\nREADME.md | 4 ++--");
    /// ```
    pub fn classifier_input(&self) -> String {
        format!("{}\n{}", self.message, self.code_changes)
    }

    /// Returns `true` if the hash is a full SHA-1 or SHA-256 hex object id.
    pub fn has_valid_hash(&self) -> bool {
        is_object_id(&self.hash)
    }
}

/// Returns `true` for a 40- or 64-character hexadecimal string.
///
/// # Examples
///
/// ```
/// use commitscope_core::is_object_id;
///
/// assert!(is_object_id("da39a3ee5e6b4b0d3255bfef95601890afd80709"));
/// assert!(!is_object_id("DUMMY_3"));
/// assert!(!is_object_id("da39a3e"));
/// ```
pub fn is_object_id(value: &str) -> bool {
    matches!(value.len(), 40 | 64) && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A commit with its zero-shot labels attached.
///
/// Either label may be absent when only one classifier was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    /// The extracted commit.
    pub record: CommitRecord,
    /// Commit-type label.
    pub category: Option<Category>,
    /// Severity label.
    pub severity: Option<SeverityLevel>,
}

const PLACEHOLDER_PREFIX: &str = "DUMMY_";

impl ClassifiedCommit {
    /// Wrap a record with no labels yet.
    pub fn unlabeled(record: CommitRecord) -> Self {
        Self {
            record,
            category: None,
            severity: None,
        }
    }

    /// Synthetic row used to make an otherwise empty severity bar appear.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_core::{Category, ClassifiedCommit, SeverityLevel};
    ///
    /// let level = SeverityLevel::new(4).unwrap();
    /// let row = ClassifiedCommit::placeholder(level);
    /// assert_eq!(row.record.hash, "DUMMY_4");
    /// assert_eq!(row.category, Some(Category::Other));
    /// assert!(row.is_placeholder());
    /// ```
    pub fn placeholder(level: SeverityLevel) -> Self {
        Self {
            record: CommitRecord {
                hash: format!("{PLACEHOLDER_PREFIX}{level}"),
                author: "dummy".into(),
                email: "dummy".into(),
                date: String::new(),
                message: format!("Dummy commit for severity {level}"),
                branches: "dummy".into(),
                code_changes: "None".into(),
            },
            category: Some(Category::Other),
            severity: Some(level),
        }
    }

    /// Returns `true` for rows produced by [`ClassifiedCommit::placeholder`].
    pub fn is_placeholder(&self) -> bool {
        self.record.hash.starts_with(PLACEHOLDER_PREFIX)
    }
}

/// Fixed set of commit-type labels offered to the classifier.
///
/// # Examples
///
/// ```
/// use commitscope_core::Category;
///
/// let c: Category = "Bug Fix".parse().unwrap();
/// assert_eq!(c, Category::BugFix);
/// assert_eq!(c.to_string(), "Bug Fix");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Bug Fix")]
    BugFix,
    #[serde(rename = "Events CRUD")]
    EventsCrud,
    #[serde(rename = "Tickets CRUD")]
    TicketsCrud,
    #[serde(rename = "Locations CRUD")]
    LocationsCrud,
    #[serde(rename = "Login CRUD")]
    LoginCrud,
    #[serde(rename = "Merge Operation")]
    MergeOperation,
    #[serde(rename = "Testing")]
    Testing,
    #[serde(rename = "Code Quality")]
    CodeQuality,
    #[serde(rename = "Refactoring")]
    Refactoring,
    #[serde(rename = "Documentation")]
    Documentation,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Category; 11] = [
        Category::BugFix,
        Category::EventsCrud,
        Category::TicketsCrud,
        Category::LocationsCrud,
        Category::LoginCrud,
        Category::MergeOperation,
        Category::Testing,
        Category::CodeQuality,
        Category::Refactoring,
        Category::Documentation,
        Category::Other,
    ];

    /// The candidate label text sent to the classifier.
    pub fn label(self) -> &'static str {
        match self {
            Category::BugFix => "Bug Fix",
            Category::EventsCrud => "Events CRUD",
            Category::TicketsCrud => "Tickets CRUD",
            Category::LocationsCrud => "Locations CRUD",
            Category::LoginCrud => "Login CRUD",
            Category::MergeOperation => "Merge Operation",
            Category::Testing => "Testing",
            Category::CodeQuality => "Code Quality",
            Category::Refactoring => "Refactoring",
            Category::Documentation => "Documentation",
            Category::Other => "Other",
        }
    }

    /// All candidate labels in declaration order.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ScopeError::InvalidLabel(format!("unknown category: {trimmed}")))
    }
}

/// Commit severity on a 1 (least critical) to 5 (most critical) scale.
///
/// # Examples
///
/// ```
/// use commitscope_core::SeverityLevel;
///
/// let level = SeverityLevel::from_label("Severity 3").unwrap();
/// assert_eq!(level.get(), 3);
/// assert_eq!(level.label(), "Severity 3");
/// assert!(SeverityLevel::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SeverityLevel(u8);

impl SeverityLevel {
    /// Lowest severity.
    pub const MIN: u8 = 1;
    /// Highest severity.
    pub const MAX: u8 = 5;

    /// Create a level, rejecting values outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, ScopeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScopeError::InvalidLabel(format!(
                "severity {value} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// All five levels in ascending order.
    pub fn all() -> [SeverityLevel; 5] {
        [Self(1), Self(2), Self(3), Self(4), Self(5)]
    }

    /// Numeric value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Candidate label text sent to the classifier, e.g. `"Severity 2"`.
    pub fn label(self) -> String {
        format!("Severity {}", self.0)
    }

    /// All five candidate labels in ascending order.
    pub fn labels() -> Vec<String> {
        Self::all().iter().map(|l| l.label()).collect()
    }

    /// Parse a `"Severity N"` label back into a level.
    pub fn from_label(label: &str) -> Result<Self, ScopeError> {
        let number = label.trim().trim_start_matches("Severity").trim();
        let value: u8 = number
            .parse()
            .map_err(|_| ScopeError::InvalidLabel(format!("not a severity label: {label}")))?;
        Self::new(value)
    }
}

impl TryFrom<u8> for SeverityLevel {
    type Error = ScopeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SeverityLevel> for u8 {
    fn from(level: SeverityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output format for CLI summaries.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use commitscope_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
