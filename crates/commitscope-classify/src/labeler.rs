//! Applies the category and severity label sets to commit records.

use std::str::FromStr;

use commitscope_core::progress::ProgressReporter;
use commitscope_core::{Category, ClassifiedCommit, CommitRecord, ScopeError, SeverityLevel};

use crate::ranking::ZeroShotClassifier;

/// Which label sets to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassifyTargets {
    /// Category and severity.
    #[default]
    Both,
    /// Category only.
    Category,
    /// Severity only.
    Severity,
}

impl ClassifyTargets {
    fn category(self) -> bool {
        matches!(self, Self::Both | Self::Category)
    }

    fn severity(self) -> bool {
        matches!(self, Self::Both | Self::Severity)
    }
}

impl FromStr for ClassifyTargets {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "category" => Ok(Self::Category),
            "severity" => Ok(Self::Severity),
            other => Err(format!("unknown classification target: {other}")),
        }
    }
}

/// Runs a [`ZeroShotClassifier`] over commits with the fixed label sets.
///
/// Every commit is classified independently and the top-ranked label wins.
///
/// # Examples
///
/// ```no_run
/// use commitscope_core::ClassifierConfig;
/// use commitscope_classify::backend::ClassifierBackend;
/// use commitscope_classify::labeler::Labeler;
///
/// let config = ClassifierConfig::default();
/// let backend = ClassifierBackend::from_config(&config).unwrap();
/// let labeler = Labeler::new(backend, config.max_input_chars);
/// ```
pub struct Labeler<C> {
    classifier: C,
    max_input_chars: usize,
    category_labels: Vec<String>,
    severity_labels: Vec<String>,
}

impl<C: ZeroShotClassifier> Labeler<C> {
    /// Wrap `classifier`; inputs longer than `max_input_chars` are cut (0 = no limit).
    pub fn new(classifier: C, max_input_chars: usize) -> Self {
        Self {
            classifier,
            max_input_chars,
            category_labels: Category::labels().into_iter().map(String::from).collect(),
            severity_labels: SeverityLevel::labels(),
        }
    }

    /// The wrapped classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Pick the commit-type label for `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Classifier`] if the classifier fails or ranks
    /// nothing, or [`ScopeError::InvalidLabel`] if the top label is not a category.
    pub async fn categorize(&self, record: &CommitRecord) -> Result<Category, ScopeError> {
        let top = self.top_label(record, &self.category_labels).await?;
        top.parse()
    }

    /// Pick the severity level for `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Classifier`] if the classifier fails or ranks
    /// nothing, or [`ScopeError::InvalidLabel`] if the top label is not `Severity 1..5`.
    pub async fn assess_severity(&self, record: &CommitRecord) -> Result<SeverityLevel, ScopeError> {
        let top = self.top_label(record, &self.severity_labels).await?;
        SeverityLevel::from_label(&top)
    }

    /// Classify every record in order. The first error aborts the run.
    ///
    /// # Errors
    ///
    /// Propagates the first classification error.
    pub async fn classify_all(
        &self,
        records: Vec<CommitRecord>,
        targets: ClassifyTargets,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<ClassifiedCommit>, ScopeError> {
        reporter.start("Classifying commits", Some(records.len() as u64));
        let mut classified = Vec::with_capacity(records.len());

        for record in records {
            let category = if targets.category() {
                Some(self.categorize(&record).await?)
            } else {
                None
            };
            let severity = if targets.severity() {
                Some(self.assess_severity(&record).await?)
            } else {
                None
            };
            tracing::debug!(
                commit = %record.hash.get(..8).unwrap_or(&record.hash),
                category = ?category,
                severity = ?severity,
                "classified commit"
            );
            classified.push(ClassifiedCommit {
                record,
                category,
                severity,
            });
            reporter.advance(1);
        }

        reporter.finish();
        Ok(classified)
    }

    async fn top_label(
        &self,
        record: &CommitRecord,
        candidates: &[String],
    ) -> Result<String, ScopeError> {
        let input = record.classifier_input();
        let text = truncate_chars(&input, self.max_input_chars);
        let ranking = self.classifier.classify(text, candidates).await?;
        ranking
            .top()
            .map(str::to_string)
            .ok_or_else(|| ScopeError::Classifier("classifier returned no labels".into()))
    }
}

/// Cut `text` to at most `max_chars` characters, never splitting a character.
///
/// A limit of zero leaves the text untouched.
///
/// # Examples
///
/// ```
/// use commitscope_classify::labeler::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("short", 100), "short");
/// assert_eq!(truncate_chars("unlimited", 0), "unlimited");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
