//! The classifier seam: candidate labels in, ranked labels out.

use commitscope_core::ScopeError;

/// Candidate labels ordered by descending score.
///
/// `scores` is either empty (backends that only rank) or parallel to `labels`.
///
/// # Examples
///
/// ```
/// use commitscope_classify::ranking::Ranking;
///
/// let ranking = Ranking::from_pairs(vec![
///     ("Testing".into(), 0.2),
///     ("Bug Fix".into(), 0.7),
///     ("Other".into(), 0.1),
/// ]);
/// assert_eq!(ranking.top(), Some("Bug Fix"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// Labels, best first.
    pub labels: Vec<String>,
    /// Scores matching `labels`, if the backend reports them.
    pub scores: Vec<f64>,
}

impl Ranking {
    /// Build a ranking from unordered `(label, score)` pairs.
    pub fn from_pairs(mut pairs: Vec<(String, f64)>) -> Self {
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let (labels, scores) = pairs.into_iter().unzip();
        Self { labels, scores }
    }

    /// Build a score-less ranking from labels already in order.
    pub fn from_ordered(labels: Vec<String>) -> Self {
        Self {
            labels,
            scores: Vec::new(),
        }
    }

    /// The top-ranked label. No thresholding is applied.
    pub fn top(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}

/// A zero-shot text classifier.
///
/// Implementations rank every entry of `candidate_labels` for `text` and must
/// only return labels drawn from that list.
#[allow(async_fn_in_trait)]
pub trait ZeroShotClassifier {
    /// Rank `candidate_labels` for `text`, best first.
    async fn classify(&self, text: &str, candidate_labels: &[String])
        -> Result<Ranking, ScopeError>;
}
