use std::path::PathBuf;

/// Errors that can occur across the commitscope workspace.
///
/// Each variant wraps a specific error domain. Library crates return this
/// type directly; the binary surfaces it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use commitscope_core::ScopeError;
///
/// let err = ScopeError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ScopeError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// CSV reading or writing failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zero-shot classifier request or response error.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Chart layout or rendering failure.
    #[error("chart error: {0}")]
    Chart(String),

    /// A label that is not part of the fixed category or severity set.
    #[error("invalid label: {0}")]
    InvalidLabel(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
