use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Top-level configuration loaded from `.commitscope.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use commitscope_core::ScopeConfig;
///
/// let config = ScopeConfig::default();
/// assert_eq!(config.classifier.model, "facebook/bart-large-mnli");
/// assert!(config.charts.fill_missing_severities);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// History extraction settings.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Zero-shot classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Chart rendering settings.
    #[serde(default)]
    pub charts: ChartConfig,
    /// Output file locations.
    #[serde(default)]
    pub output: OutputConfig,
}

impl ScopeConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Io`] if the file cannot be read, or
    /// [`ScopeError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ScopeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_core::ScopeConfig;
    ///
    /// let toml = r#"
    /// [history]
    /// max_commits = 50
    /// "#;
    /// let config = ScopeConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.history.max_commits, 50);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ScopeError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// How commit timestamps are rendered in the `Date` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    /// The machine's local timezone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

/// History extraction configuration.
///
/// Zero means "no limit" for the numeric fields.
///
/// # Examples
///
/// ```
/// use commitscope_core::{HistoryConfig, Timezone};
///
/// let config = HistoryConfig::default();
/// assert_eq!(config.since_days, 0);
/// assert_eq!(config.timezone, Timezone::Local);
/// assert!(config.branch.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Only include commits from the last N days.
    #[serde(default)]
    pub since_days: u64,
    /// Stop after this many commits.
    #[serde(default)]
    pub max_commits: usize,
    /// Walk a single branch instead of every reference.
    pub branch: Option<String>,
    /// Keep only commits whose author name or email contains this text.
    pub author: Option<String>,
    /// Timezone for the `Date` column.
    #[serde(default)]
    pub timezone: Timezone,
}

/// Zero-shot classifier configuration.
///
/// # Examples
///
/// ```
/// use commitscope_core::ClassifierConfig;
///
/// let config = ClassifierConfig::default();
/// assert_eq!(config.provider, "huggingface");
/// assert_eq!(config.api_key_env(), "HF_TOKEN");
/// assert_eq!(config.max_input_chars, 2000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Backend name (`"huggingface"` or `"openai"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Truncate classifier input to this many characters.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "huggingface".into()
}

fn default_model() -> String {
    "facebook/bart-large-mnli".into()
}

fn default_max_input_chars() -> usize {
    2000
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            max_input_chars: default_max_input_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    /// Environment variable consulted when `api_key` is not set.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "HF_TOKEN",
        }
    }

    /// The configured key, falling back to the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.api_key_env()).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Chart rendering configuration.
///
/// # Examples
///
/// ```
/// use commitscope_core::ChartConfig;
///
/// let config = ChartConfig::default();
/// assert_eq!((config.width, config.height), (2400, 1500));
/// assert!(config.font.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// TrueType font used for titles and labels.
    pub font: Option<PathBuf>,
    /// Insert placeholder rows so all five severity bars appear.
    #[serde(default = "default_fill_missing_severities")]
    pub fill_missing_severities: bool,
}

fn default_width() -> u32 {
    2400
}

fn default_height() -> u32 {
    1500
}

fn default_fill_missing_severities() -> bool {
    true
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font: None,
            fill_missing_severities: default_fill_missing_severities(),
        }
    }
}

/// Output file locations.
///
/// # Examples
///
/// ```
/// use commitscope_core::OutputConfig;
/// use std::path::Path;
///
/// let config = OutputConfig::default();
/// assert_eq!(config.history_csv, Path::new("git_history.csv"));
/// assert_eq!(config.donut_png, Path::new("commit_categories_donut.png"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extracted history CSV.
    #[serde(default = "default_history_csv")]
    pub history_csv: PathBuf,
    /// Classified history CSV.
    #[serde(default = "default_classified_csv")]
    pub classified_csv: PathBuf,
    /// Category donut chart.
    #[serde(default = "default_donut_png")]
    pub donut_png: PathBuf,
    /// Severity bar chart.
    #[serde(default = "default_bar_png")]
    pub bar_png: PathBuf,
}

fn default_history_csv() -> PathBuf {
    PathBuf::from("git_history.csv")
}

fn default_classified_csv() -> PathBuf {
    PathBuf::from("git_history_classified.csv")
}

fn default_donut_png() -> PathBuf {
    PathBuf::from("commit_categories_donut.png")
}

fn default_bar_png() -> PathBuf {
    PathBuf::from("commit_severity_bar.png")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            history_csv: default_history_csv(),
            classified_csv: default_classified_csv(),
            donut_png: default_donut_png(),
            bar_png: default_bar_png(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ScopeConfig::default();
        assert_eq!(config.history.since_days, 0);
        assert_eq!(config.history.max_commits, 0);
        assert!(config.history.author.is_none());
        assert_eq!(config.classifier.provider, "huggingface");
        assert_eq!(config.classifier.model, "facebook/bart-large-mnli");
        assert_eq!(config.classifier.timeout_secs, 120);
        assert_eq!(config.charts.width, 2400);
        assert_eq!(config.charts.height, 1500);
        assert!(config.charts.fill_missing_severities);
        assert_eq!(
            config.output.classified_csv,
            PathBuf::from("git_history_classified.csv")
        );
        assert_eq!(config.output.bar_png, PathBuf::from("commit_severity_bar.png"));
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[history]
since_days = 90
max_commits = 500
branch = "develop"
author = "alice"
timezone = "utc"

[classifier]
provider = "openai"
model = "gpt-4o-mini"
base_url = "http://localhost:11434"
max_input_chars = 800
timeout_secs = 30

[charts]
width = 1200
height = 750
font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
fill_missing_severities = false

[output]
history_csv = "out/history.csv"
"#;
        let config = ScopeConfig::from_toml(toml).unwrap();
        assert_eq!(config.history.since_days, 90);
        assert_eq!(config.history.branch.as_deref(), Some("develop"));
        assert_eq!(config.history.timezone, Timezone::Utc);
        assert_eq!(config.classifier.provider, "openai");
        assert_eq!(config.classifier.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.classifier.max_input_chars, 800);
        assert_eq!(config.charts.width, 1200);
        assert!(!config.charts.fill_missing_severities);
        assert!(config.charts.font.is_some());
        assert_eq!(config.output.history_csv, PathBuf::from("out/history.csv"));
        assert_eq!(
            config.output.donut_png,
            PathBuf::from("commit_categories_donut.png")
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ScopeConfig::from_toml("").unwrap();
        assert_eq!(config.classifier.max_input_chars, 2000);
        assert_eq!(config.output.history_csv, PathBuf::from("git_history.csv"));
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(ScopeConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let result = ScopeConfig::from_toml("[history]\ntimezone = \"mars\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn configured_api_key_wins() {
        let config = ClassifierConfig {
            api_key: Some("hf_configured".into()),
            ..ClassifierConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("hf_configured"));
    }
}
