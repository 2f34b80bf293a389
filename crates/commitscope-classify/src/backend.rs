use commitscope_core::{ClassifierConfig, ScopeError};

use crate::huggingface::HuggingFaceClient;
use crate::llm::LlmClient;
use crate::ranking::{Ranking, ZeroShotClassifier};

/// The classifier selected by `classifier.provider`.
pub enum ClassifierBackend {
    /// Hugging Face zero-shot-classification endpoint.
    HuggingFace(HuggingFaceClient),
    /// OpenAI-compatible chat completions endpoint.
    Chat(LlmClient),
}

impl ClassifierBackend {
    /// Build the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Config`] for an unknown provider, or
    /// [`ScopeError::Classifier`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_core::ClassifierConfig;
    /// use commitscope_classify::backend::ClassifierBackend;
    ///
    /// let backend = ClassifierBackend::from_config(&ClassifierConfig::default()).unwrap();
    /// assert_eq!(backend.name(), "huggingface");
    /// ```
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ScopeError> {
        match config.provider.as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace(HuggingFaceClient::new(config)?)),
            "openai" => Ok(Self::Chat(LlmClient::new(config)?)),
            other => Err(ScopeError::Config(format!(
                "unknown classifier provider '{other}' (expected \"huggingface\" or \"openai\")"
            ))),
        }
    }

    /// Provider name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HuggingFace(_) => "huggingface",
            Self::Chat(_) => "openai",
        }
    }
}

impl ZeroShotClassifier for ClassifierBackend {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<Ranking, ScopeError> {
        match self {
            Self::HuggingFace(client) => client.classify(text, candidate_labels).await,
            Self::Chat(client) => client.classify(text, candidate_labels).await,
        }
    }
}
