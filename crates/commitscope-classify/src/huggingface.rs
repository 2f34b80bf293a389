use std::time::Duration;

use commitscope_core::{ClassifierConfig, ScopeError};
use serde_json::Value;

use crate::ranking::{Ranking, ZeroShotClassifier};

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";

/// Client for a Hugging Face zero-shot-classification inference endpoint.
///
/// Sends `POST {base_url}/models/{model}` with the candidate labels as
/// pipeline parameters and single-label scoring.
///
/// # Examples
///
/// ```
/// use commitscope_core::ClassifierConfig;
/// use commitscope_classify::huggingface::HuggingFaceClient;
///
/// let client = HuggingFaceClient::new(&ClassifierConfig::default()).unwrap();
/// assert_eq!(
///     client.endpoint(),
///     "https://router.huggingface.co/hf-inference/models/facebook/bart-large-mnli"
/// );
/// ```
pub struct HuggingFaceClient {
    client: reqwest::Client,
    config: ClassifierConfig,
    api_key: Option<String>,
}

impl HuggingFaceClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Classifier`] if the HTTP client cannot be built.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ScopeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScopeError::Classifier(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key: config.resolve_api_key(),
        })
    }

    /// Full URL of the model endpoint.
    pub fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base_url}/models/{}", self.config.model)
    }
}

impl ZeroShotClassifier for HuggingFaceClient {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<Ranking, ScopeError> {
        let body = serde_json::json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": candidate_labels,
                "multi_label": false,
            },
        });

        let mut request = self.client.post(self.endpoint());
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request
            .header("Content-Type", "application/json")
            .header("x-wait-for-model", "true");

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ScopeError::Classifier(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScopeError::Classifier(format!(
                "inference API error {status}: {body_text}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ScopeError::Classifier(format!("failed to parse response: {e}")))?;

        parse_zero_shot_response(&value)
    }
}

/// Parse the response of a zero-shot-classification endpoint.
///
/// Accepts the pipeline shape `{"labels": [...], "scores": [...]}`, the same
/// object wrapped in a one-element array, and the flat
/// `[{"label": ..., "score": ...}]` list.
///
/// # Errors
///
/// Returns [`ScopeError::Classifier`] for error payloads or unrecognised shapes.
///
/// # Examples
///
/// ```
/// use commitscope_classify::huggingface::parse_zero_shot_response;
///
/// let value = serde_json::json!([
///     {"label": "Testing", "score": 0.1},
///     {"label": "Bug Fix", "score": 0.8},
/// ]);
/// let ranking = parse_zero_shot_response(&value).unwrap();
/// assert_eq!(ranking.top(), Some("Bug Fix"));
/// ```
pub fn parse_zero_shot_response(value: &Value) -> Result<Ranking, ScopeError> {
    if let Some(error) = value.get("error") {
        return Err(ScopeError::Classifier(format!("inference API error: {error}")));
    }

    if let (Some(labels), Some(scores)) = (
        value.get("labels").and_then(Value::as_array),
        value.get("scores").and_then(Value::as_array),
    ) {
        if labels.len() != scores.len() {
            return Err(ScopeError::Classifier(format!(
                "{} labels but {} scores in response",
                labels.len(),
                scores.len()
            )));
        }
        let pairs = labels
            .iter()
            .zip(scores)
            .map(|(label, score)| {
                let label = label.as_str().ok_or_else(|| {
                    ScopeError::Classifier(format!("label is not a string: {label}"))
                })?;
                let score = score.as_f64().ok_or_else(|| {
                    ScopeError::Classifier(format!("score is not a number: {score}"))
                })?;
                Ok((label.to_string(), score))
            })
            .collect::<Result<Vec<_>, ScopeError>>()?;
        return Ok(Ranking::from_pairs(pairs));
    }

    if let Some(items) = value.as_array() {
        if let [single] = items.as_slice() {
            if single.get("labels").is_some() {
                return parse_zero_shot_response(single);
            }
        }
        let pairs = items
            .iter()
            .map(|item| {
                let label = item.get("label").and_then(Value::as_str);
                let score = item.get("score").and_then(Value::as_f64);
                match (label, score) {
                    (Some(label), Some(score)) => Ok((label.to_string(), score)),
                    _ => Err(ScopeError::Classifier(format!(
                        "unexpected ranking entry: {item}"
                    ))),
                }
            })
            .collect::<Result<Vec<_>, ScopeError>>()?;
        return Ok(Ranking::from_pairs(pairs));
    }

    Err(ScopeError::Classifier(format!(
        "unexpected response structure: {value}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_construction_succeeds() {
        assert!(HuggingFaceClient::new(&ClassifierConfig::default()).is_ok());
    }

    #[test]
    fn endpoint_honours_base_url_and_model() {
        let config = ClassifierConfig {
            base_url: Some("http://localhost:8080/".into()),
            model: "MoritzLaurer/deberta-v3-large-zeroshot-v2.0".into(),
            ..ClassifierConfig::default()
        };
        let client = HuggingFaceClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/MoritzLaurer/deberta-v3-large-zeroshot-v2.0"
        );
    }

    #[test]
    fn pipeline_shape_is_parsed() {
        let value = json!({
            "sequence": "fix login\n src/login.rs | 2 +-",
            "labels": ["Login CRUD", "Bug Fix", "Other"],
            "scores": [0.61, 0.30, 0.09],
        });
        let ranking = parse_zero_shot_response(&value).unwrap();
        assert_eq!(ranking.labels, vec!["Login CRUD", "Bug Fix", "Other"]);
        assert_eq!(ranking.top(), Some("Login CRUD"));
    }

    #[test]
    fn wrapped_pipeline_shape_is_parsed() {
        let value = json!([{
            "labels": ["Severity 2", "Severity 4"],
            "scores": [0.7, 0.3],
        }]);
        let ranking = parse_zero_shot_response(&value).unwrap();
        assert_eq!(ranking.top(), Some("Severity 2"));
    }

    #[test]
    fn label_score_list_is_sorted() {
        let value = json!([
            {"label": "Documentation", "score": 0.05},
            {"label": "Refactoring", "score": 0.55},
            {"label": "Testing", "score": 0.40},
        ]);
        let ranking = parse_zero_shot_response(&value).unwrap();
        assert_eq!(ranking.labels, vec!["Refactoring", "Testing", "Documentation"]);
    }

    #[test]
    fn error_payload_is_reported() {
        let value = json!({"error": "Model facebook/bart-large-mnli is currently loading"});
        let err = parse_zero_shot_response(&value).unwrap_err();
        assert!(err.to_string().contains("currently loading"));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let value = json!({"labels": ["a", "b"], "scores": [1.0]});
        assert!(parse_zero_shot_response(&value).is_err());
    }

    #[test]
    fn unknown_shape_is_rejected() {
        assert!(parse_zero_shot_response(&json!("Bug Fix")).is_err());
        assert!(parse_zero_shot_response(&json!([{"name": "x"}])).is_err());
    }
}
