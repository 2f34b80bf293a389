use std::time::Duration;

use commitscope_core::{ClassifierConfig, ScopeError};
use serde::{Deserialize, Serialize};

use crate::ranking::{Ranking, ZeroShotClassifier};

/// One turn of the ranking prompt.
///
/// # Examples
///
/// ```
/// use commitscope_classify::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Classify this commit".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: Role,
    /// Prompt or answer text.
    pub content: String,
}

/// Speaker of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ranking instructions.
    System,
    /// User input.
    User,
}

const SYSTEM_PROMPT: &str = "You are a zero-shot text classifier for git commits. \
You are given a commit (subject line followed by a change summary) and a list of \
candidate labels. Rank every candidate label from most to least fitting. \
Use the labels exactly as written. Respond with a JSON object of the form \
{\"labels\": [\"<best label>\", \"<next label>\", ...]}.";

/// OpenAI-compatible chat completions client used as a zero-shot classifier.
///
/// Any server speaking the OpenAI `/v1/chat/completions` protocol works, hosted
/// or local.
///
/// # Examples
///
/// ```
/// use commitscope_core::ClassifierConfig;
/// use commitscope_classify::llm::LlmClient;
///
/// let config = ClassifierConfig {
///     provider: "openai".into(),
///     model: "gpt-4o-mini".into(),
///     api_key: Some("test-key".into()),
///     ..ClassifierConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gpt-4o-mini");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: ClassifierConfig,
    api_key: Option<String>,
}

impl LlmClient {
    /// Build the HTTP client with the configured request timeout.
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

    /// Chat model used for ranking.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send `messages` and return the content of the first choice.
    ///
    /// Builds a request to `{base_url}/v1/chat/completions` with the given
    /// messages, temperature 0, and JSON response format.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Classifier`] on HTTP errors or response parsing failures.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ScopeError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
            .trim_end_matches('/');
        let url = format!("{base_url}/v1/chat/completions");

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": 0.0,
            "response_format": { "type": "json_object" },
        });

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request.header("Content-Type", "application/json");

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ScopeError::Classifier(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScopeError::Classifier(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScopeError::Classifier(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ScopeError::Classifier(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }
}

impl ZeroShotClassifier for LlmClient {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<Ranking, ScopeError> {
        let messages = build_messages(text, candidate_labels);
        let content = self.chat(messages).await?;
        parse_chat_ranking(&content, candidate_labels)
    }
}

/// Build the system and user messages for one classification.
pub fn build_messages(text: &str, candidate_labels: &[String]) -> Vec<ChatMessage> {
    let labels = candidate_labels
        .iter()
        .map(|l| format!("- {l}"))
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        ChatMessage {
            role: Role::System,
            content: SYSTEM_PROMPT.into(),
        },
        ChatMessage {
            role: Role::User,
            content: format!("Candidate labels:\n{labels}\n\nCommit:\n{text}"),
        },
    ]
}

#[derive(Deserialize)]
struct ChatRanking {
    labels: Vec<String>,
}

/// Parse the model's JSON answer into a ranking over `candidate_labels`.
///
/// Labels are matched case-insensitively and mapped back to their canonical
/// spelling; anything outside the candidate set is dropped, as are
/// duplicates. Candidates the model left out are appended in their candidate
/// order.
///
/// # Errors
///
/// Returns [`ScopeError::Classifier`] if the answer is not JSON or names no
/// candidate label.
///
/// # Examples
///
/// ```
/// use commitscope_classify::llm::parse_chat_ranking;
///
/// let candidates = vec!["Bug Fix".to_string(), "Testing".to_string()];
/// let ranking = parse_chat_ranking(r#"{"labels": ["testing"]}"#, &candidates).unwrap();
/// assert_eq!(ranking.labels, vec!["Testing", "Bug Fix"]);
/// ```
pub fn parse_chat_ranking(content: &str, candidate_labels: &[String]) -> Result<Ranking, ScopeError> {
    let json = strip_code_fence(content);
    let parsed: ChatRanking = serde_json::from_str(json)
        .map_err(|e| ScopeError::Classifier(format!("model answer is not a label list: {e}")))?;

    let mut ordered: Vec<String> = Vec::with_capacity(candidate_labels.len());
    for label in &parsed.labels {
        let canonical = candidate_labels
            .iter()
            .find(|c| c.eq_ignore_ascii_case(label.trim()));
        match canonical {
            Some(c) if !ordered.contains(c) => ordered.push(c.clone()),
            Some(_) => {}
            None => tracing::debug!(label = %label, "dropping label outside the candidate set"),
        }
    }

    if ordered.is_empty() {
        return Err(ScopeError::Classifier(format!(
            "model answer contains no candidate label: {content}"
        )));
    }

    for candidate in candidate_labels {
        if !ordered.contains(candidate) {
            ordered.push(candidate.clone());
        }
    }
    Ok(Ranking::from_ordered(ordered))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        vec!["Severity 1".into(), "Severity 2".into(), "Severity 3".into()]
    }

    #[test]
    fn client_construction_succeeds() {
        let config = ClassifierConfig {
            provider: "openai".into(),
            ..ClassifierConfig::default()
        };
        assert!(LlmClient::new(&config).is_ok());
    }

    #[test]
    fn chat_message_serializes() {
        let msg = ChatMessage {
            role: Role::System,
            content: "hello".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn messages_list_every_candidate() {
        let messages = build_messages("fix: crash\n a.rs | 1 +", &candidates());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("- Severity 1"));
        assert!(messages[1].content.contains("- Severity 3"));
        assert!(messages[1].content.ends_with("fix: crash\n a.rs | 1 +"));
    }

    #[test]
    fn unknown_and_duplicate_labels_are_dropped() {
        let ranking = parse_chat_ranking(
            r#"{"labels": ["Severity 9", "severity 3", "Severity 3", "Severity 1"]}"#,
            &candidates(),
        )
        .unwrap();
        assert_eq!(ranking.labels, vec!["Severity 3", "Severity 1", "Severity 2"]);
    }

    #[test]
    fn fenced_answers_are_accepted() {
        let content = "```json\n{\"labels\": [\"Severity 2\"]}\n```";
        let ranking = parse_chat_ranking(content, &candidates()).unwrap();
        assert_eq!(ranking.top(), Some("Severity 2"));
    }

    #[test]
    fn answer_without_candidates_is_an_error() {
        assert!(parse_chat_ranking(r#"{"labels": ["Critical"]}"#, &candidates()).is_err());
        assert!(parse_chat_ranking("Severity 2", &candidates()).is_err());
    }
}
