//! Gemini provider implementation for Chatboard
//!
//! This module implements the Provider trait against the Google Generative
//! Language REST API (`generateContent` and model listing).

use crate::config::ChatConfig;
use crate::credentials::ApiKey;
use crate::error::{ChatboardError, Result};
use crate::providers::{CompletionResponse, Message, ModelInfo, Provider, Role, TokenUsage};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use chatboard::config::ChatConfig;
/// use chatboard::credentials::ApiKey;
/// use chatboard::providers::{GeminiProvider, Message, Provider};
///
/// # async fn example() -> chatboard::error::Result<()> {
/// let key = ApiKey::new("AIza...").unwrap();
/// let provider = GeminiProvider::new(&ChatConfig::default(), key)?;
/// let completion = provider.complete(&[Message::user("Hello!")]).await?;
/// println!("{}", completion.message.content);
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    model: String,
    api_key: ApiKey,
}

/// Request body of `generateContent`
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// Response body of `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

/// Response body of the model listing endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ChatConfig, api_key: ApiKey) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("chatboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ChatboardError::Http)
            .context("Failed to create HTTP client")?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.api_base)
    }

    /// Convert chat messages to Gemini contents
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect()
    }

    /// Pull the reply text out of a `generateContent` response
    fn extract_reply(response: GenerateContentResponse) -> Result<CompletionResponse> {
        let usage = response.usage_metadata.as_ref().map(|u| {
            TokenUsage::new(u.prompt_token_count, u.candidates_token_count)
        });

        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(ChatboardError::Provider(format!("Response blocked: {}", reason)).into());
            }
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(ChatboardError::Provider(format!(
                "Model returned no text (finish reason: {})",
                reason
            ))
            .into());
        }

        let message = Message::assistant(text);
        Ok(match usage {
            Some(usage) => CompletionResponse::with_usage(message, usage),
            None => CompletionResponse::new(message),
        })
    }

    /// Map a transport failure to a network error
    fn network_error(e: reqwest::Error) -> ChatboardError {
        tracing::warn!("Gemini request failed: {}", e);
        if e.is_timeout() {
            ChatboardError::Network(format!("request to Gemini timed out: {}", e))
        } else {
            ChatboardError::Network(format!("failed to reach Gemini: {}", e))
        }
    }

    /// Map a non-success HTTP status to a typed error
    fn status_error(status: StatusCode, body: &str) -> ChatboardError {
        tracing::error!("Gemini returned error {}: {}", status, body);
        let invalid_key = status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || invalid_key {
            ChatboardError::Authentication(format!("Gemini rejected the API key ({})", status))
        } else {
            ChatboardError::Provider(format!("Gemini returned error {}: {}", status, body))
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = GenerateContentRequest {
            contents: Self::convert_messages(messages),
        };

        tracing::debug!(
            "Sending {} messages to Gemini model {}",
            request.contents.len(),
            self.model
        );

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(Self::network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body).into());
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            ChatboardError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let completion = Self::extract_reply(parsed)?;
        if let Some(usage) = completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Gemini token usage"
            );
        }
        Ok(completion)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.models_url())
                .header(API_KEY_HEADER, self.api_key.expose());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(Self::network_error)?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Self::status_error(status, &body).into());
            }

            let page: ListModelsResponse = response.json().await.map_err(|e| {
                ChatboardError::Provider(format!("Failed to parse Gemini model list: {}", e))
            })?;

            for m in page.models {
                let name = m.name.trim_start_matches("models/").to_string();
                let mut info = ModelInfo::new(
                    name.clone(),
                    m.display_name.unwrap_or_else(|| name.clone()),
                );
                info.supported_methods = m.supported_generation_methods;
                tracing::debug!("{} {:?}", info.name, info.supported_methods);
                models.push(info);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }

    fn get_current_model(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> GeminiProvider {
        GeminiProvider::new(&ChatConfig::default(), ApiKey::new("test-key").unwrap()).unwrap()
    }

    #[test]
    fn test_generate_url_uses_model() {
        let provider = test_provider();
        assert_eq!(
            provider.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let config = ChatConfig {
            api_base: "http://localhost:9999/".to_string(),
            ..Default::default()
        };
        let provider = GeminiProvider::new(&config, ApiKey::new("k").unwrap()).unwrap();
        assert_eq!(provider.models_url(), "http://localhost:9999/v1beta/models");
    }

    #[test]
    fn test_convert_messages_maps_roles() {
        let contents = GeminiProvider::convert_messages(&[
            Message::user("Hi"),
            Message::assistant("Hello"),
        ]);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[1].role.as_deref(), Some("model"));
        assert_eq!(contents[1].parts[0].text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_extract_reply_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
            }"#,
        )
        .unwrap();
        let completion = GeminiProvider::extract_reply(response).unwrap();
        assert_eq!(completion.message.content, "Hello there");
        assert_eq!(completion.usage, Some(TokenUsage::new(4, 2)));
    }

    #[test]
    fn test_extract_reply_blocked_prompt() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let err = GeminiProvider::extract_reply(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_reply_empty_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#,
        )
        .unwrap();
        let err = GeminiProvider::extract_reply(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_status_error_classification() {
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::FORBIDDEN, ""),
            ChatboardError::Authentication(_)
        ));
        assert!(matches!(
            GeminiProvider::status_error(
                StatusCode::BAD_REQUEST,
                r#"{"error":{"details":[{"reason":"API_KEY_INVALID"}]}}"#
            ),
            ChatboardError::Authentication(_)
        ));
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::BAD_REQUEST, "bad field"),
            ChatboardError::Provider(_)
        ));
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            ChatboardError::Provider(_)
        ));
    }

    #[test]
    fn test_current_model() {
        assert_eq!(test_provider().get_current_model(), "gemini-1.5-flash");
    }
}
