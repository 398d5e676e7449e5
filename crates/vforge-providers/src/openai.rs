//! OpenAI chat-completions client.
//!
//! Second link in the default fallback chain. Same one-attempt contract
//! and error taxonomy as the Gemini client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::text::{TextGenerator, TextRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

/// Chat-completions request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new OpenAI client with an explicit request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::request_failed(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(timeout: Duration) -> ProviderResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::request_failed("OPENAI_API_KEY not set"))?;
        Self::new(api_key, timeout)
    }

    /// Override the API base URL (used by integration tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> String {
        "openai".to_string()
    }

    async fn generate(&self, request: &TextRequest) -> ProviderResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: request.model.api_name().to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
            response_format: request
                .json_response
                .then(|| json!({"type": "json_object"})),
        };

        debug!(model = %request.model, "Calling OpenAI chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(status, error_text));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("OpenAI response parse failed: {}", e)))?;

        let text = chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ProviderError::empty_response("No content in OpenAI response"))?;

        if text.trim().is_empty() {
            return Err(ProviderError::empty_response("OpenAI returned empty text"));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vforge_models::TextModel;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "response_format": {"type": "json_object"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"ok\": true}"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let request = TextRequest::new("prompt", TextModel::Gpt4oMini).expect_json();
        let text = client.generate(&request).await.unwrap();
        assert_eq!(text, "{\"ok\": true}");
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let request = TextRequest::new("prompt", TextModel::Gpt4o);
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse(_)));
    }
}
