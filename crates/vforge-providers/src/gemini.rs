//! Gemini text-generation client.
//!
//! Calls the public generateContent REST endpoint. One attempt per
//! call; fallback across providers is the dispatcher's job.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vforge_models::TextModel;

use crate::error::{ProviderError, ProviderResult};
use crate::text::{TextGenerator, TextRequest};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a new Gemini client with an explicit request timeout.
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

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env(timeout: Duration) -> ProviderResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ProviderError::request_failed("GEMINI_API_KEY not set"))?;
        Self::new(api_key, timeout)
    }

    /// Override the API base URL (used by integration tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> String {
        "gemini".to_string()
    }

    async fn generate(&self, request: &TextRequest) -> ProviderResult<String> {
        debug_assert!(matches!(
            request.model,
            TextModel::GeminiFlash | TextModel::GeminiFlashLite | TextModel::GeminiPro
        ));

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            request.model.api_name(),
            self.api_key
        );

        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request
                    .json_response
                    .then(|| "application/json".to_string()),
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };

        debug!(model = %request.model, "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(status, error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Gemini response parse failed: {}", e)))?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| ProviderError::empty_response("No content in Gemini response"))?;

        if text.trim().is_empty() {
            return Err(ProviderError::empty_response("Gemini returned empty text"));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_extracts_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "generated text"}]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let request = TextRequest::new("prompt", TextModel::GeminiFlash).expect_json();
        let text = client.generate(&request).await.unwrap();
        assert_eq!(text, "generated text");
    }

    #[tokio::test]
    async fn test_api_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let request = TextRequest::new("prompt", TextModel::GeminiFlash);
        let err = client.generate(&request).await.unwrap_err();
        match err {
            ProviderError::ApiError { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("rate limited"));
            }
            other => panic!("expected ApiError, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let request = TextRequest::new("prompt", TextModel::GeminiFlash);
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse(_)));
    }
}
