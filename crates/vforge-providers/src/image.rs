//! Image-generation client for the OpenAI Images API.
//!
//! Requests are validated against the model's capability descriptor
//! before any network call: an unsupported size snaps to the nearest
//! supported size (logged as a notice, the one documented
//! auto-substitution); the quality parameter is sent only to models
//! that accept it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vforge_models::{ImageModel, ImageQuality, ImageSize, VideoId};

use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// A single image-generation request.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Fully-formed image prompt (style fragment already applied)
    pub prompt: String,
    /// Target model
    pub model: ImageModel,
    /// Requested output size
    pub size: ImageSize,
    /// Quality tier; ignored by models without quality support
    pub quality: ImageQuality,
    /// Video this generation is billed against
    pub video_id: VideoId,
}

/// Result of one image generation.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Provider-hosted (ephemeral) image URL
    pub url: String,
    /// Prompt as revised by the provider, when reported
    pub revised_prompt: Option<String>,
}

/// An image-generation provider client.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Perform one generation attempt.
    async fn generate(&self, request: &ImageRequest) -> ProviderResult<GeneratedImage>;
}

/// Images API request body.
#[derive(Debug, Serialize)]
struct ImagesApiRequest {
    model: String,
    prompt: String,
    n: u8,
    size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
}

/// Images API response body.
#[derive(Debug, Deserialize)]
struct ImagesApiResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// OpenAI Images API client.
pub struct OpenAiImageClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiImageClient {
    /// Create a new image client with an explicit request timeout.
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

    /// Resolve the effective size for a request, snapping when needed.
    fn effective_size(request: &ImageRequest) -> ImageSize {
        let snapped = request.size.nearest_supported(request.model);
        if snapped != request.size {
            info!(
                model = %request.model,
                requested = %request.size,
                snapped = %snapped,
                "Requested size unsupported by model, snapping to nearest"
            );
        }
        snapped
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    async fn generate(&self, request: &ImageRequest) -> ProviderResult<GeneratedImage> {
        if request.prompt.trim().is_empty() {
            return Err(ProviderError::unsupported("Image prompt is empty"));
        }

        let size = Self::effective_size(request);
        let body = ImagesApiRequest {
            model: request.model.api_name().to_string(),
            prompt: request.prompt.clone(),
            n: 1,
            size: size.as_str().to_string(),
            quality: request
                .model
                .supports_quality()
                .then(|| request.quality.as_str().to_string()),
        };

        debug!(
            model = %request.model,
            size = %size,
            video_id = %request.video_id,
            "Calling Images API"
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed(format!("Images API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(status, error_text));
        }

        let api_response: ImagesApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Images API response parse failed: {}", e)))?;

        let image = api_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::empty_response("Images API returned no data"))?;

        let url = image
            .url
            .ok_or_else(|| ProviderError::empty_response("Images API returned no URL"))?;

        Ok(GeneratedImage {
            url,
            revised_prompt: image.revised_prompt,
        })
    }
}

/// Download provider-hosted image bytes with an explicit timeout.
pub async fn download_image(url: &str, timeout: Duration) -> ProviderResult<Vec<u8>> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::download_failed(format!("HTTP client build failed: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::download_failed(format!("Image download failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(ProviderError::download_failed(format!(
            "Image download returned {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderError::download_failed(format!("Image body read failed: {}", e)))?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: ImageModel, size: ImageSize) -> ImageRequest {
        ImageRequest {
            prompt: "a lighthouse at dusk".to_string(),
            model,
            size,
            quality: ImageQuality::Standard,
            video_id: VideoId::from_string("v1"),
        }
    }

    #[tokio::test]
    async fn test_generate_returns_url_and_revised_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "dall-e-3",
                "size": "1024x1024",
                "quality": "standard",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"url": "https://img.example/1.png", "revised_prompt": "revised"}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let image = client
            .generate(&request(ImageModel::DallE3, ImageSize::Square1024))
            .await
            .unwrap();
        assert_eq!(image.url, "https://img.example/1.png");
        assert_eq!(image.revised_prompt.as_deref(), Some("revised"));
    }

    #[tokio::test]
    async fn test_unsupported_size_snaps_before_call() {
        let server = MockServer::start().await;
        // dall-e-2 does not take 1792x1024; the request must carry the
        // snapped square size and no quality field.
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "dall-e-2",
                "size": "1024x1024",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"url": "https://img.example/2.png"}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let image = client
            .generate(&request(ImageModel::DallE2, ImageSize::Wide1792x1024))
            .await
            .unwrap();
        assert_eq!(image.url, "https://img.example/2.png");
    }

    #[tokio::test]
    async fn test_api_error_is_distinguishable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad prompt"))
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let err = client
            .generate(&request(ImageModel::DallE3, ImageSize::Square1024))
            .await
            .unwrap_err();
        match err {
            ProviderError::ApiError { status, .. } => assert_eq!(status, 400),
            other => panic!("expected ApiError, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_without_call() {
        let client = OpenAiImageClient::new("test-key", Duration::from_secs(5)).unwrap();
        let mut req = request(ImageModel::DallE3, ImageSize::Square1024);
        req.prompt = "   ".to_string();
        assert!(client.generate(&req).await.unwrap_err().is_unsupported());
    }

    #[tokio::test]
    async fn test_download_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let bytes = download_image(&format!("{}/img.png", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
