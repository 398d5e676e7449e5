//! Reliable-metadata provider.
//!
//! Consulted before generation to enrich or override caller-supplied
//! video data. Failures here never abort a run; the pipeline degrades
//! to the caller's data as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use vforge_models::VideoId;

use crate::error::{PipelineError, PipelineResult};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Authoritative metadata for a video.
#[derive(Debug, Clone, Default)]
pub struct ReliableMetadata {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub duration_seconds: u32,
    pub canonical_url: String,
    pub transcript_text: Option<String>,
}

/// Source of authoritative video metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn get_metadata(&self, video_id: &VideoId) -> PipelineResult<ReliableMetadata>;
}

/// YouTube Data API v3 metadata client.
pub struct YouTubeDataClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

impl YouTubeDataClient {
    /// Create a new metadata client with an explicit request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> PipelineResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            PipelineError::metadata_unavailable(format!("HTTP client build failed: {}", e))
        })?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Create from the `YOUTUBE_API_KEY` environment variable.
    pub fn from_env(timeout: Duration) -> PipelineResult<Self> {
        let api_key = std::env::var("YOUTUBE_API_KEY")
            .map_err(|_| PipelineError::metadata_unavailable("YOUTUBE_API_KEY not set"))?;
        Self::new(api_key, timeout)
    }

    /// Override the API base URL (used by integration tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MetadataProvider for YouTubeDataClient {
    async fn get_metadata(&self, video_id: &VideoId) -> PipelineResult<ReliableMetadata> {
        let url = format!(
            "{}/videos?part=snippet,contentDetails&id={}&key={}",
            self.base_url,
            video_id.as_str(),
            self.api_key
        );

        debug!(video_id = %video_id, "Fetching reliable metadata");

        let response = self.client.get(&url).send().await.map_err(|e| {
            PipelineError::metadata_unavailable(format!("Metadata request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(PipelineError::metadata_unavailable(format!(
                "Metadata API returned {}",
                response.status()
            )));
        }

        let body: VideosResponse = response.json().await.map_err(|e| {
            PipelineError::metadata_unavailable(format!("Metadata parse failed: {}", e))
        })?;

        let item = body.items.into_iter().next().ok_or_else(|| {
            PipelineError::metadata_unavailable(format!("No metadata for video {}", video_id))
        })?;

        Ok(ReliableMetadata {
            title: item.snippet.title,
            description: item.snippet.description,
            channel_title: item.snippet.channel_title,
            duration_seconds: item
                .content_details
                .map(|d| parse_iso8601_duration(&d.duration))
                .unwrap_or(0),
            canonical_url: format!("https://www.youtube.com/watch?v={}", video_id.as_str()),
            transcript_text: None,
        })
    }
}

/// Parse an ISO 8601 duration like "PT1H2M30S" into seconds.
/// Malformed input yields 0 (duration is advisory, not load-bearing).
fn parse_iso8601_duration(duration: &str) -> u32 {
    let Some(rest) = duration.strip_prefix("PT") else {
        return 0;
    };

    let mut seconds = 0u32;
    let mut number = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let value: u32 = number.parse().unwrap_or(0);
        number.clear();
        match c {
            'H' => seconds += value * 3600,
            'M' => seconds += value * 60,
            'S' => seconds += value,
            _ => return 0,
        }
    }
    seconds
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_duration_parse() {
        assert_eq!(parse_iso8601_duration("PT1H2M30S"), 3750);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT10M"), 600);
        assert_eq!(parse_iso8601_duration("garbage"), 0);
    }

    #[tokio::test]
    async fn test_get_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "snippet": {
                        "title": "Real Title",
                        "description": "Real description",
                        "channelTitle": "Real Channel"
                    },
                    "contentDetails": {"duration": "PT2M"}
                }]
            })))
            .mount(&server)
            .await;

        let client = YouTubeDataClient::new("key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let metadata = client
            .get_metadata(&VideoId::from_string("abc123"))
            .await
            .unwrap();
        assert_eq!(metadata.title, "Real Title");
        assert_eq!(metadata.channel_title, "Real Channel");
        assert_eq!(metadata.duration_seconds, 120);
        assert!(metadata.canonical_url.contains("abc123"));
    }

    #[tokio::test]
    async fn test_missing_video_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;

        let client = YouTubeDataClient::new("key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let err = client
            .get_metadata(&VideoId::from_string("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MetadataUnavailable(_)));
    }
}
