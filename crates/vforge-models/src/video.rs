//! Video identity and source metadata models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a video, assigned by the surrounding workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Caller-supplied source video data for one enhancement run.
///
/// Fields may be enriched or overridden by the reliable-metadata
/// provider before generation; failures there degrade to these values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceVideo {
    /// Unique video ID
    pub video_id: VideoId,

    /// Video title
    pub title: String,

    /// Video description
    #[serde(default)]
    pub description: String,

    /// Channel title
    #[serde(default)]
    pub channel_title: String,

    /// Duration in seconds
    #[serde(default)]
    pub duration_seconds: u32,

    /// Canonical video URL
    #[serde(default)]
    pub canonical_url: String,

    /// Transcript or current script text
    #[serde(default)]
    pub script: String,
}

impl SourceVideo {
    /// Create a new source video record.
    pub fn new(
        video_id: impl Into<VideoId>,
        title: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            description: String::new(),
            channel_title: String::new(),
            duration_seconds: 0,
            canonical_url: String::new(),
            script: script.into(),
        }
    }

    /// A short excerpt of the script for prompts that do not need the
    /// full text (style selection, thumbnails).
    pub fn script_excerpt(&self, max_chars: usize) -> &str {
        match self.script.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.script[..idx],
            None => &self.script,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_transparent() {
        let id = VideoId::from_string("abc123");
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");
    }

    #[test]
    fn test_script_excerpt_bounds() {
        let video = SourceVideo::new("v1", "Title", "short script");
        assert_eq!(video.script_excerpt(5), "short");
        assert_eq!(video.script_excerpt(1000), "short script");
    }
}
