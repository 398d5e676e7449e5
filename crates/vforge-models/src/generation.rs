//! Generation value objects produced and consumed by the pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{StyleTemplate, VideoCostRecord, VideoId};

/// Derived analysis of a source script, produced once per regeneration
/// and consumed by the script-generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScriptContext {
    /// What the video is trying to achieve
    pub intent: String,
    /// Who the video speaks to
    pub audience: String,
    /// Overall tone of voice
    pub tone: String,
    /// The single core message
    pub core_message: String,
    /// How the opening hook works
    pub hook_style: String,
    /// How the call to action is framed
    pub cta_style: String,
    /// Recurring content themes
    pub content_pillars: Vec<String>,
}

/// SEO keyword research result.
///
/// `Default` is the documented no-enrichment fallback: all fields
/// present but empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KeywordTaxonomy {
    /// High-volume head terms
    pub primary: Vec<String>,
    /// Supporting mid-tail terms
    pub secondary: Vec<String>,
    /// Specific long-tail phrases
    pub long_tail: Vec<String>,
    /// Currently trending terms
    pub trending: Vec<String>,
}

impl KeywordTaxonomy {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
            && self.secondary.is_empty()
            && self.long_tail.is_empty()
            && self.trending.is_empty()
    }

    /// Flat keyword list for prompt interpolation, primary terms first.
    pub fn flattened(&self) -> Vec<&str> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .chain(self.long_tail.iter())
            .chain(self.trending.iter())
            .map(|s| s.as_str())
            .collect()
    }
}

/// One successfully generated and uploaded per-sentence image.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SentenceImage {
    /// Position of the sentence in the original segmentation
    pub index: usize,
    /// The sentence this image illustrates
    pub sentence: String,
    /// Full prompt sent to the image provider
    pub prompt: String,
    /// Style template applied to this video
    pub style: StyleTemplate,
    /// Provider-hosted (ephemeral) image URL
    pub original_url: String,
    /// Permanent public URL after upload
    pub uploaded_url: String,
    /// Actual cost incurred (USD)
    pub cost: f64,
}

/// Generated video thumbnail (wide aspect, one per video).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Thumbnail {
    /// Full prompt sent to the image provider
    pub prompt: String,
    /// Style template applied to this video
    pub style: StyleTemplate,
    /// Provider-hosted (ephemeral) image URL
    pub original_url: String,
    /// Permanent public URL after upload
    pub uploaded_url: String,
    /// Actual cost incurred (USD)
    pub cost: f64,
}

/// Assembled result of one enhancement run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnhancedContent {
    /// Video the run belongs to
    pub video_id: VideoId,
    /// Regenerated script
    pub script: String,
    /// Ranked title options (best first, never empty)
    pub title_options: Vec<String>,
    /// Regenerated description
    pub description: String,
    /// Keyword research result (empty taxonomy when research failed)
    pub keywords: KeywordTaxonomy,
    /// Script context analysis, when performed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_context: Option<ScriptContext>,
    /// Sentence segmentation (empty when breakdown disabled)
    #[serde(default)]
    pub script_sentences: Vec<String>,
    /// Per-sentence image prompts (empty when breakdown disabled)
    #[serde(default)]
    pub image_prompts: Vec<String>,
    /// Per-sentence b-roll search keywords for editors
    #[serde(default)]
    pub editor_keywords: Vec<Vec<String>>,
    /// Successfully generated per-sentence images, in sentence order
    #[serde(default)]
    pub sentence_images: Vec<SentenceImage>,
    /// Generated thumbnail, when image generation is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    /// Style template applied to all visuals of this video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleTemplate>,
    /// Spend recorded against this video during the run
    pub cost: VideoCostRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_default_is_empty() {
        let taxonomy = KeywordTaxonomy::default();
        assert!(taxonomy.is_empty());
        assert!(taxonomy.flattened().is_empty());
    }

    #[test]
    fn test_taxonomy_flatten_order() {
        let taxonomy = KeywordTaxonomy {
            primary: vec!["a".into()],
            secondary: vec!["b".into()],
            long_tail: vec!["c".into()],
            trending: vec!["d".into()],
        };
        assert_eq!(taxonomy.flattened(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_taxonomy_tolerates_missing_fields() {
        let taxonomy: KeywordTaxonomy =
            serde_json::from_str(r#"{"primary": ["seo"]}"#).unwrap();
        assert_eq!(taxonomy.primary, vec!["seo"]);
        assert!(taxonomy.trending.is_empty());
    }
}
