//! Pipeline configuration.

use std::time::Duration;

use vforge_models::{ImageModel, ImageQuality, ImageSize, TextModel};

use crate::error::{PipelineError, PipelineResult};

/// Pipeline configuration.
///
/// All fields have documented defaults; `validate` runs once at
/// orchestrator construction, not per call.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-video spending ceiling in USD
    pub budget_ceiling_usd: f64,
    /// Gates all image and thumbnail generation
    pub image_generation_enabled: bool,
    /// Gates sentence segmentation and everything depending on it
    pub script_breakdown_enabled: bool,
    /// Model used for per-sentence images
    pub image_model: ImageModel,
    /// Size for per-sentence images
    pub image_size: ImageSize,
    /// Size for the thumbnail (wide aspect)
    pub thumbnail_size: ImageSize,
    /// Quality tier where the model supports it
    pub image_quality: ImageQuality,
    /// Maximum images per video; 0 = unlimited subject to budget
    pub max_images_per_video: usize,
    /// Provider fallback order for text generation
    pub text_model_priority: Vec<TextModel>,
    /// Politeness delay between successive image generation calls
    pub generation_delay: Duration,
    /// Timeout applied to every outbound generation call
    pub request_timeout: Duration,
    /// Timeout applied to image downloads
    pub download_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            budget_ceiling_usd: 1.00,
            image_generation_enabled: true,
            script_breakdown_enabled: true,
            image_model: ImageModel::DallE3,
            image_size: ImageSize::Square1024,
            thumbnail_size: ImageSize::Wide1792x1024,
            image_quality: ImageQuality::Standard,
            max_images_per_video: 0,
            text_model_priority: vec![
                TextModel::GeminiFlash,
                TextModel::GeminiFlashLite,
                TextModel::Gpt4oMini,
            ],
            generation_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(60),
            download_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables, falling back to the
    /// documented defaults. Loads `.env` when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            budget_ceiling_usd: std::env::var("PIPELINE_BUDGET_CEILING_USD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.budget_ceiling_usd),
            image_generation_enabled: std::env::var("PIPELINE_IMAGE_GENERATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.image_generation_enabled),
            script_breakdown_enabled: std::env::var("PIPELINE_SCRIPT_BREAKDOWN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.script_breakdown_enabled),
            image_model: std::env::var("PIPELINE_IMAGE_MODEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.image_model),
            image_size: std::env::var("PIPELINE_IMAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.image_size),
            thumbnail_size: std::env::var("PIPELINE_THUMBNAIL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.thumbnail_size),
            image_quality: match std::env::var("PIPELINE_IMAGE_QUALITY").as_deref() {
                Ok("hd") => ImageQuality::Hd,
                _ => defaults.image_quality,
            },
            max_images_per_video: std::env::var("PIPELINE_MAX_IMAGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_images_per_video),
            text_model_priority: std::env::var("PIPELINE_TEXT_MODELS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .filter_map(|m| m.trim().parse().ok())
                        .collect::<Vec<_>>()
                })
                .filter(|models: &Vec<TextModel>| !models.is_empty())
                .unwrap_or(defaults.text_model_priority),
            generation_delay: Duration::from_millis(
                std::env::var("PIPELINE_GENERATION_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.generation_delay.as_millis() as u64),
            ),
            request_timeout: Duration::from_secs(
                std::env::var("PIPELINE_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.request_timeout.as_secs()),
            ),
            download_timeout: Duration::from_secs(
                std::env::var("PIPELINE_DOWNLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.download_timeout.as_secs()),
            ),
        }
    }

    /// Validate the configuration once at construction.
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.budget_ceiling_usd.is_finite() || self.budget_ceiling_usd <= 0.0 {
            return Err(PipelineError::config_error(format!(
                "Budget ceiling must be positive, got {}",
                self.budget_ceiling_usd
            )));
        }
        if self.text_model_priority.is_empty() {
            return Err(PipelineError::config_error(
                "Text model priority list is empty",
            ));
        }
        if !self
            .image_model
            .supported_sizes()
            .contains(&self.thumbnail_size)
        {
            return Err(PipelineError::config_error(format!(
                "Thumbnail size {} is not supported by {}",
                self.thumbnail_size, self.image_model
            )));
        }
        Ok(())
    }
}
