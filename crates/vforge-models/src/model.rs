//! Provider and model enums with capability descriptors.
//!
//! Models are tagged variants rather than raw strings: each variant
//! carries its own capability descriptor (supported sizes, whether the
//! quality parameter applies, unit price), so adding a provider means
//! adding one variant instead of scattering string checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit price used when a model/size combination has no table entry (USD).
pub const DEFAULT_IMAGE_UNIT_PRICE: f64 = 0.04;

/// External generation services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text-generation models available to the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TextModel {
    #[serde(rename = "gemini-2.5-flash")]
    GeminiFlash,
    #[serde(rename = "gemini-2.5-flash-lite")]
    GeminiFlashLite,
    #[serde(rename = "gemini-2.5-pro")]
    GeminiPro,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
}

impl TextModel {
    /// Which provider serves this model.
    pub fn provider(&self) -> Provider {
        match self {
            TextModel::GeminiFlash | TextModel::GeminiFlashLite | TextModel::GeminiPro => {
                Provider::Gemini
            }
            TextModel::Gpt4o | TextModel::Gpt4oMini => Provider::OpenAi,
        }
    }

    /// Model identifier as the provider API expects it.
    pub fn api_name(&self) -> &'static str {
        match self {
            TextModel::GeminiFlash => "gemini-2.5-flash",
            TextModel::GeminiFlashLite => "gemini-2.5-flash-lite",
            TextModel::GeminiPro => "gemini-2.5-pro",
            TextModel::Gpt4o => "gpt-4o",
            TextModel::Gpt4oMini => "gpt-4o-mini",
        }
    }
}

impl fmt::Display for TextModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for TextModel {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini-2.5-flash" => Ok(TextModel::GeminiFlash),
            "gemini-2.5-flash-lite" => Ok(TextModel::GeminiFlashLite),
            "gemini-2.5-pro" => Ok(TextModel::GeminiPro),
            "gpt-4o" => Ok(TextModel::Gpt4o),
            "gpt-4o-mini" => Ok(TextModel::Gpt4oMini),
            _ => Err(ModelParseError(s.to_string())),
        }
    }
}

/// Image output dimensions accepted by the image APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ImageSize {
    /// 256x256 (dall-e-2 only)
    Square256,
    /// 512x512 (dall-e-2 only)
    Square512,
    /// 1024x1024
    Square1024,
    /// 1792x1024, wide 16:9-ish (dall-e-3)
    Wide1792x1024,
    /// 1024x1792, tall (dall-e-3)
    Tall1024x1792,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square256 => "256x256",
            ImageSize::Square512 => "512x512",
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Wide1792x1024 => "1792x1024",
            ImageSize::Tall1024x1792 => "1024x1792",
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            ImageSize::Square256 => 256,
            ImageSize::Square512 => 512,
            ImageSize::Square1024 => 1024,
            ImageSize::Wide1792x1024 => 1792,
            ImageSize::Tall1024x1792 => 1024,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            ImageSize::Square256 => 256,
            ImageSize::Square512 => 512,
            ImageSize::Square1024 => 1024,
            ImageSize::Wide1792x1024 => 1024,
            ImageSize::Tall1024x1792 => 1792,
        }
    }

    fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Snap to the closest size the model supports, by pixel area.
    /// The only documented auto-substitution; callers log it as a notice.
    pub fn nearest_supported(&self, model: ImageModel) -> ImageSize {
        let supported = model.supported_sizes();
        if supported.contains(self) {
            return *self;
        }
        *supported
            .iter()
            .min_by_key(|s| s.area().abs_diff(self.area()))
            .unwrap_or(&ImageSize::Square1024)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "256x256" => Ok(ImageSize::Square256),
            "512x512" => Ok(ImageSize::Square512),
            "1024x1024" => Ok(ImageSize::Square1024),
            "1792x1024" => Ok(ImageSize::Wide1792x1024),
            "1024x1792" => Ok(ImageSize::Tall1024x1792),
            _ => Err(ModelParseError(s.to_string())),
        }
    }
}

/// Image quality tier. Only applies to models where
/// [`ImageModel::supports_quality`] is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Image-generation models, each carrying its capability descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ImageModel {
    #[serde(rename = "dall-e-3")]
    DallE3,
    #[serde(rename = "dall-e-2")]
    DallE2,
    #[serde(rename = "gpt-image-1")]
    GptImage1,
}

impl ImageModel {
    /// Model identifier as the provider API expects it.
    pub fn api_name(&self) -> &'static str {
        match self {
            ImageModel::DallE3 => "dall-e-3",
            ImageModel::DallE2 => "dall-e-2",
            ImageModel::GptImage1 => "gpt-image-1",
        }
    }

    /// Sizes this model accepts.
    pub fn supported_sizes(&self) -> &'static [ImageSize] {
        match self {
            ImageModel::DallE3 => &[
                ImageSize::Square1024,
                ImageSize::Wide1792x1024,
                ImageSize::Tall1024x1792,
            ],
            ImageModel::DallE2 => &[
                ImageSize::Square256,
                ImageSize::Square512,
                ImageSize::Square1024,
            ],
            ImageModel::GptImage1 => &[
                ImageSize::Square1024,
                ImageSize::Wide1792x1024,
                ImageSize::Tall1024x1792,
            ],
        }
    }

    /// Whether the quality parameter applies to this model.
    pub fn supports_quality(&self) -> bool {
        matches!(self, ImageModel::DallE3)
    }

    /// Static unit price per generated image (USD). Unknown combinations
    /// fall back to [`DEFAULT_IMAGE_UNIT_PRICE`].
    pub fn price_per_image(&self, size: ImageSize, quality: ImageQuality) -> f64 {
        match (self, size, quality) {
            (ImageModel::DallE3, ImageSize::Square1024, ImageQuality::Standard) => 0.04,
            (ImageModel::DallE3, ImageSize::Square1024, ImageQuality::Hd) => 0.08,
            (ImageModel::DallE3, ImageSize::Wide1792x1024, ImageQuality::Standard)
            | (ImageModel::DallE3, ImageSize::Tall1024x1792, ImageQuality::Standard) => 0.08,
            (ImageModel::DallE3, ImageSize::Wide1792x1024, ImageQuality::Hd)
            | (ImageModel::DallE3, ImageSize::Tall1024x1792, ImageQuality::Hd) => 0.12,
            (ImageModel::DallE2, ImageSize::Square1024, _) => 0.02,
            (ImageModel::DallE2, ImageSize::Square512, _) => 0.018,
            (ImageModel::DallE2, ImageSize::Square256, _) => 0.016,
            (ImageModel::GptImage1, ImageSize::Square1024, _) => 0.04,
            (ImageModel::GptImage1, ImageSize::Wide1792x1024, _)
            | (ImageModel::GptImage1, ImageSize::Tall1024x1792, _) => 0.06,
            _ => DEFAULT_IMAGE_UNIT_PRICE,
        }
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for ImageModel {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dall-e-3" => Ok(ImageModel::DallE3),
            "dall-e-2" => Ok(ImageModel::DallE2),
            "gpt-image-1" => Ok(ImageModel::GptImage1),
            _ => Err(ModelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown model identifier: {0}")]
pub struct ModelParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_model_provider() {
        assert_eq!(TextModel::GeminiFlash.provider(), Provider::Gemini);
        assert_eq!(TextModel::Gpt4oMini.provider(), Provider::OpenAi);
    }

    #[test]
    fn test_text_model_parse() {
        assert_eq!(
            "gemini-2.5-flash".parse::<TextModel>().unwrap(),
            TextModel::GeminiFlash
        );
        assert!("gpt-5000".parse::<TextModel>().is_err());
    }

    #[test]
    fn test_image_size_snap() {
        // Wide size is not supported by dall-e-2; snaps to the largest square
        assert_eq!(
            ImageSize::Wide1792x1024.nearest_supported(ImageModel::DallE2),
            ImageSize::Square1024
        );
        // Supported sizes pass through unchanged
        assert_eq!(
            ImageSize::Wide1792x1024.nearest_supported(ImageModel::DallE3),
            ImageSize::Wide1792x1024
        );
    }

    #[test]
    fn test_price_table() {
        assert_eq!(
            ImageModel::DallE3.price_per_image(ImageSize::Square1024, ImageQuality::Standard),
            0.04
        );
        assert_eq!(
            ImageModel::DallE3.price_per_image(ImageSize::Wide1792x1024, ImageQuality::Hd),
            0.12
        );
        // Unknown combination falls back to the default unit price
        assert_eq!(
            ImageModel::DallE3.price_per_image(ImageSize::Square256, ImageQuality::Standard),
            DEFAULT_IMAGE_UNIT_PRICE
        );
    }

    #[test]
    fn test_quality_applies_only_to_dalle3() {
        assert!(ImageModel::DallE3.supports_quality());
        assert!(!ImageModel::DallE2.supports_quality());
        assert!(!ImageModel::GptImage1.supports_quality());
    }
}
