//! Visual style template catalog.
//!
//! A style template is a fixed descriptive prompt fragment establishing
//! a consistent visual identity. Exactly one template is selected per
//! video and reused for every image prompt in that video's pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available visual style templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StyleTemplate {
    /// Photorealistic, film-like lighting and composition
    CinematicRealism,
    /// Saturated digital illustration
    VibrantIllustration,
    /// Flat shapes, limited palette, generous negative space
    MinimalistFlat,
    /// Low-key lighting, high contrast, moody tones
    DarkAtmospheric,
    /// Halftone textures and bold ink outlines
    RetroComic,
    /// Natural-light editorial photography
    DocumentaryPhoto,
}

impl StyleTemplate {
    /// All available style templates.
    pub const ALL: &'static [StyleTemplate] = &[
        StyleTemplate::CinematicRealism,
        StyleTemplate::VibrantIllustration,
        StyleTemplate::MinimalistFlat,
        StyleTemplate::DarkAtmospheric,
        StyleTemplate::RetroComic,
        StyleTemplate::DocumentaryPhoto,
    ];

    /// Fallback when style selection fails. Style is never left unset.
    pub const DEFAULT: StyleTemplate = StyleTemplate::CinematicRealism;

    /// Returns the style key as used in prompts, config, and filenames.
    pub fn as_key(&self) -> &'static str {
        match self {
            StyleTemplate::CinematicRealism => "cinematic_realism",
            StyleTemplate::VibrantIllustration => "vibrant_illustration",
            StyleTemplate::MinimalistFlat => "minimalist_flat",
            StyleTemplate::DarkAtmospheric => "dark_atmospheric",
            StyleTemplate::RetroComic => "retro_comic",
            StyleTemplate::DocumentaryPhoto => "documentary_photo",
        }
    }

    /// The fixed prompt fragment prepended to every image prompt of a
    /// video using this style.
    pub fn prompt_fragment(&self) -> &'static str {
        match self {
            StyleTemplate::CinematicRealism => {
                "Cinematic photorealistic scene, 35mm film look, dramatic natural lighting, shallow depth of field."
            }
            StyleTemplate::VibrantIllustration => {
                "Vibrant digital illustration, bold saturated colors, clean vector shapes, energetic composition."
            }
            StyleTemplate::MinimalistFlat => {
                "Minimalist flat design, limited two-tone palette, simple geometric shapes, generous negative space."
            }
            StyleTemplate::DarkAtmospheric => {
                "Dark atmospheric scene, low-key lighting, deep shadows, high contrast, moody cinematic tones."
            }
            StyleTemplate::RetroComic => {
                "Retro comic book panel, halftone texture, bold ink outlines, vintage four-color print palette."
            }
            StyleTemplate::DocumentaryPhoto => {
                "Editorial documentary photograph, natural light, candid framing, muted realistic colors."
            }
        }
    }

    /// Catalog listing for style-selection prompts: one "key: description"
    /// line per template.
    pub fn catalog_listing() -> String {
        Self::ALL
            .iter()
            .map(|s| format!("- {}: {}", s.as_key(), s.prompt_fragment()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for StyleTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for StyleTemplate {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cinematic_realism" => Ok(StyleTemplate::CinematicRealism),
            "vibrant_illustration" => Ok(StyleTemplate::VibrantIllustration),
            "minimalist_flat" => Ok(StyleTemplate::MinimalistFlat),
            "dark_atmospheric" => Ok(StyleTemplate::DarkAtmospheric),
            "retro_comic" => Ok(StyleTemplate::RetroComic),
            "documentary_photo" => Ok(StyleTemplate::DocumentaryPhoto),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown style template: {0}")]
pub struct StyleParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parse() {
        assert_eq!(
            "retro_comic".parse::<StyleTemplate>().unwrap(),
            StyleTemplate::RetroComic
        );
        assert_eq!(
            "  DARK_ATMOSPHERIC ".parse::<StyleTemplate>().unwrap(),
            StyleTemplate::DarkAtmospheric
        );
        assert!("unknown".parse::<StyleTemplate>().is_err());
    }

    #[test]
    fn test_style_roundtrip() {
        for style in StyleTemplate::ALL {
            assert_eq!(style.as_key().parse::<StyleTemplate>().unwrap(), *style);
        }
    }

    #[test]
    fn test_catalog_listing_covers_all() {
        let listing = StyleTemplate::catalog_listing();
        for style in StyleTemplate::ALL {
            assert!(listing.contains(style.as_key()));
        }
    }
}
