//! Shared data models for the ViralForge content pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Video identity and caller-supplied source metadata
//! - Visual style templates applied per video
//! - Cost records, categories, and ledger summaries
//! - Generation value objects (script context, keywords, images)
//! - Provider model enums with capability descriptors

pub mod cost;
pub mod generation;
pub mod model;
pub mod style;
pub mod video;

// Re-export common types
pub use cost::{CostCategory, CostSummary, VideoCostRecord};
pub use generation::{
    EnhancedContent, KeywordTaxonomy, ScriptContext, SentenceImage, Thumbnail,
};
pub use model::{ImageModel, ImageQuality, ImageSize, Provider, TextModel};
pub use style::{StyleParseError, StyleTemplate};
pub use video::{SourceVideo, VideoId};
