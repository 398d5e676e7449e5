//! Provider API clients for the ViralForge pipeline.
//!
//! This crate provides:
//! - Text-generation clients (Gemini, OpenAI) behind the [`TextGenerator`] trait
//! - A priority-ordered [`FallbackChain`] dispatcher over those clients
//! - An image-generation client for the OpenAI Images API
//! - Best-effort structured decode for JSON buried in LLM output

pub mod chain;
pub mod decode;
pub mod error;
pub mod gemini;
pub mod image;
pub mod openai;
pub mod text;

pub use chain::FallbackChain;
pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiClient;
pub use image::{download_image, GeneratedImage, ImageGenerator, ImageRequest, OpenAiImageClient};
pub use openai::OpenAiClient;
pub use text::{TextGenerator, TextRequest};
