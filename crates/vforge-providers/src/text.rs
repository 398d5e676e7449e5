//! Text-generation request types and the provider trait.

use async_trait::async_trait;

use vforge_models::TextModel;

use crate::error::ProviderResult;

/// A single text-generation request.
#[derive(Debug, Clone)]
pub struct TextRequest {
    /// Fully-formed prompt
    pub prompt: String,
    /// Target model
    pub model: TextModel,
    /// Maximum output tokens, provider default when unset
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,
    /// Ask the provider for a JSON-only response
    pub json_response: bool,
}

impl TextRequest {
    /// Create a request with provider-default sampling parameters.
    pub fn new(prompt: impl Into<String>, model: TextModel) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            max_output_tokens: None,
            temperature: None,
            json_response: false,
        }
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request a JSON-only response from the provider.
    pub fn expect_json(mut self) -> Self {
        self.json_response = true;
        self
    }

    /// The same request retargeted at a different model.
    pub fn for_model(&self, model: TextModel) -> Self {
        Self {
            model,
            ..self.clone()
        }
    }
}

/// A text-generation provider client.
///
/// Implementations must signal distinguishable failure types: transport
/// failure vs provider-reported error vs malformed output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider/model label used in logs.
    fn name(&self) -> String;

    /// Perform one generation attempt. No internal retries.
    async fn generate(&self, request: &TextRequest) -> ProviderResult<String>;
}
