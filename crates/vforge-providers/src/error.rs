//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Provider returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("All providers exhausted after {attempts} attempts: {last_error}")]
    AllProvidersExhausted { attempts: usize, last_error: String },

    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),
}

impl ProviderError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    /// Check if every provider in a fallback chain failed.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ProviderError::AllProvidersExhausted { .. })
    }

    /// Check if this is a rejected model/size/quality combination.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ProviderError::UnsupportedConfiguration(_))
    }

    /// Check if a structured response failed to parse after cleanup.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ProviderError::MalformedResponse(_))
    }
}
