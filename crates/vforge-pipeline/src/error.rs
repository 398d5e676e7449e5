//! Pipeline error types.

use thiserror::Error;

use vforge_models::VideoId;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Script generation exhausted every provider. The script is
    /// load-bearing for every downstream stage, so this aborts the run.
    #[error("Script generation failed: {0}")]
    ScriptGenerationFailed(String),

    /// Sentence breakdown exhausted every provider or returned an
    /// unusable result. Everything downstream depends on it.
    #[error("Sentence breakdown failed: {0}")]
    SentenceBreakdownFailed(String),

    /// A proposed spend would break the per-video ceiling.
    #[error(
        "Budget exceeded for video {video_id}: current total ${current_total:.4} + ${additional_cost:.4} would pass ceiling ${ceiling:.2}"
    )]
    BudgetExceeded {
        video_id: VideoId,
        current_total: f64,
        additional_cost: f64,
        ceiling: f64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Provider error: {0}")]
    Provider(#[from] vforge_providers::ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] vforge_storage::StorageError),
}

impl PipelineError {
    pub fn script_failed(msg: impl Into<String>) -> Self {
        Self::ScriptGenerationFailed(msg.into())
    }

    pub fn breakdown_failed(msg: impl Into<String>) -> Self {
        Self::SentenceBreakdownFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn metadata_unavailable(msg: impl Into<String>) -> Self {
        Self::MetadataUnavailable(msg.into())
    }

    /// Check if this is a budget refusal.
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, PipelineError::BudgetExceeded { .. })
    }

    /// Check if a whole-run retry could plausibly succeed.
    ///
    /// Budget and configuration failures need operator action; provider
    /// and transport failures are worth retrying tomorrow.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::ScriptGenerationFailed(_)
                | PipelineError::SentenceBreakdownFailed(_)
                | PipelineError::DownloadFailed(_)
                | PipelineError::Provider(_)
                | PipelineError::Storage(_)
        )
    }
}
