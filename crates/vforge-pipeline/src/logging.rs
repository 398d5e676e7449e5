//! Structured stage logging utilities.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};

use vforge_models::VideoId;

/// Initialize the tracing subscriber for the pipeline.
///
/// Honors `RUST_LOG`; defaults to `info`. Set `LOG_FORMAT=json` for
/// machine-readable output.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

/// Stage logger carrying video and stage context on every line.
#[derive(Debug, Clone)]
pub struct StageLogger {
    video_id: String,
    stage: String,
}

impl StageLogger {
    /// Create a logger for one stage of one video's run.
    pub fn new(video_id: &VideoId, stage: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            stage: stage.to_string(),
        }
    }

    pub fn start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Stage started: {}", message
        );
    }

    pub fn progress(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Stage progress: {}", message
        );
    }

    pub fn warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Stage warning: {}", message
        );
    }

    pub fn failure(&self, message: &str) {
        error!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Stage failed: {}", message
        );
    }

    pub fn completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Stage completed: {}", message
        );
    }

    /// Create a tracing span for this stage.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "stage",
            video_id = %self.video_id,
            stage = %self.stage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_logger_context() {
        let logger = StageLogger::new(&VideoId::from_string("v1"), "keyword_research");
        assert_eq!(logger.video_id, "v1");
        assert_eq!(logger.stage, "keyword_research");
    }
}
