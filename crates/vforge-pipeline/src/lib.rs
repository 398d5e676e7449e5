//! Budget-gated content enhancement orchestrator.
//!
//! Coordinates a sequence of LLM and image-generation calls per video:
//! keyword research, script regeneration, title/description derivation,
//! sentence breakdown, per-sentence image generation, and thumbnail
//! generation, with a running cost ledger, a per-video budget ceiling,
//! and provider fallback chains.

pub mod config;
pub mod enhancer;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod metadata;
pub mod prompts;

pub use config::PipelineConfig;
pub use enhancer::ContentEnhancer;
pub use error::{PipelineError, PipelineResult};
pub use ledger::CostLedger;
pub use logging::{init_logging, StageLogger};
pub use metadata::{MetadataProvider, ReliableMetadata, YouTubeDataClient};
