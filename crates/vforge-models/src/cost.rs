//! Cost records and ledger summaries.
//!
//! Costs are tracked in USD per video with a per-category breakdown.
//! The accounting invariant: a record's `total` always equals the sum
//! of its `breakdown` values, and a ledger's total equals the sum of
//! all record totals.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::VideoId;

/// Spend category for cost breakdown entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Per-sentence image generation
    Image,
    /// Thumbnail generation
    Thumbnail,
    /// Other billable processing
    Processing,
}

impl CostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::Image => "image",
            CostCategory::Thumbnail => "thumbnail",
            CostCategory::Processing => "processing",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CostCategory {
    type Err = CostCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(CostCategory::Image),
            "thumbnail" => Ok(CostCategory::Thumbnail),
            "processing" => Ok(CostCategory::Processing),
            _ => Err(CostCategoryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown cost category: {0}")]
pub struct CostCategoryParseError(String);

/// Accumulated spend for one video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoCostRecord {
    /// Video this record belongs to
    pub video_id: VideoId,
    /// Accumulated spend in USD, monotonically non-decreasing
    pub total: f64,
    /// Per-category accumulated spend
    pub breakdown: HashMap<CostCategory, f64>,
}

impl VideoCostRecord {
    /// Create an empty record for a video.
    pub fn new(video_id: VideoId) -> Self {
        Self {
            video_id,
            total: 0.0,
            breakdown: HashMap::new(),
        }
    }

    /// Add spend to a category, keeping `total` equal to the breakdown sum.
    pub fn add(&mut self, amount: f64, category: CostCategory) {
        *self.breakdown.entry(category).or_insert(0.0) += amount;
        self.total += amount;
    }

    /// Spend recorded for a single category (zero if untracked).
    pub fn category_total(&self, category: CostCategory) -> f64 {
        self.breakdown.get(&category).copied().unwrap_or(0.0)
    }
}

/// Aggregated ledger view for observability.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CostSummary {
    /// Total spend across all videos (USD)
    pub total_cost: f64,
    /// Number of images generated across all videos
    pub images_generated: u64,
    /// Number of videos with tracked spend
    pub video_count: usize,
    /// Average spend per tracked video (zero when no videos tracked)
    pub average_cost_per_video: f64,
    /// Per-video records
    pub per_video: Vec<VideoCostRecord>,
    /// Configured per-video budget ceiling (USD)
    pub budget_ceiling: f64,
    /// When this summary was produced
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_total_matches_breakdown() {
        let mut record = VideoCostRecord::new(VideoId::from_string("v1"));
        record.add(0.04, CostCategory::Image);
        record.add(0.04, CostCategory::Image);
        record.add(0.08, CostCategory::Thumbnail);

        let breakdown_sum: f64 = record.breakdown.values().sum();
        assert!((record.total - breakdown_sum).abs() < f64::EPSILON);
        assert!((record.category_total(CostCategory::Image) - 0.08).abs() < 1e-9);
        assert_eq!(record.category_total(CostCategory::Processing), 0.0);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("image".parse::<CostCategory>().unwrap(), CostCategory::Image);
        assert!("bogus".parse::<CostCategory>().is_err());
    }
}
