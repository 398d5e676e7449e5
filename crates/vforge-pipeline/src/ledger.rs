//! Cost ledger and budget guard.
//!
//! The ledger is owned by the orchestrator instance, not a process-wide
//! global, so multiple orchestrators (and tests) never share state. It
//! lives only in memory; restarting the process resets all cost state.
//!
//! The budget check is read-then-compare with no atomicity across the
//! subsequent provider call: a logically-concurrent request for the same
//! video could observe a stale total. Accepted for a single-operator
//! batch tool; the image batch is strictly sequential, which is what
//! makes the check sound in practice.

use std::collections::HashMap;

use vforge_models::{
    CostCategory, CostSummary, ImageModel, ImageQuality, ImageSize, VideoCostRecord, VideoId,
};

/// Running cost ledger across all videos processed by one orchestrator.
#[derive(Debug)]
pub struct CostLedger {
    total_cost: f64,
    images_generated: u64,
    video_costs: HashMap<VideoId, VideoCostRecord>,
    budget_ceiling: f64,
}

impl CostLedger {
    /// Create an empty ledger with a per-video ceiling (USD).
    pub fn new(budget_ceiling: f64) -> Self {
        Self {
            total_cost: 0.0,
            images_generated: 0,
            video_costs: HashMap::new(),
            budget_ceiling,
        }
    }

    /// Pure price-table lookup for generating `count` images.
    pub fn estimate_cost(
        model: ImageModel,
        size: ImageSize,
        quality: ImageQuality,
        count: usize,
    ) -> f64 {
        model.price_per_image(size, quality) * count as f64
    }

    /// Accumulated spend for a video (zero if untracked).
    pub fn video_total(&self, video_id: &VideoId) -> f64 {
        self.video_costs.get(video_id).map(|r| r.total).unwrap_or(0.0)
    }

    /// The full cost record for a video (empty record if untracked).
    pub fn video_record(&self, video_id: &VideoId) -> VideoCostRecord {
        self.video_costs
            .get(video_id)
            .cloned()
            .unwrap_or_else(|| VideoCostRecord::new(video_id.clone()))
    }

    /// Whether the proposed additional spend stays within the ceiling.
    /// Pure read, no mutation.
    pub fn is_within_budget(&self, video_id: &VideoId, additional_cost: f64) -> bool {
        self.video_total(video_id) + additional_cost <= self.budget_ceiling
    }

    /// Remaining budget for a video, clamped at zero.
    pub fn remaining_budget(&self, video_id: &VideoId) -> f64 {
        (self.budget_ceiling - self.video_total(video_id)).max(0.0)
    }

    /// Maximum number of items at `unit_cost` the remaining budget can
    /// afford. Used for batch truncation.
    pub fn max_affordable(&self, video_id: &VideoId, unit_cost: f64) -> usize {
        if unit_cost <= 0.0 {
            return usize::MAX;
        }
        // Epsilon absorbs float error so "exactly N affordable" stays N
        ((self.remaining_budget(video_id) + 1e-9) / unit_cost).floor() as usize
    }

    /// Record actual spend against a video, creating its record lazily.
    pub fn track_cost(&mut self, video_id: &VideoId, amount: f64, category: CostCategory) {
        self.video_costs
            .entry(video_id.clone())
            .or_insert_with(|| VideoCostRecord::new(video_id.clone()))
            .add(amount, category);
        self.total_cost += amount;
    }

    /// Record spend for a generated image and bump the image counter.
    pub fn track_image_cost(&mut self, video_id: &VideoId, amount: f64, category: CostCategory) {
        self.track_cost(video_id, amount, category);
        self.images_generated += 1;
    }

    /// Configured per-video ceiling.
    pub fn budget_ceiling(&self) -> f64 {
        self.budget_ceiling
    }

    /// Aggregated view for observability.
    pub fn summary(&self) -> CostSummary {
        let video_count = self.video_costs.len();
        let average = if video_count > 0 {
            self.total_cost / video_count as f64
        } else {
            0.0
        };

        let mut per_video: Vec<VideoCostRecord> = self.video_costs.values().cloned().collect();
        per_video.sort_by(|a, b| a.video_id.as_str().cmp(b.video_id.as_str()));

        CostSummary {
            total_cost: self.total_cost,
            images_generated: self.images_generated,
            video_count,
            average_cost_per_video: average,
            per_video,
            budget_ceiling: self.budget_ceiling,
            generated_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(s: &str) -> VideoId {
        VideoId::from_string(s)
    }

    #[test]
    fn test_totals_match_tracked_amounts() {
        let mut ledger = CostLedger::new(1.0);
        ledger.track_cost(&vid("a"), 0.04, CostCategory::Image);
        ledger.track_cost(&vid("a"), 0.08, CostCategory::Thumbnail);
        ledger.track_cost(&vid("b"), 0.02, CostCategory::Image);

        let summary = ledger.summary();
        assert!((summary.total_cost - 0.14).abs() < 1e-9);
        for record in &summary.per_video {
            let breakdown_sum: f64 = record.breakdown.values().sum();
            assert!((record.total - breakdown_sum).abs() < 1e-9);
        }
        let ledger_sum: f64 = summary.per_video.iter().map(|r| r.total).sum();
        assert!((summary.total_cost - ledger_sum).abs() < 1e-9);
    }

    #[test]
    fn test_budget_check_is_pure() {
        let mut ledger = CostLedger::new(0.10);
        ledger.track_cost(&vid("a"), 0.08, CostCategory::Image);

        assert!(ledger.is_within_budget(&vid("a"), 0.02));
        assert!(!ledger.is_within_budget(&vid("a"), 0.03));
        // Untracked video reads as zero
        assert!(ledger.is_within_budget(&vid("fresh"), 0.10));
        // The check itself never created a record
        assert_eq!(ledger.summary().video_count, 1);
    }

    #[test]
    fn test_max_affordable_exact_fit() {
        let ledger = CostLedger::new(0.12);
        // Ceiling exactly sufficient for 3 images at $0.04
        assert_eq!(ledger.max_affordable(&vid("a"), 0.04), 3);
    }

    #[test]
    fn test_max_affordable_after_spend() {
        let mut ledger = CostLedger::new(0.10);
        ledger.track_cost(&vid("a"), 0.05, CostCategory::Image);
        assert_eq!(ledger.max_affordable(&vid("a"), 0.04), 1);
        ledger.track_cost(&vid("a"), 0.04, CostCategory::Image);
        assert_eq!(ledger.max_affordable(&vid("a"), 0.04), 0);
    }

    #[test]
    fn test_estimate_uses_price_table() {
        let cost = CostLedger::estimate_cost(
            ImageModel::DallE3,
            ImageSize::Square1024,
            ImageQuality::Standard,
            5,
        );
        assert!((cost - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_summary_average() {
        let mut ledger = CostLedger::new(1.0);
        ledger.track_image_cost(&vid("a"), 0.04, CostCategory::Image);
        ledger.track_image_cost(&vid("b"), 0.08, CostCategory::Image);

        let summary = ledger.summary();
        assert!((summary.total_cost - 0.12).abs() < 1e-9);
        assert_eq!(summary.video_count, 2);
        assert!((summary.average_cost_per_video - 0.06).abs() < 1e-9);
        assert_eq!(summary.images_generated, 2);
    }
}
