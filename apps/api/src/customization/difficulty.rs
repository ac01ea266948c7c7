use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::plan::{round1, round2, LearningPlan};
use crate::planning::synthesizer::schedule_difficulty;

/// Multiplier change per point of plan difficulty.
const PAYOUT_SENSITIVITY: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyRecalculation {
    pub previous_difficulty: f64,
    pub new_difficulty: f64,
    pub difficulty_change: f64,
    /// Rough effect on the payout multiplier, for display only.
    pub payout_multiplier_change: f64,
    pub recalculated_at: DateTime<Utc>,
}

/// Plan difficulty on the 1 – 10 scale: the schedule's base difficulty shifted by
/// the accepted customizations (their 0 – 100 deltas scaled down by ten).
pub fn plan_difficulty(plan: &LearningPlan) -> f64 {
    let shift: f64 = plan
        .customizations
        .iter()
        .map(|c| c.validation_result.difficulty_change)
        .sum::<f64>()
        / 10.0;
    round1((schedule_difficulty(&plan.weekly_schedule) + shift).clamp(1.0, 10.0))
}

/// Refreshes `plan.content_difficulty` and reports the change.
pub fn recalculate_difficulty(plan: &mut LearningPlan) -> DifficultyRecalculation {
    let previous = plan.content_difficulty;
    let new = plan_difficulty(plan);
    plan.content_difficulty = new;
    let change = round1(new - previous);
    DifficultyRecalculation {
        previous_difficulty: previous,
        new_difficulty: new,
        difficulty_change: change,
        payout_multiplier_change: round2(change * PAYOUT_SENSITIVITY),
        recalculated_at: Utc::now(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomizationStats {
    pub total_videos: u32,
    pub customized_videos: usize,
    /// Whole percent.
    pub customization_percentage: u32,
    /// Minutes.
    pub total_time_change: i64,
    pub average_difficulty_change: f64,
    /// Substitutions whose new content scores above 80 on quality.
    pub quality_improvements: usize,
}

pub fn customization_stats(plan: &LearningPlan) -> CustomizationStats {
    let customized = plan.customizations.len();
    let total_time_change = plan
        .customizations
        .iter()
        .map(|c| c.validation_result.estimated_time_change)
        .sum();
    let total_difficulty_change: f64 = plan
        .customizations
        .iter()
        .map(|c| c.validation_result.difficulty_change)
        .sum();

    CustomizationStats {
        total_videos: plan.total_videos,
        customized_videos: customized,
        customization_percentage: if plan.total_videos > 0 {
            ((customized as f64 / plan.total_videos as f64) * 100.0)
                .round()
                .min(100.0) as u32
        } else {
            0
        },
        total_time_change,
        average_difficulty_change: if customized > 0 {
            round2(total_difficulty_change / customized as f64)
        } else {
            0.0
        },
        quality_improvements: plan
            .customizations
            .iter()
            .filter(|c| c.new_content.quality_score > 80.0)
            .count(),
    }
}
