use serde::Serialize;

use crate::errors::AppError;
use crate::payout::calculator::{PayoutCalculator, PayoutParams, PayoutResult};
use crate::payout::history::{MarketConditions, UserLearningHistory};
use crate::planning::synthesizer::MAX_DURATION_WEEKS;

const DIFFICULTY_STEP: f64 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub params: PayoutParams,
    pub result: PayoutResult,
}

/// Variations on `base`, always in the same order:
/// aggressive timeline, current plan, relaxed timeline, harder content, easier content.
pub fn simulate_scenarios(
    calculator: &PayoutCalculator,
    base: &PayoutParams,
    history: Option<&UserLearningHistory>,
    market: &MarketConditions,
) -> Result<Vec<Scenario>, AppError> {
    base.validate()?;

    let aggressive = PayoutParams {
        timeline_weeks: ((base.timeline_weeks as f64 * 0.5).round() as u32).max(1),
        ..base.clone()
    };
    let relaxed = PayoutParams {
        timeline_weeks: ((base.timeline_weeks as f64 * 1.5).round() as u32).min(MAX_DURATION_WEEKS),
        ..base.clone()
    };
    let harder = PayoutParams {
        content_difficulty: (base.content_difficulty + DIFFICULTY_STEP).min(10.0),
        ..base.clone()
    };
    let easier = PayoutParams {
        content_difficulty: (base.content_difficulty - DIFFICULTY_STEP).max(1.0),
        ..base.clone()
    };

    let variants = [
        (
            "Aggressive Timeline",
            format!("Finish in {} weeks instead of {}", aggressive.timeline_weeks, base.timeline_weeks),
            aggressive,
        ),
        (
            "Current Plan",
            format!("{} weeks as planned", base.timeline_weeks),
            base.clone(),
        ),
        (
            "Relaxed Timeline",
            format!("Take {} weeks for the same content", relaxed.timeline_weeks),
            relaxed,
        ),
        (
            "Harder Content",
            format!("Content difficulty {}", harder.content_difficulty),
            harder,
        ),
        (
            "Easier Content",
            format!("Content difficulty {}", easier.content_difficulty),
            easier,
        ),
    ];

    variants
        .into_iter()
        .map(|(name, description, params)| {
            let result = calculator.calculate(&params, history, market)?;
            Ok(Scenario {
                name: name.to_string(),
                description,
                params,
                result,
            })
        })
        .collect()
}
