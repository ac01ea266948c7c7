//! Stake multiplier calculation.
//!
//! The multiplier is a product of independent factors:
//!
//! ```text
//! base × timeline × skill_gap × history × customization × market
//! ```
//!
//! clamped to `[min_multiplier, cap]`, where the cap shrinks with an unreliable
//! history. A user with no history is scored as reliability 0.5, which puts their
//! cap between a poor and a strong history.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::plan::round2;
use crate::payout::history::{MarketConditions, UserLearningHistory};
use crate::planning::synthesizer::MAX_DURATION_WEEKS;

pub const DEFAULT_STAKE: f64 = 100.0;

/// Payout weights. Injected so tests and operators can tune them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutConfig {
    pub base_multiplier: f64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    /// Weeks a learner needs per point of content difficulty.
    pub weeks_per_difficulty_point: f64,
    pub timeline_factor_range: (f64, f64),
    /// Multiplier change per point of difficulty above the user's skill level.
    pub skill_gap_weight: f64,
    pub skill_gap_factor_range: (f64, f64),
    /// How strongly reliability below (above) 0.5 raises (lowers) the multiplier.
    pub history_weight: f64,
    /// Reliability assumed for users without history.
    pub neutral_reliability: f64,
    /// Fraction of `max_multiplier` available at reliability 0.
    pub cap_floor: f64,
    pub customization_penalty: f64,
    pub customization_floor: f64,
    pub market_factor_range: (f64, f64),
    pub conservative_ratio: f64,
    pub optimistic_ratio: f64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            base_multiplier: 1.5,
            min_multiplier: 0.5,
            max_multiplier: 5.0,
            weeks_per_difficulty_point: 1.2,
            timeline_factor_range: (0.5, 3.0),
            skill_gap_weight: 0.1,
            skill_gap_factor_range: (0.8, 1.5),
            history_weight: 0.3,
            neutral_reliability: 0.5,
            cap_floor: 0.6,
            customization_penalty: 0.02,
            customization_floor: 0.9,
            market_factor_range: (0.5, 1.1),
            conservative_ratio: 0.85,
            optimistic_ratio: 1.25,
        }
    }
}

fn default_stake() -> f64 {
    DEFAULT_STAKE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutParams {
    pub timeline_weeks: u32,
    /// 1 – 10.
    pub content_difficulty: f64,
    /// 1 – 10.
    pub user_skill_level: f64,
    #[serde(default)]
    pub customizations: u32,
    #[serde(default = "default_stake")]
    pub stake_amount: f64,
}

impl PayoutParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeline_weeks == 0 || self.timeline_weeks > MAX_DURATION_WEEKS {
            return Err(AppError::Validation(format!(
                "timeline_weeks must be between 1 and {MAX_DURATION_WEEKS}"
            )));
        }
        if !(1.0..=10.0).contains(&self.content_difficulty) {
            return Err(AppError::Validation(
                "content_difficulty must be between 1 and 10".to_string(),
            ));
        }
        if !(1.0..=10.0).contains(&self.user_skill_level) {
            return Err(AppError::Validation(
                "user_skill_level must be between 1 and 10".to_string(),
            ));
        }
        if !self.stake_amount.is_finite() || self.stake_amount < 0.0 {
            return Err(AppError::Validation(
                "stake_amount must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_description: String,
    /// 0.0 – 1.0.
    pub success_probability: f64,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutBreakdown {
    pub base_multiplier: f64,
    pub timeline_factor: f64,
    pub skill_gap_factor: f64,
    pub history_factor: f64,
    pub customization_factor: f64,
    pub market_factor: f64,
    /// Upper bound for this user. Shrinks with an unreliable history.
    pub cap: f64,
    pub reliability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimatedReturn {
    pub conservative: f64,
    pub optimistic: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PotentialWinnings {
    pub conservative: i64,
    pub expected: i64,
    pub optimistic: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutResult {
    pub final_multiplier: f64,
    pub estimated_return: EstimatedReturn,
    pub potential_winnings: PotentialWinnings,
    pub risk_assessment: RiskAssessment,
    pub breakdown: PayoutBreakdown,
    /// How much the inputs can be trusted, 0.0 – 1.0. Grows with history length.
    pub confidence: f64,
    pub recommendations: Vec<String>,
}

/// 0.0 – 1.0 blend of completion rate, average score and recent streak.
pub fn reliability(history: &UserLearningHistory) -> f64 {
    let streak = (history.streak_length as f64 / 5.0).min(1.0);
    (0.5 * history.completion_rate + 0.3 * history.average_score + 0.2 * streak).clamp(0.0, 1.0)
}

/// Stateless payout service.
#[derive(Debug, Clone, Default)]
pub struct PayoutCalculator {
    config: PayoutConfig,
}

impl PayoutCalculator {
    pub fn new(config: PayoutConfig) -> Self {
        Self { config }
    }

    fn expected_weeks(&self, difficulty: f64) -> f64 {
        difficulty * self.config.weeks_per_difficulty_point
    }

    fn breakdown(
        &self,
        params: &PayoutParams,
        history: Option<&UserLearningHistory>,
        market: &MarketConditions,
    ) -> PayoutBreakdown {
        let c = &self.config;

        let timeline_factor = (self.expected_weeks(params.content_difficulty)
            / params.timeline_weeks as f64)
            .clamp(c.timeline_factor_range.0, c.timeline_factor_range.1);

        let skill_gap_factor = (1.0
            + c.skill_gap_weight * (params.content_difficulty - params.user_skill_level))
            .clamp(c.skill_gap_factor_range.0, c.skill_gap_factor_range.1);

        let reliability = history.map(reliability).unwrap_or(c.neutral_reliability);
        let history_factor = 1.0 + c.history_weight * (c.neutral_reliability - reliability);
        let cap = c.max_multiplier * (c.cap_floor + (1.0 - c.cap_floor) * reliability);

        let customization_factor = (1.0 - c.customization_penalty * params.customizations as f64)
            .max(c.customization_floor);

        let health = market.reward_pool_health.clamp(0.0, 1.0);
        let utilization = market.platform_utilization.clamp(0.0, 1.0);
        let market_factor = ((0.6 + 0.4 * health) * (1.0 - 0.25 * utilization))
            .clamp(c.market_factor_range.0, c.market_factor_range.1);

        PayoutBreakdown {
            base_multiplier: c.base_multiplier,
            timeline_factor: round2(timeline_factor),
            skill_gap_factor: round2(skill_gap_factor),
            history_factor: round2(history_factor),
            customization_factor: round2(customization_factor),
            market_factor: round2(market_factor),
            cap: round2(cap),
            reliability: round2(reliability),
        }
    }

    pub fn calculate(
        &self,
        params: &PayoutParams,
        history: Option<&UserLearningHistory>,
        market: &MarketConditions,
    ) -> Result<PayoutResult, AppError> {
        params.validate()?;
        let c = &self.config;
        let breakdown = self.breakdown(params, history, market);

        let raw = breakdown.base_multiplier
            * breakdown.timeline_factor
            * breakdown.skill_gap_factor
            * breakdown.history_factor
            * breakdown.customization_factor
            * breakdown.market_factor;
        let upper = breakdown.cap.clamp(c.min_multiplier, c.max_multiplier);
        let final_multiplier = round2(raw.clamp(c.min_multiplier, upper));

        let conservative = round2(final_multiplier * c.conservative_ratio)
            .max(c.min_multiplier)
            .min(final_multiplier);
        let optimistic = round2(final_multiplier * c.optimistic_ratio)
            .min(c.max_multiplier)
            .max(final_multiplier);

        let stake = params.stake_amount;
        let potential_winnings = PotentialWinnings {
            conservative: (stake * conservative).round() as i64,
            expected: (stake * final_multiplier).round() as i64,
            optimistic: (stake * optimistic).round() as i64,
        };

        let risk_assessment = self.assess_risk(params, history, &breakdown);
        let recommendations = self.recommendations(params, history, &risk_assessment);

        Ok(PayoutResult {
            final_multiplier,
            estimated_return: EstimatedReturn {
                conservative,
                optimistic,
            },
            potential_winnings,
            risk_assessment,
            breakdown,
            confidence: confidence(history),
            recommendations,
        })
    }

    fn assess_risk(
        &self,
        params: &PayoutParams,
        history: Option<&UserLearningHistory>,
        breakdown: &PayoutBreakdown,
    ) -> RiskAssessment {
        let gap = params.content_difficulty - params.user_skill_level;
        let success_probability = round2(
            (0.85 - 0.15 * (breakdown.timeline_factor - 1.0) - 0.05 * gap.max(0.0)
                + 0.2 * (breakdown.reliability - self.config.neutral_reliability))
                .clamp(0.05, 0.95),
        );

        let mut risk_factors = Vec::new();
        if breakdown.timeline_factor > 1.2 {
            risk_factors.push("Aggressive timeline for the content volume".to_string());
        }
        if gap >= 3.0 {
            risk_factors.push("Content is well above current skill level".to_string());
        }
        match history {
            None => risk_factors.push("No completed plans yet".to_string()),
            Some(_) if breakdown.reliability < 0.4 => {
                risk_factors.push("Low completion history".to_string())
            }
            Some(_) => {}
        }
        if params.customizations >= 5 {
            risk_factors.push("Heavily customized plan".to_string());
        }
        if breakdown.market_factor < 0.8 {
            risk_factors.push("Reward pool under pressure".to_string());
        }

        let (risk_level, risk_description) = if success_probability >= 0.7 {
            (
                RiskLevel::Low,
                "Comfortable pace for this content. Completion is likely.",
            )
        } else if success_probability >= 0.45 {
            (
                RiskLevel::Medium,
                "Achievable with steady weekly effort.",
            )
        } else {
            (
                RiskLevel::High,
                "Demanding plan. Expect to exceed the weekly hour target.",
            )
        };

        RiskAssessment {
            risk_level,
            risk_description: risk_description.to_string(),
            success_probability,
            risk_factors,
        }
    }

    fn recommendations(
        &self,
        params: &PayoutParams,
        history: Option<&UserLearningHistory>,
        risk: &RiskAssessment,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();
        let expected_weeks = self.expected_weeks(params.content_difficulty).ceil() as u32;
        if expected_weeks > params.timeline_weeks
            && risk.risk_level != RiskLevel::Low
        {
            recommendations.push(format!(
                "Extending the timeline to {expected_weeks} weeks would lower the risk"
            ));
        }
        if risk.risk_level == RiskLevel::High {
            recommendations
                .push("Consider a smaller stake until you build a completion streak".to_string());
        }
        if params.content_difficulty - params.user_skill_level >= 3.0 {
            recommendations.push("Review prerequisites before starting".to_string());
        }
        if history.is_none() {
            recommendations
                .push("Complete your first plan to unlock history-based rates".to_string());
        }
        if params.customizations > 0 {
            recommendations.push(format!(
                "Each customization lowers the multiplier by {}%",
                (self.config.customization_penalty * 100.0).round()
            ));
        }
        recommendations
    }
}

fn confidence(history: Option<&UserLearningHistory>) -> f64 {
    let attempts = history.map(|h| h.total_attempts.min(4)).unwrap_or(0);
    round2(0.5 + 0.1 * attempts as f64)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn market(health: f64, utilization: f64) -> MarketConditions {
        MarketConditions {
            platform_utilization: utilization,
            reward_pool_health: health,
            average_completion_rate: 0.7,
            demand_supply_ratio: 1.0,
            as_of: Utc::now(),
        }
    }

    fn params(timeline: u32, difficulty: f64, skill: f64) -> PayoutParams {
        PayoutParams {
            timeline_weeks: timeline,
            content_difficulty: difficulty,
            user_skill_level: skill,
            customizations: 0,
            stake_amount: 100.0,
        }
    }

    fn history(completion: f64, score: f64, streak: u32) -> UserLearningHistory {
        UserLearningHistory {
            completion_rate: completion,
            average_score: score,
            total_attempts: 5,
            streak_length: streak,
            last_activity: None,
        }
    }

    fn calc() -> PayoutCalculator {
        PayoutCalculator::default()
    }

    #[test]
    fn test_multiplier_always_in_bounds() {
        let histories = [None, Some(history(0.0, 0.0, 0)), Some(history(1.0, 1.0, 10))];
        for timeline in [1, 2, 4, 8, 16, 52] {
            for difficulty in [1.0, 5.0, 10.0] {
                for skill in [1.0, 5.0, 10.0] {
                    for h in &histories {
                        for m in [market(0.0, 1.0), market(1.0, 0.0)] {
                            let r = calc()
                                .calculate(&params(timeline, difficulty, skill), h.as_ref(), &m)
                                .unwrap();
                            assert!((0.5..=5.0).contains(&r.final_multiplier), "{r:?}");
                            assert!(r.estimated_return.conservative <= r.final_multiplier);
                            assert!(r.final_multiplier <= r.estimated_return.optimistic);
                            assert!(r.estimated_return.conservative >= 0.5);
                            assert!(r.estimated_return.optimistic <= 5.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_shorter_timeline_pays_more() {
        let m = market(0.8, 0.5);
        let short = calc().calculate(&params(3, 6.0, 5.0), None, &m).unwrap();
        let long = calc().calculate(&params(12, 6.0, 5.0), None, &m).unwrap();
        assert!(short.final_multiplier > long.final_multiplier);
    }

    #[test]
    fn test_new_user_cap_never_stricter_than_poor_history() {
        let m = market(1.0, 0.0);
        let hard = params(1, 10.0, 1.0);
        let new_user = calc().calculate(&hard, None, &m).unwrap();
        let poor = calc()
            .calculate(&hard, Some(&history(0.0, 0.0, 0)), &m)
            .unwrap();
        assert!(new_user.breakdown.cap >= poor.breakdown.cap);
        assert!(new_user.final_multiplier >= poor.final_multiplier);
    }

    #[test]
    fn test_strong_history_lowers_multiplier() {
        let m = market(0.8, 0.5);
        let p = params(6, 5.0, 5.0);
        let new_user = calc().calculate(&p, None, &m).unwrap();
        let strong = calc()
            .calculate(&p, Some(&history(1.0, 0.95, 6)), &m)
            .unwrap();
        assert!(strong.final_multiplier < new_user.final_multiplier);
        assert!(strong.confidence > new_user.confidence);
    }

    #[test]
    fn test_poor_market_dampens_multiplier() {
        let p = params(6, 5.0, 5.0);
        let healthy = calc().calculate(&p, None, &market(1.0, 0.0)).unwrap();
        let strained = calc().calculate(&p, None, &market(0.2, 1.0)).unwrap();
        assert!(strained.final_multiplier < healthy.final_multiplier);
        assert!(strained
            .risk_assessment
            .risk_factors
            .iter()
            .any(|f| f.contains("Reward pool")));
    }

    #[test]
    fn test_customizations_reduce_multiplier_with_floor() {
        let m = market(0.8, 0.5);
        let mut p = params(6, 5.0, 5.0);
        let base = calc().calculate(&p, None, &m).unwrap();
        p.customizations = 2;
        let two = calc().calculate(&p, None, &m).unwrap();
        p.customizations = 50;
        let many = calc().calculate(&p, None, &m).unwrap();

        assert!(two.final_multiplier < base.final_multiplier);
        assert_eq!(two.breakdown.customization_factor, 0.96);
        assert_eq!(many.breakdown.customization_factor, 0.9);
    }

    #[test]
    fn test_reference_calculation() {
        // timeline 6/6 = 1.0, skill gap 1.0, history 1.0, market 1.0 × 0.9
        let r = calc()
            .calculate(&params(6, 5.0, 5.0), None, &market(1.0, 0.4))
            .unwrap();
        assert_eq!(r.breakdown.timeline_factor, 1.0);
        assert_eq!(r.breakdown.market_factor, 0.9);
        assert_eq!(r.breakdown.cap, 4.0);
        assert_eq!(r.final_multiplier, 1.35);
        assert_eq!(r.potential_winnings.expected, 135);
        assert_eq!(r.estimated_return.conservative, 1.15);
        assert_eq!(r.estimated_return.optimistic, 1.69);
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let m = market(0.8, 0.5);
        assert!(calc().calculate(&params(0, 5.0, 5.0), None, &m).is_err());
        assert!(calc().calculate(&params(4, 0.0, 5.0), None, &m).is_err());
        assert!(calc().calculate(&params(4, 5.0, 11.0), None, &m).is_err());
        let mut p = params(4, 5.0, 5.0);
        p.stake_amount = -1.0;
        assert!(calc().calculate(&p, None, &m).is_err());
    }

    #[test]
    fn test_risk_levels_follow_pressure() {
        let m = market(0.8, 0.5);
        let relaxed = calc().calculate(&params(20, 3.0, 5.0), None, &m).unwrap();
        let crunch = calc().calculate(&params(1, 10.0, 2.0), None, &m).unwrap();
        assert_eq!(relaxed.risk_assessment.risk_level, RiskLevel::Low);
        assert_eq!(crunch.risk_assessment.risk_level, RiskLevel::High);
        assert!(crunch
            .recommendations
            .iter()
            .any(|r| r.starts_with("Extending the timeline")));
    }
}
