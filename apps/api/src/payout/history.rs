//! Inputs to the payout calculator that come from the store: the user's learning
//! history and a point-in-time market snapshot. Both degrade to neutral values
//! when the store can't answer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::plan::round2;
use crate::store::{PlanOutcome, PlanStore, PlatformActivity};

/// Score assumed for a finished plan that never recorded one.
const DEFAULT_PLAN_SCORE: f64 = 0.75;
/// Plans created in the window that count as a fully utilized platform.
const FULL_UTILIZATION_PLANS: f64 = 100.0;
const DEFAULT_COMPLETION_RATE: f64 = 0.7;
const DEFAULT_UTILIZATION: f64 = 0.5;
const MARKET_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLearningHistory {
    /// Completed / finished, 0.0 – 1.0.
    pub completion_rate: f64,
    /// 0.0 – 1.0.
    pub average_score: f64,
    pub total_attempts: u32,
    /// Completed plans at the end of the history with no failure in between.
    pub streak_length: u32,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Platform-wide conditions. Recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub platform_utilization: f64,
    pub reward_pool_health: f64,
    pub average_completion_rate: f64,
    pub demand_supply_ratio: f64,
    pub as_of: DateTime<Utc>,
}

impl MarketConditions {
    /// Snapshot used when platform activity is unavailable.
    pub fn fallback(reward_pool_health: f64, as_of: DateTime<Utc>) -> Self {
        Self {
            platform_utilization: DEFAULT_UTILIZATION,
            reward_pool_health: reward_pool_health.clamp(0.0, 1.0),
            average_completion_rate: DEFAULT_COMPLETION_RATE,
            demand_supply_ratio: 1.0,
            as_of,
        }
    }
}

/// Derives history from finished plans, oldest first. `None` for a user who has
/// never finished a plan.
pub fn summarize_history(outcomes: &[PlanOutcome]) -> Option<UserLearningHistory> {
    if outcomes.is_empty() {
        return None;
    }

    let total = outcomes.len();
    let completed = outcomes.iter().filter(|o| o.status == "completed").count();
    let score_sum: f64 = outcomes
        .iter()
        .map(|o| o.final_score.unwrap_or(DEFAULT_PLAN_SCORE))
        .sum();
    let streak = outcomes
        .iter()
        .rev()
        .take_while(|o| o.status == "completed")
        .count();

    Some(UserLearningHistory {
        completion_rate: round2(completed as f64 / total as f64),
        average_score: round2(score_sum / total as f64),
        total_attempts: total as u32,
        streak_length: streak as u32,
        last_activity: outcomes.last().map(|o| o.updated_at),
    })
}

pub fn market_from_activity(
    activity: PlatformActivity,
    reward_pool_health: f64,
    as_of: DateTime<Utc>,
) -> MarketConditions {
    let created = activity.plans_created.max(0) as f64;
    MarketConditions {
        platform_utilization: round2((created / FULL_UTILIZATION_PLANS).min(1.0)),
        reward_pool_health: reward_pool_health.clamp(0.0, 1.0),
        average_completion_rate: if created > 0.0 {
            round2((activity.plans_completed.max(0) as f64 / created).min(1.0))
        } else {
            DEFAULT_COMPLETION_RATE
        },
        demand_supply_ratio: 1.0,
        as_of,
    }
}

pub async fn load_history(store: &dyn PlanStore, user_id: Uuid) -> Option<UserLearningHistory> {
    match store.plan_outcomes(user_id).await {
        Ok(outcomes) => summarize_history(&outcomes),
        Err(e) => {
            warn!("Could not load learning history for user {user_id}, treating as new: {e}");
            None
        }
    }
}

/// Market snapshot over the last seven days of platform activity.
pub async fn market_snapshot(store: &dyn PlanStore, reward_pool_health: f64) -> MarketConditions {
    let now = Utc::now();
    match store
        .platform_activity(now - Duration::days(MARKET_WINDOW_DAYS))
        .await
    {
        Ok(activity) => market_from_activity(activity, reward_pool_health, now),
        Err(e) => {
            warn!("Could not load platform activity, using default market conditions: {e}");
            MarketConditions::fallback(reward_pool_health, now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: &str, score: Option<f64>, days_ago: i64) -> PlanOutcome {
        PlanOutcome {
            status: status.to_string(),
            final_score: score,
            updated_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_no_finished_plans_means_no_history() {
        assert!(summarize_history(&[]).is_none());
    }

    #[test]
    fn test_history_rates_and_trailing_streak() {
        let history = summarize_history(&[
            outcome("completed", Some(0.9), 40),
            outcome("failed", None, 30),
            outcome("completed", Some(0.8), 20),
            outcome("completed", None, 10),
        ])
        .unwrap();

        assert_eq!(history.total_attempts, 4);
        assert_eq!(history.completion_rate, 0.75);
        // (0.9 + 0.75 + 0.8 + 0.75) / 4
        assert_eq!(history.average_score, 0.8);
        assert_eq!(history.streak_length, 2);
    }

    #[test]
    fn test_streak_broken_by_latest_failure() {
        let history = summarize_history(&[
            outcome("completed", None, 20),
            outcome("failed", None, 10),
        ])
        .unwrap();
        assert_eq!(history.streak_length, 0);
    }

    #[test]
    fn test_market_from_activity() {
        let now = Utc::now();
        let market = market_from_activity(
            PlatformActivity {
                plans_created: 40,
                plans_completed: 10,
            },
            0.8,
            now,
        );
        assert_eq!(market.platform_utilization, 0.4);
        assert_eq!(market.average_completion_rate, 0.25);
        assert_eq!(market.reward_pool_health, 0.8);
        assert_eq!(market.as_of, now);
    }

    #[test]
    fn test_quiet_platform_uses_default_completion_rate() {
        let market = market_from_activity(PlatformActivity::default(), 0.8, Utc::now());
        assert_eq!(market.platform_utilization, 0.0);
        assert_eq!(market.average_completion_rate, DEFAULT_COMPLETION_RATE);
    }

    #[test]
    fn test_utilization_is_capped() {
        let market = market_from_activity(
            PlatformActivity {
                plans_created: 500,
                plans_completed: 100,
            },
            0.8,
            Utc::now(),
        );
        assert_eq!(market.platform_utilization, 1.0);
    }
}
