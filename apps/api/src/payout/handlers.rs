//! Axum route handlers for payout calculation and scenario simulation.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::payout::calculator::{PayoutCalculator, PayoutParams, PayoutResult, DEFAULT_STAKE};
use crate::payout::history::{load_history, market_snapshot, MarketConditions, UserLearningHistory};
use crate::payout::scenarios::{simulate_scenarios, Scenario};
use crate::state::AppState;
use crate::store::{load_owned_plan, PayoutAuditRecord, PlanStore};

#[derive(Debug, Deserialize)]
pub struct CalculatePayoutRequest {
    pub user_id: Uuid,
    /// Fills timeline, difficulty and customization count from the plan when omitted.
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub timeline_weeks: Option<u32>,
    #[serde(default)]
    pub content_difficulty: Option<f64>,
    pub user_skill_level: f64,
    #[serde(default)]
    pub customizations: Option<u32>,
    #[serde(default)]
    pub stake_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CalculatePayoutResponse {
    pub calculation_id: Uuid,
    pub params: PayoutParams,
    pub user_history: Option<UserLearningHistory>,
    pub market_conditions: MarketConditions,
    pub result: PayoutResult,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ScenariosQuery {
    pub user_id: Uuid,
    pub timeline_weeks: u32,
    pub content_difficulty: f64,
    pub user_skill_level: f64,
    #[serde(default)]
    pub customizations: u32,
    #[serde(default)]
    pub stake_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ScenariosResponse {
    pub scenarios: Vec<Scenario>,
    pub base_params: PayoutParams,
    pub user_history: Option<UserLearningHistory>,
    pub market_conditions: MarketConditions,
    pub generated_at: DateTime<Utc>,
}

async fn resolve_params(
    store: &dyn PlanStore,
    request: &CalculatePayoutRequest,
) -> Result<PayoutParams, AppError> {
    let plan = match request.plan_id {
        Some(plan_id) => Some(load_owned_plan(store, plan_id, request.user_id).await?),
        None => None,
    };

    let timeline_weeks = request
        .timeline_weeks
        .or(plan.as_ref().map(|p| p.duration_weeks))
        .ok_or_else(|| {
            AppError::Validation("timeline_weeks is required without a plan_id".to_string())
        })?;
    let content_difficulty = request
        .content_difficulty
        .or(plan.as_ref().map(|p| p.content_difficulty))
        .ok_or_else(|| {
            AppError::Validation("content_difficulty is required without a plan_id".to_string())
        })?;
    let customizations = request
        .customizations
        .or(plan.as_ref().map(|p| p.customizations.len() as u32))
        .unwrap_or(0);

    Ok(PayoutParams {
        timeline_weeks,
        content_difficulty,
        user_skill_level: request.user_skill_level,
        customizations,
        stake_amount: request.stake_amount.unwrap_or(DEFAULT_STAKE),
    })
}

/// Calculates a payout for the user and records it. A failed audit write is logged,
/// the calculation is still returned.
pub async fn calculate_payout(
    store: &dyn PlanStore,
    calculator: &PayoutCalculator,
    reward_pool_health: f64,
    request: &CalculatePayoutRequest,
) -> Result<CalculatePayoutResponse, AppError> {
    let params = resolve_params(store, request).await?;
    params.validate()?;

    let user_history = load_history(store, request.user_id).await;
    let market_conditions = market_snapshot(store, reward_pool_health).await;
    let result = calculator.calculate(&params, user_history.as_ref(), &market_conditions)?;

    let calculated_at = Utc::now();
    let record = PayoutAuditRecord {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        plan_id: request.plan_id,
        params: json!(params),
        result: json!(result),
        potential_winnings: json!(result.potential_winnings),
        calculated_at,
    };
    if let Err(e) = store.record_payout(&record).await {
        warn!("Failed to record payout calculation {}: {e}", record.id);
    }

    info!(
        "Payout for user {}: {}x over {} weeks ({:?} risk)",
        request.user_id,
        result.final_multiplier,
        params.timeline_weeks,
        result.risk_assessment.risk_level
    );

    Ok(CalculatePayoutResponse {
        calculation_id: record.id,
        params,
        user_history,
        market_conditions,
        result,
        calculated_at,
    })
}

// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/payout/calculate
pub async fn handle_calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculatePayoutRequest>,
) -> Result<Json<CalculatePayoutResponse>, AppError> {
    let response = calculate_payout(
        state.store.as_ref(),
        &state.payout,
        state.config.reward_pool_health,
        &request,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/payout/scenarios
pub async fn handle_scenarios(
    State(state): State<AppState>,
    Query(query): Query<ScenariosQuery>,
) -> Result<Json<ScenariosResponse>, AppError> {
    let base_params = PayoutParams {
        timeline_weeks: query.timeline_weeks,
        content_difficulty: query.content_difficulty,
        user_skill_level: query.user_skill_level,
        customizations: query.customizations,
        stake_amount: query.stake_amount.unwrap_or(DEFAULT_STAKE),
    };

    let store = state.store.as_ref();
    let user_history = load_history(store, query.user_id).await;
    let market_conditions = market_snapshot(store, state.config.reward_pool_health).await;
    let scenarios = simulate_scenarios(
        &state.payout,
        &base_params,
        user_history.as_ref(),
        &market_conditions,
    )?;

    Ok(Json(ScenariosResponse {
        scenarios,
        base_params,
        user_history,
        market_conditions,
        generated_at: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{LearningPlan, PlanStatus};
    use crate::planning::pacing::PacingConfig;
    use crate::planning::synthesizer::build_plan;
    use crate::planning::synthesizer::tests::{gaps, skill_content};
    use crate::store::memory::MemoryPlanStore;

    fn request(user_id: Uuid) -> CalculatePayoutRequest {
        CalculatePayoutRequest {
            user_id,
            plan_id: None,
            timeline_weeks: Some(6),
            content_difficulty: Some(5.0),
            user_skill_level: 5.0,
            customizations: None,
            stake_amount: None,
        }
    }

    async fn stored_plan(store: &MemoryPlanStore, user_id: Uuid, weeks: u32) -> LearningPlan {
        let plan = build_plan(
            user_id,
            Uuid::new_v4(),
            &gaps(&["Rust"]),
            &[skill_content("Rust", 6)],
            weeks,
            &PacingConfig::default(),
        )
        .unwrap();
        store.insert_plan(&plan).await.unwrap();
        plan
    }

    #[tokio::test]
    async fn test_calculation_is_recorded() {
        let store = MemoryPlanStore::new();
        let user_id = Uuid::new_v4();
        let response = calculate_payout(&store, &PayoutCalculator::default(), 0.8, &request(user_id))
            .await
            .unwrap();

        assert!(response.user_history.is_none());
        assert_eq!(response.params.stake_amount, DEFAULT_STAKE);
        let payouts = store.payouts().await;
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].id, response.calculation_id);
        assert_eq!(payouts[0].user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_params_filled_from_plan() {
        let store = MemoryPlanStore::new();
        let user_id = Uuid::new_v4();
        let plan = stored_plan(&store, user_id, 6).await;

        let req = CalculatePayoutRequest {
            plan_id: Some(plan.id),
            timeline_weeks: None,
            content_difficulty: None,
            ..request(user_id)
        };
        let response = calculate_payout(&store, &PayoutCalculator::default(), 0.8, &req)
            .await
            .unwrap();
        assert_eq!(response.params.timeline_weeks, plan.duration_weeks);
        assert_eq!(response.params.content_difficulty, plan.content_difficulty);
        assert_eq!(response.params.customizations, 0);
    }

    #[tokio::test]
    async fn test_missing_params_without_plan_rejected() {
        let store = MemoryPlanStore::new();
        let req = CalculatePayoutRequest {
            timeline_weeks: None,
            ..request(Uuid::new_v4())
        };
        let err = calculate_payout(&store, &PayoutCalculator::default(), 0.8, &req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.payouts().await.is_empty());
    }

    #[tokio::test]
    async fn test_other_users_plan_not_found() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store, Uuid::new_v4(), 4).await;
        let req = CalculatePayoutRequest {
            plan_id: Some(plan.id),
            ..request(Uuid::new_v4())
        };
        let err = calculate_payout(&store, &PayoutCalculator::default(), 0.8, &req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_finished_plans_feed_history() {
        let store = MemoryPlanStore::new();
        let user_id = Uuid::new_v4();
        let mut plan = stored_plan(&store, user_id, 4).await;
        plan.status = PlanStatus::Completed;
        plan.final_score = Some(0.9);
        assert!(store.compare_and_swap(&plan, 1).await.unwrap());

        let response = calculate_payout(&store, &PayoutCalculator::default(), 0.8, &request(user_id))
            .await
            .unwrap();
        let history = response.user_history.unwrap();
        assert_eq!(history.total_attempts, 1);
        assert_eq!(history.completion_rate, 1.0);
        assert_eq!(history.streak_length, 1);
    }
}
