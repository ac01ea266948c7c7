//! Plan persistence. Handlers and services talk to `Arc<dyn PlanStore>`; production
//! uses `PgPlanStore`, tests use `MemoryPlanStore`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobContext;
use crate::models::plan::LearningPlan;

/// Read-modify-write attempts before a version conflict is surfaced as `AppError::Conflict`.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// A finished plan, as seen by history derivation.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PlanOutcome {
    pub status: String,
    pub final_score: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Platform-wide plan counts since a cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlatformActivity {
    pub plans_created: i64,
    pub plans_completed: i64,
}

/// One payout calculation, kept for audit.
#[derive(Debug, Clone, Serialize)]
pub struct PayoutAuditRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub params: Value,
    pub result: Value,
    pub potential_winnings: Value,
    pub calculated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Job requirements joined with the candidate's current skills.
    async fn fetch_job_context(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<JobContext>, AppError>;

    /// The user's active plan for a job, if any.
    async fn find_active_plan(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<LearningPlan>, AppError>;

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<LearningPlan>, AppError>;

    /// Stores a new plan. Returns `false` without writing when the user already has
    /// an active plan for the same job.
    async fn insert_plan(&self, plan: &LearningPlan) -> Result<bool, AppError>;

    /// Writes every mutable field of `plan` if the stored version still equals
    /// `expected_version`, bumping the version by one. Returns `false` when another
    /// writer got there first; nothing is written in that case.
    async fn compare_and_swap(
        &self,
        plan: &LearningPlan,
        expected_version: i32,
    ) -> Result<bool, AppError>;

    /// Completed and failed plans for a user, oldest first.
    async fn plan_outcomes(&self, user_id: Uuid) -> Result<Vec<PlanOutcome>, AppError>;

    async fn platform_activity(&self, since: DateTime<Utc>) -> Result<PlatformActivity, AppError>;

    async fn record_payout(&self, record: &PayoutAuditRecord) -> Result<(), AppError>;
}

/// Loads a plan and checks it belongs to `user_id`. Someone else's plan is reported
/// as missing.
pub async fn load_owned_plan(
    store: &dyn PlanStore,
    plan_id: Uuid,
    user_id: Uuid,
) -> Result<LearningPlan, AppError> {
    store
        .get_plan(plan_id)
        .await?
        .filter(|p| p.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Learning plan {plan_id} not found")))
}
