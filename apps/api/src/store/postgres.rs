use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobContext;
use crate::models::plan::{LearningPlan, LearningPlanRow};
use crate::store::{PayoutAuditRecord, PlanOutcome, PlanStore, PlatformActivity};

#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_plan(row: LearningPlanRow) -> Result<LearningPlan, AppError> {
    LearningPlan::try_from(row).map_err(AppError::Internal)
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn fetch_job_context(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<JobContext>, AppError> {
        Ok(sqlx::query_as::<_, JobContext>(
            r#"
            SELECT j.id AS job_id,
                   j.title AS job_title,
                   j.company_name,
                   j.required_skills,
                   COALESCE(p.skills, '{}') AS candidate_skills
            FROM jobs j
            LEFT JOIN candidate_profiles p ON p.user_id = $2
            WHERE j.id = $1
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_active_plan(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<LearningPlan>, AppError> {
        sqlx::query_as::<_, LearningPlanRow>(
            r#"
            SELECT * FROM learning_plans
            WHERE user_id = $1 AND job_id = $2 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?
        .map(into_plan)
        .transpose()
    }

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<LearningPlan>, AppError> {
        sqlx::query_as::<_, LearningPlanRow>("SELECT * FROM learning_plans WHERE id = $1")
            .bind(plan_id)
            .fetch_optional(&self.pool)
            .await?
            .map(into_plan)
            .transpose()
    }

    async fn insert_plan(&self, plan: &LearningPlan) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO learning_plans
                (id, user_id, job_id, duration_weeks, intensity, weekly_hours_min,
                 weekly_hours_max, required_skills, weekly_schedule, total_videos,
                 total_hours, content_difficulty, overview, customizations, is_customized,
                 status, progress, completed_video_ids, final_score, version,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22)
            ON CONFLICT (user_id, job_id) WHERE status = 'active' DO NOTHING
            "#,
        )
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(plan.job_id)
        .bind(plan.duration_weeks as i32)
        .bind(plan.intensity.as_str())
        .bind(plan.weekly_hours_target.min)
        .bind(plan.weekly_hours_target.max)
        .bind(&plan.required_skills)
        .bind(Json(&plan.weekly_schedule))
        .bind(plan.total_videos as i32)
        .bind(plan.total_hours)
        .bind(plan.content_difficulty)
        .bind(plan.overview.as_ref().map(Json))
        .bind(Json(&plan.customizations))
        .bind(plan.is_customized)
        .bind(plan.status.as_str())
        .bind(plan.progress)
        .bind(&plan.completed_video_ids)
        .bind(plan.final_score)
        .bind(plan.version)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(
                "User {} already has an active plan for job {}",
                plan.user_id, plan.job_id
            );
            return Ok(false);
        }
        debug!("Inserted learning plan {} for user {}", plan.id, plan.user_id);
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        plan: &LearningPlan,
        expected_version: i32,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE learning_plans
            SET duration_weeks = $3,
                intensity = $4,
                weekly_hours_min = $5,
                weekly_hours_max = $6,
                required_skills = $7,
                weekly_schedule = $8,
                total_videos = $9,
                total_hours = $10,
                content_difficulty = $11,
                overview = $12,
                customizations = $13,
                is_customized = $14,
                status = $15,
                progress = $16,
                completed_video_ids = $17,
                final_score = $18,
                updated_at = NOW(),
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(plan.id)
        .bind(expected_version)
        .bind(plan.duration_weeks as i32)
        .bind(plan.intensity.as_str())
        .bind(plan.weekly_hours_target.min)
        .bind(plan.weekly_hours_target.max)
        .bind(&plan.required_skills)
        .bind(Json(&plan.weekly_schedule))
        .bind(plan.total_videos as i32)
        .bind(plan.total_hours)
        .bind(plan.content_difficulty)
        .bind(plan.overview.as_ref().map(Json))
        .bind(Json(&plan.customizations))
        .bind(plan.is_customized)
        .bind(plan.status.as_str())
        .bind(plan.progress)
        .bind(&plan.completed_video_ids)
        .bind(plan.final_score)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn plan_outcomes(&self, user_id: Uuid) -> Result<Vec<PlanOutcome>, AppError> {
        Ok(sqlx::query_as::<_, PlanOutcome>(
            r#"
            SELECT status, final_score, updated_at
            FROM learning_plans
            WHERE user_id = $1 AND status IN ('completed', 'failed')
            ORDER BY updated_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn platform_activity(&self, since: DateTime<Utc>) -> Result<PlatformActivity, AppError> {
        let (plans_created, plans_completed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE created_at >= $1),
                COUNT(*) FILTER (WHERE status = 'completed' AND updated_at >= $1)
            FROM learning_plans
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(PlatformActivity {
            plans_created,
            plans_completed,
        })
    }

    async fn record_payout(&self, record: &PayoutAuditRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO payout_calculations
                (id, user_id, plan_id, params, result, potential_winnings, calculated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.plan_id)
        .bind(&record.params)
        .bind(&record.result)
        .bind(&record.potential_winnings)
        .bind(record.calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
