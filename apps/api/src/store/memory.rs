use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobContext;
use crate::models::plan::{LearningPlan, PlanStatus};
use crate::store::{PayoutAuditRecord, PlanOutcome, PlanStore, PlatformActivity};

/// In-process store with the same version semantics as Postgres.
#[derive(Default)]
pub struct MemoryPlanStore {
    plans: RwLock<HashMap<Uuid, LearningPlan>>,
    jobs: RwLock<HashMap<Uuid, JobContext>>,
    candidate_skills: RwLock<HashMap<Uuid, Vec<String>>>,
    payouts: RwLock<Vec<PayoutAuditRecord>>,
    /// Number of upcoming compare-and-swap calls that lose to a simulated
    /// concurrent writer.
    injected_conflicts: AtomicU32,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_job(&self, job: JobContext) {
        self.jobs.write().await.insert(job.job_id, job);
    }

    pub async fn set_candidate_skills(&self, user_id: Uuid, skills: Vec<String>) {
        self.candidate_skills.write().await.insert(user_id, skills);
    }

    /// Makes the next `count` compare-and-swap calls fail as if another writer had
    /// bumped the version first.
    pub fn inject_conflicts(&self, count: u32) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    pub async fn payouts(&self) -> Vec<PayoutAuditRecord> {
        self.payouts.read().await.clone()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn fetch_job_context(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<JobContext>, AppError> {
        let Some(mut job) = self.jobs.read().await.get(&job_id).cloned() else {
            return Ok(None);
        };
        job.candidate_skills = self
            .candidate_skills
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        Ok(Some(job))
    }

    async fn find_active_plan(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<LearningPlan>, AppError> {
        Ok(self
            .plans
            .read()
            .await
            .values()
            .filter(|p| p.user_id == user_id && p.job_id == job_id)
            .filter(|p| p.status == PlanStatus::Active)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<LearningPlan>, AppError> {
        Ok(self.plans.read().await.get(&plan_id).cloned())
    }

    async fn insert_plan(&self, plan: &LearningPlan) -> Result<bool, AppError> {
        let mut plans = self.plans.write().await;
        if plans.contains_key(&plan.id) {
            return Err(AppError::Conflict(format!("Plan {} already exists", plan.id)));
        }
        let taken = plan.status == PlanStatus::Active
            && plans.values().any(|p| {
                p.user_id == plan.user_id
                    && p.job_id == plan.job_id
                    && p.status == PlanStatus::Active
            });
        if taken {
            return Ok(false);
        }
        plans.insert(plan.id, plan.clone());
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        plan: &LearningPlan,
        expected_version: i32,
    ) -> Result<bool, AppError> {
        let mut plans = self.plans.write().await;
        let Some(stored) = plans.get_mut(&plan.id) else {
            return Ok(false);
        };

        let pending = self.injected_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.injected_conflicts.store(pending - 1, Ordering::SeqCst);
            stored.version += 1;
            stored.updated_at = Utc::now();
            return Ok(false);
        }

        if stored.version != expected_version {
            return Ok(false);
        }

        let mut updated = plan.clone();
        updated.id = stored.id;
        updated.user_id = stored.user_id;
        updated.job_id = stored.job_id;
        updated.created_at = stored.created_at;
        updated.version = expected_version + 1;
        updated.updated_at = Utc::now();
        *stored = updated;
        Ok(true)
    }

    async fn plan_outcomes(&self, user_id: Uuid) -> Result<Vec<PlanOutcome>, AppError> {
        let mut outcomes: Vec<PlanOutcome> = self
            .plans
            .read()
            .await
            .values()
            .filter(|p| p.user_id == user_id && p.status.is_finished())
            .map(|p| PlanOutcome {
                status: p.status.as_str().to_string(),
                final_score: p.final_score,
                updated_at: p.updated_at,
            })
            .collect();
        outcomes.sort_by_key(|o| o.updated_at);
        Ok(outcomes)
    }

    async fn platform_activity(&self, since: DateTime<Utc>) -> Result<PlatformActivity, AppError> {
        let plans = self.plans.read().await;
        Ok(PlatformActivity {
            plans_created: plans.values().filter(|p| p.created_at >= since).count() as i64,
            plans_completed: plans
                .values()
                .filter(|p| p.status == PlanStatus::Completed && p.updated_at >= since)
                .count() as i64,
        })
    }

    async fn record_payout(&self, record: &PayoutAuditRecord) -> Result<(), AppError> {
        self.payouts.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::pacing::PacingConfig;
    use crate::planning::synthesizer::build_plan;
    use crate::planning::synthesizer::tests::{gaps, skill_content};

    fn plan() -> LearningPlan {
        build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &gaps(&["Rust"]),
            &[skill_content("Rust", 6)],
            4,
            &PacingConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_compare_and_swap_bumps_version() {
        let store = MemoryPlanStore::new();
        let mut plan = plan();
        store.insert_plan(&plan).await.unwrap();

        plan.progress = 50.0;
        assert!(store.compare_and_swap(&plan, 1).await.unwrap());
        let stored = store.get_plan(plan.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.progress, 50.0);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = MemoryPlanStore::new();
        let mut plan = plan();
        store.insert_plan(&plan).await.unwrap();

        assert!(store.compare_and_swap(&plan, 1).await.unwrap());
        plan.progress = 10.0;
        assert!(!store.compare_and_swap(&plan, 1).await.unwrap());
        let stored = store.get_plan(plan.id).await.unwrap().unwrap();
        assert_eq!(stored.progress, 0.0);
    }

    #[tokio::test]
    async fn test_second_active_plan_for_job_is_refused() {
        let store = MemoryPlanStore::new();
        let first = plan();
        assert!(store.insert_plan(&first).await.unwrap());

        let second = LearningPlan {
            id: Uuid::new_v4(),
            ..first.clone()
        };
        assert!(!store.insert_plan(&second).await.unwrap());
        assert!(store.get_plan(second.id).await.unwrap().is_none());

        let mut finished = first.clone();
        finished.status = PlanStatus::Completed;
        assert!(store.compare_and_swap(&finished, 1).await.unwrap());
        assert!(store.insert_plan(&second).await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_conflict_bumps_stored_version() {
        let store = MemoryPlanStore::new();
        let plan = plan();
        store.insert_plan(&plan).await.unwrap();
        store.inject_conflicts(1);

        assert!(!store.compare_and_swap(&plan, 1).await.unwrap());
        assert!(store.compare_and_swap(&plan, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_job_context_joins_candidate_skills() {
        let store = MemoryPlanStore::new();
        let user = Uuid::new_v4();
        let job = JobContext {
            job_id: Uuid::new_v4(),
            job_title: "Backend Engineer".to_string(),
            company_name: "Acme".to_string(),
            required_skills: vec!["Go".to_string()],
            candidate_skills: vec![],
        };
        store.add_job(job.clone()).await;
        store.set_candidate_skills(user, vec!["Python".to_string()]).await;

        let ctx = store.fetch_job_context(job.job_id, user).await.unwrap().unwrap();
        assert_eq!(ctx.candidate_skills, vec!["Python"]);
        assert!(store
            .fetch_job_context(Uuid::new_v4(), user)
            .await
            .unwrap()
            .is_none());
    }
}
