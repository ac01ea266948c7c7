//! Plan generation pipeline.
//!
//! Flow: load job context → gap analysis → per-skill curation → schedule →
//!       overview → persist (insert, or overwrite the active plan on regenerate).
//!
//! An existing active plan for (user, job) is returned as-is unless the caller
//! asks for a regeneration.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::curation::curator::ContentCurator;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::content::{ContentType, DifficultyLevel, SkillGap};
use crate::models::plan::LearningPlan;
use crate::planning::gap_analysis::analyze_gaps;
use crate::planning::overview::generate_overview;
use crate::planning::pacing::PacingConfig;
use crate::planning::synthesizer::{build_plan, MAX_DURATION_WEEKS};
use crate::store::{PlanStore, MAX_WRITE_ATTEMPTS};

/// Catalog page cap; no skill asks for more videos than this.
const MAX_VIDEOS_PER_SKILL: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePlanRequest {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub duration_weeks: u32,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub force_regenerate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratePlanResponse {
    pub plan: LearningPlan,
    pub skill_gaps: Vec<SkillGap>,
    /// True when an existing plan was returned without regenerating.
    pub cached: bool,
}

/// Videos to curate per skill so that every week of its block can be filled.
pub fn videos_needed_per_skill(
    skill_count: usize,
    duration_weeks: u32,
    pacing: &PacingConfig,
) -> u32 {
    let tier = pacing.pacing(pacing.tier_for(duration_weeks));
    let weeks_per_skill = (duration_weeks / skill_count.max(1) as u32).max(1);
    (weeks_per_skill * tier.videos_per_week.max(1) as u32).min(MAX_VIDEOS_PER_SKILL)
}

pub async fn generate_plan(
    store: &dyn PlanStore,
    curator: &ContentCurator,
    llm: Option<&LlmClient>,
    pacing: &PacingConfig,
    request: &GeneratePlanRequest,
) -> Result<GeneratePlanResponse, AppError> {
    if request.duration_weeks == 0 || request.duration_weeks > MAX_DURATION_WEEKS {
        return Err(AppError::Validation(format!(
            "duration_weeks must be between 1 and {MAX_DURATION_WEEKS}"
        )));
    }

    let job = store
        .fetch_job_context(request.job_id, request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", request.job_id)))?;

    let existing = store
        .find_active_plan(request.user_id, request.job_id)
        .await?;
    if let Some(plan) = existing.as_ref().filter(|_| !request.force_regenerate) {
        info!(
            "Returning existing plan {} for user {} and job {}",
            plan.id, request.user_id, request.job_id
        );
        return Ok(GeneratePlanResponse {
            skill_gaps: analyze_gaps(&plan.required_skills, &[]),
            plan: plan.clone(),
            cached: true,
        });
    }

    // Step 1: Gap analysis. A candidate who already lists every skill still gets a
    // refresher plan over the full requirement list.
    let mut gaps = analyze_gaps(&job.required_skills, &job.candidate_skills);
    if gaps.is_empty() {
        gaps = analyze_gaps(&job.required_skills, &[]);
    }
    if gaps.is_empty() {
        return Err(AppError::Validation(format!(
            "Job {} lists no required skills",
            request.job_id
        )));
    }
    info!(
        "Gap analysis for user {}: {} skills to cover",
        request.user_id,
        gaps.len()
    );

    // Step 2: Curate content per skill
    let skills: Vec<String> = gaps.iter().map(|g| g.skill.clone()).collect();
    let per_skill = videos_needed_per_skill(skills.len(), request.duration_weeks, pacing);
    let content = curator
        .curate_skills(&skills, request.difficulty, request.content_type, per_skill)
        .await;

    // Step 3: Schedule
    let mut plan = build_plan(
        request.user_id,
        request.job_id,
        &gaps,
        &content,
        request.duration_weeks,
        pacing,
    )?;
    if plan.weekly_schedule.is_empty() || plan.total_videos == 0 {
        warn!(
            "No content could be curated for user {} and job {}",
            request.user_id, request.job_id
        );
        return Err(AppError::Validation(format!(
            "No learning content available for {}",
            skills.join(", ")
        )));
    }
    info!(
        "Built {} plan with {} weeks and {} videos",
        plan.intensity,
        plan.weekly_schedule.len(),
        plan.total_videos
    );

    // Step 4: Overview (never fails)
    plan.overview = Some(generate_overview(llm, &job, &plan).await);

    // Step 5: Persist
    persist(store, &mut plan, existing).await?;

    Ok(GeneratePlanResponse {
        plan,
        skill_gaps: gaps,
        cached: false,
    })
}

/// Inserts `plan`, or overwrites the active plan for the same (user, job) in place.
/// The overwrite keeps the stored id and creation time. Losing either race (another
/// request inserted first, or bumped the version) re-reads the active plan and tries
/// again.
async fn persist(
    store: &dyn PlanStore,
    plan: &mut LearningPlan,
    mut current: Option<LearningPlan>,
) -> Result<(), AppError> {
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let Some(active) = current.take() else {
            if store.insert_plan(plan).await? {
                info!("Stored new plan {}", plan.id);
                return Ok(());
            }
            warn!(
                "Active plan for user {} and job {} appeared concurrently (attempt {attempt}/{MAX_WRITE_ATTEMPTS})",
                plan.user_id, plan.job_id
            );
            current = store.find_active_plan(plan.user_id, plan.job_id).await?;
            continue;
        };

        plan.id = active.id;
        plan.created_at = active.created_at;
        plan.version = active.version;
        if store.compare_and_swap(plan, active.version).await? {
            plan.version = active.version + 1;
            info!("Regenerated plan {} (version {})", plan.id, plan.version);
            return Ok(());
        }

        warn!(
            "Version conflict regenerating plan {} (attempt {attempt}/{MAX_WRITE_ATTEMPTS})",
            active.id
        );
        current = store.find_active_plan(plan.user_id, plan.job_id).await?;
        if current.is_none() {
            plan.id = Uuid::new_v4();
            plan.version = 1;
        }
    }

    Err(AppError::Conflict(format!(
        "Plan {} was modified concurrently; try again",
        plan.id
    )))
}
