//! Plan mutations. Every write is a read-modify-write guarded by the plan version;
//! a lost race re-reads the plan and re-applies the change.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::customization::difficulty::{
    customization_stats, recalculate_difficulty, CustomizationStats, DifficultyRecalculation,
};
use crate::customization::path_validation::{validate_path, PathValidation};
use crate::customization::progress::{apply_progress, ProgressUpdate};
use crate::customization::substitution::{
    apply_substitution, validate_substitution, SubstitutionRequest,
};
use crate::errors::AppError;
use crate::models::content::VideoContent;
use crate::models::plan::{Customization, LearningPlan, SubstitutionValidation};
use crate::store::{load_owned_plan, PlanStore, MAX_WRITE_ATTEMPTS};

#[derive(Debug, Clone, Serialize)]
pub struct CustomizationOutcome {
    pub customization: Customization,
    pub validation_result: SubstitutionValidation,
    pub recalculation: DifficultyRecalculation,
    pub customization_stats: CustomizationStats,
    pub plan_version: i32,
}

/// Loads the plan, applies `mutate` and writes it back if nobody else wrote in the
/// meantime. `mutate` runs again on a fresh copy after each lost race, so it must
/// not have side effects outside the plan.
pub async fn update_plan<T, F>(
    store: &dyn PlanStore,
    plan_id: Uuid,
    user_id: Uuid,
    mut mutate: F,
) -> Result<(LearningPlan, T), AppError>
where
    F: FnMut(&mut LearningPlan) -> Result<T, AppError>,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let mut plan = load_owned_plan(store, plan_id, user_id).await?;
        let expected = plan.version;
        let output = mutate(&mut plan)?;

        if store.compare_and_swap(&plan, expected).await? {
            plan.version = expected + 1;
            return Ok((plan, output));
        }
        warn!("Version conflict on plan {plan_id} (attempt {attempt}/{MAX_WRITE_ATTEMPTS})");
    }

    Err(AppError::Conflict(format!(
        "Plan {plan_id} kept changing underneath this update; try again"
    )))
}

/// Substitutes one video. Rejected substitutions leave the plan untouched and come
/// back as `ValidationFailed`.
pub async fn customize_plan(
    store: &dyn PlanStore,
    plan_id: Uuid,
    request: &SubstitutionRequest,
) -> Result<CustomizationOutcome, AppError> {
    if request.skill_id.trim().is_empty() {
        return Err(AppError::Validation("skill_id cannot be empty".to_string()));
    }

    let (plan, (customization, recalculation)) =
        update_plan(store, plan_id, request.user_id, |plan| {
            let original = match request.original_content_id.as_deref() {
                Some(id) => Some(plan.find_video(id).ok_or_else(|| {
                    AppError::NotFound(format!("Content {id} not found in plan"))
                })?),
                None => None,
            };
            let validation = validate_substitution(original, &request.new_content);
            if !validation.is_valid {
                return Err(AppError::ValidationFailed {
                    message: "Content substitution validation failed".to_string(),
                    details: json!({
                        "validation_errors": validation.errors,
                        "warnings": validation.warnings,
                    }),
                });
            }

            let customization = apply_substitution(plan, request, validation)?;
            let recalculation = recalculate_difficulty(plan);
            Ok((customization, recalculation))
        })
        .await?;

    info!(
        "Customized plan {} ({} customizations, difficulty {})",
        plan.id,
        plan.customizations.len(),
        plan.content_difficulty
    );

    Ok(CustomizationOutcome {
        validation_result: customization.validation_result.clone(),
        customization,
        recalculation,
        customization_stats: customization_stats(&plan),
        plan_version: plan.version,
    })
}

/// Checks a user-assembled content map against the plan's required skills.
/// Read-only.
pub async fn validate_custom_path(
    store: &dyn PlanStore,
    plan_id: Uuid,
    user_id: Uuid,
    content: &BTreeMap<String, Vec<VideoContent>>,
) -> Result<PathValidation, AppError> {
    let plan = load_owned_plan(store, plan_id, user_id).await?;
    Ok(validate_path(&plan.required_skills, content))
}

pub async fn update_progress(
    store: &dyn PlanStore,
    plan_id: Uuid,
    update: &ProgressUpdate,
) -> Result<LearningPlan, AppError> {
    let (plan, ()) = update_plan(store, plan_id, update.user_id, |plan| {
        apply_progress(plan, update)
    })
    .await?;

    info!(
        "Plan {} progress {}% ({})",
        plan.id,
        plan.progress,
        plan.status.as_str()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::PlanStatus;
    use crate::planning::pacing::PacingConfig;
    use crate::planning::synthesizer::build_plan;
    use crate::planning::synthesizer::tests::{gaps, skill_content, video};
    use crate::store::memory::MemoryPlanStore;

    async fn stored_plan(store: &MemoryPlanStore) -> LearningPlan {
        let plan = build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &gaps(&["React", "Node"]),
            &[skill_content("React", 4), skill_content("Node", 4)],
            4,
            &PacingConfig::default(),
        )
        .unwrap();
        store.insert_plan(&plan).await.unwrap();
        plan
    }

    fn substitution(user_id: Uuid, original: &str, relevance: f64) -> SubstitutionRequest {
        let mut new_content = video("yt-abc", "React hooks explained", 45);
        new_content.relevance_score = relevance;
        SubstitutionRequest {
            user_id,
            skill_id: "React".to_string(),
            original_content_id: Some(original.to_string()),
            new_content,
            reason: Some("Clearer explanations".to_string()),
        }
    }

    #[tokio::test]
    async fn test_accepted_substitution_persists_and_reloads() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;

        let outcome = customize_plan(&store, plan.id, &substitution(plan.user_id, "React-1", 92.0))
            .await
            .unwrap();
        assert_eq!(outcome.plan_version, 2);
        assert_eq!(outcome.customization_stats.customized_videos, 1);

        let reloaded = store.get_plan(plan.id).await.unwrap().unwrap();
        assert!(reloaded.is_customized);
        assert_eq!(reloaded.customizations, vec![outcome.customization.clone()]);
        assert!(reloaded.find_video("yt-abc").is_some());
        assert!(reloaded.find_video("React-1").is_none());
    }

    #[tokio::test]
    async fn test_rejected_substitution_is_never_persisted() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;

        let err = customize_plan(&store, plan.id, &substitution(plan.user_id, "React-1", 50.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed { .. }));

        let reloaded = store.get_plan(plan.id).await.unwrap().unwrap();
        assert!(reloaded.customizations.is_empty());
        assert!(!reloaded.is_customized);
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn test_other_users_plan_is_not_found() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;

        let err = customize_plan(&store, plan.id, &substitution(Uuid::new_v4(), "React-1", 92.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_conflict_is_retried_against_fresh_read() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;
        store.inject_conflicts(2);

        let outcome = customize_plan(&store, plan.id, &substitution(plan.user_id, "React-1", 92.0))
            .await
            .unwrap();
        assert_eq!(outcome.plan_version, 4);

        let reloaded = store.get_plan(plan.id).await.unwrap().unwrap();
        assert_eq!(reloaded.customizations.len(), 1);
    }

    #[tokio::test]
    async fn test_persistent_conflict_surfaces() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;
        store.inject_conflicts(MAX_WRITE_ATTEMPTS);

        let err = customize_plan(&store, plan.id, &substitution(plan.user_id, "React-1", 92.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let reloaded = store.get_plan(plan.id).await.unwrap().unwrap();
        assert!(reloaded.customizations.is_empty());
    }

    #[tokio::test]
    async fn test_customizations_accumulate_across_writes() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;

        customize_plan(&store, plan.id, &substitution(plan.user_id, "React-1", 92.0))
            .await
            .unwrap();
        let mut second = substitution(plan.user_id, "Node-0", 88.0);
        second.skill_id = "Node".to_string();
        second.new_content.id = "yt-def".to_string();
        customize_plan(&store, plan.id, &second).await.unwrap();

        let reloaded = store.get_plan(plan.id).await.unwrap().unwrap();
        let ids: Vec<&str> = reloaded
            .customizations
            .iter()
            .map(|c| c.new_content_id.as_str())
            .collect();
        assert_eq!(ids, vec!["yt-abc", "yt-def"]);
        assert_eq!(reloaded.version, 3);
    }

    #[tokio::test]
    async fn test_progress_update_is_persisted() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;

        let update = ProgressUpdate {
            user_id: plan.user_id,
            completed_video_ids: vec!["React-0".to_string(), "Node-0".to_string()],
            status: None,
            final_score: None,
        };
        let updated = update_progress(&store, plan.id, &update).await.unwrap();
        assert_eq!(updated.progress, 25.0);
        assert_eq!(updated.status, PlanStatus::Active);

        let reloaded = store.get_plan(plan.id).await.unwrap().unwrap();
        assert_eq!(reloaded.completed_video_ids, vec!["React-0", "Node-0"]);
    }

    #[tokio::test]
    async fn test_path_validation_uses_plan_skills() {
        let store = MemoryPlanStore::new();
        let plan = stored_plan(&store).await;

        let mut content = BTreeMap::new();
        content.insert("react".to_string(), vec![video("a", "React course", 60)]);
        let result = validate_custom_path(&store, plan.id, plan.user_id, &content)
            .await
            .unwrap();
        assert!(result.is_valid);
        assert_eq!(result.coverage_analysis.coverage_percentage, 50);
        assert_eq!(result.coverage_analysis.uncovered_skills, vec!["Node"]);
    }
}
