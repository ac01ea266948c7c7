use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::plan::{round1, LearningPlan, PlanStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressUpdate {
    pub user_id: Uuid,
    /// Newly finished videos. Merged with what the plan already records.
    #[serde(default)]
    pub completed_video_ids: Vec<String>,
    /// `completed` or `failed` closes the plan. Finishing every video also completes it.
    #[serde(default)]
    pub status: Option<PlanStatus>,
    /// 0.0 – 1.0, recorded when the plan closes.
    #[serde(default)]
    pub final_score: Option<f64>,
}

/// Applies a progress update to an active plan.
pub fn apply_progress(plan: &mut LearningPlan, update: &ProgressUpdate) -> Result<(), AppError> {
    if plan.status.is_finished() {
        return Err(AppError::Validation(format!(
            "Plan {} is already {}",
            plan.id,
            plan.status.as_str()
        )));
    }
    if let Some(score) = update.final_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(AppError::Validation(
                "final_score must be between 0.0 and 1.0".to_string(),
            ));
        }
    }

    let unknown: Vec<&str> = update
        .completed_video_ids
        .iter()
        .map(String::as_str)
        .filter(|id| plan.find_video(id).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Validation(format!(
            "Videos not in plan: {}",
            unknown.join(", ")
        )));
    }

    for id in &update.completed_video_ids {
        if !plan.completed_video_ids.contains(id) {
            plan.completed_video_ids.push(id.clone());
        }
    }
    // Substitutions can remove videos that were already marked done.
    let scheduled: Vec<String> = plan.all_videos().map(|v| v.id.clone()).collect();
    plan.completed_video_ids.retain(|id| scheduled.contains(id));

    plan.progress = if plan.total_videos > 0 {
        round1((plan.completed_video_ids.len() as f64 / plan.total_videos as f64 * 100.0).min(100.0))
    } else {
        0.0
    };

    let next_status = match update.status {
        Some(PlanStatus::Failed) => PlanStatus::Failed,
        Some(PlanStatus::Completed) => PlanStatus::Completed,
        _ if plan.total_videos > 0 && plan.progress >= 100.0 => PlanStatus::Completed,
        _ => PlanStatus::Active,
    };
    if next_status.is_finished() {
        plan.status = next_status;
        plan.final_score = update.final_score;
    }
    Ok(())
}
