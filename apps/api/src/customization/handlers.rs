//! Axum route handlers for plan customization, path validation and progress.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::customization::path_validation::PathValidation;
use crate::customization::progress::ProgressUpdate;
use crate::customization::service::{
    customize_plan, update_progress, validate_custom_path, CustomizationOutcome,
};
use crate::customization::substitution::SubstitutionRequest;
use crate::errors::AppError;
use crate::models::content::VideoContent;
use crate::models::plan::PlanStatus;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidatePathRequest {
    pub user_id: Uuid,
    /// Skill name → the videos the user wants to study for it.
    pub customized_content: BTreeMap<String, Vec<VideoContent>>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub plan_id: Uuid,
    pub progress: f64,
    pub status: PlanStatus,
    pub completed_video_ids: Vec<String>,
    pub final_score: Option<f64>,
    pub version: i32,
}

/// POST /api/v1/learning-paths/:id/customize
pub async fn handle_customize(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<SubstitutionRequest>,
) -> Result<Json<CustomizationOutcome>, AppError> {
    let outcome = customize_plan(state.store.as_ref(), plan_id, &request).await?;
    Ok(Json(outcome))
}

/// PUT /api/v1/learning-paths/:id/validate
pub async fn handle_validate_path(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<ValidatePathRequest>,
) -> Result<Json<PathValidation>, AppError> {
    let result = validate_custom_path(
        state.store.as_ref(),
        plan_id,
        request.user_id,
        &request.customized_content,
    )
    .await?;
    Ok(Json(result))
}

/// PATCH /api/v1/learning-paths/:id/progress
pub async fn handle_progress(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<ProgressResponse>, AppError> {
    let plan = update_progress(state.store.as_ref(), plan_id, &update).await?;
    Ok(Json(ProgressResponse {
        plan_id: plan.id,
        progress: plan.progress,
        status: plan.status,
        completed_video_ids: plan.completed_video_ids,
        final_score: plan.final_score,
        version: plan.version,
    }))
}
