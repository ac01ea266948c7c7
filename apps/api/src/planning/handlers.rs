//! Axum route handlers for plan generation, retrieval and export.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::plan::LearningPlan;
use crate::planning::export::{export_plan, PlanExport};
use crate::planning::generator::{generate_plan, GeneratePlanRequest, GeneratePlanResponse};
use crate::state::AppState;
use crate::store::load_owned_plan;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/learning-paths/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GeneratePlanRequest>,
) -> Result<Json<GeneratePlanResponse>, AppError> {
    let response = generate_plan(
        state.store.as_ref(),
        &state.curator,
        state.llm.as_ref(),
        &state.pacing,
        &request,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/learning-paths/:id
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<LearningPlan>, AppError> {
    let plan = load_owned_plan(state.store.as_ref(), plan_id, params.user_id).await?;
    Ok(Json(plan))
}

/// POST /api/v1/learning-paths/:id/export
///
/// Renders the current version of the plan to markdown and stores it.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<PlanExport>, AppError> {
    let plan = load_owned_plan(state.store.as_ref(), plan_id, request.user_id).await?;
    let export = export_plan(&state.s3, &state.config.s3_bucket, &plan).await?;
    Ok(Json(export))
}
