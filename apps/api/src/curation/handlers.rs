//! Axum route handlers for the Content API.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::curation::curator::ContentQuery;
use crate::curation::recommendations::{content_stats, enrich, ContentStats, Recommendation};
use crate::errors::AppError;
use crate::models::content::{ContentType, DifficultyLevel, SkillContent};
use crate::planning::synthesizer::{build_schedule, Schedule, MAX_DURATION_WEEKS};
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;
const DEFAULT_PREVIEW_WEEKS: u32 = 8;
/// Advertised to clients alongside recommendations.
const QUALITY_THRESHOLD: u32 = 70;
const RELEVANCE_THRESHOLD: u32 = 80;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub skill: Option<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub content_type: ContentType,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchMetadata {
    pub searched_at: DateTime<Utc>,
    pub quality_threshold: u32,
    pub relevance_threshold: u32,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub skill: String,
    pub difficulty: DifficultyLevel,
    pub content_type: ContentType,
    pub recommendations: Vec<Recommendation>,
    pub total_found: usize,
    pub search_metadata: SearchMetadata,
}

#[derive(Debug, Deserialize)]
pub struct CurateRequest {
    pub skills: Vec<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub content_type: ContentType,
    pub max_results_per_skill: Option<u32>,
    pub plan_duration: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CurateMetadata {
    pub total_videos: usize,
    pub skills_covered: usize,
    pub difficulty: DifficultyLevel,
    pub content_type: ContentType,
    pub plan_duration: u32,
    pub curated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CurateResponse {
    pub curated_content: Vec<SkillContent>,
    /// Schedule the content would produce. Not persisted.
    pub learning_path: Schedule,
    pub content_stats: ContentStats,
    pub metadata: CurateMetadata,
}

fn validate_limit(limit: Option<u32>, field: &str) -> Result<u32, AppError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(_) => Err(AppError::Validation(format!(
            "{field} must be between 1 and {MAX_LIMIT}"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/content/recommendations
///
/// Ranked videos for one skill, each with a user-facing metadata block.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationsQuery>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let skill = params
        .skill
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("skill parameter is required".to_string()))?
        .to_string();
    let limit = validate_limit(params.limit, "limit")?;

    info!("Getting content recommendations for '{skill}'");
    let videos = state
        .curator
        .search_educational_content(&ContentQuery {
            topic: skill.clone(),
            difficulty: params.difficulty,
            content_type: params.content_type,
            max_results: limit,
        })
        .await;

    let recommendations = enrich(videos, &skill);
    Ok(Json(RecommendationsResponse {
        total_found: recommendations.len(),
        skill,
        difficulty: params.difficulty,
        content_type: params.content_type,
        recommendations,
        search_metadata: SearchMetadata {
            searched_at: Utc::now(),
            quality_threshold: QUALITY_THRESHOLD,
            relevance_threshold: RELEVANCE_THRESHOLD,
        },
    }))
}

/// POST /api/v1/content/curate
///
/// Curates several skills at once and previews the schedule they would produce.
pub async fn handle_curate(
    State(state): State<AppState>,
    Json(request): Json<CurateRequest>,
) -> Result<Json<CurateResponse>, AppError> {
    let skills: Vec<String> = request
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if skills.is_empty() {
        return Err(AppError::Validation("skills cannot be empty".to_string()));
    }
    let per_skill = validate_limit(request.max_results_per_skill, "max_results_per_skill")?;
    let plan_duration = request.plan_duration.unwrap_or(DEFAULT_PREVIEW_WEEKS);
    if plan_duration == 0 || plan_duration > MAX_DURATION_WEEKS {
        return Err(AppError::Validation(format!(
            "plan_duration must be between 1 and {MAX_DURATION_WEEKS}"
        )));
    }

    let curated = state
        .curator
        .curate_skills(&skills, request.difficulty, request.content_type, per_skill)
        .await;
    let stats = content_stats(&curated);
    let learning_path = build_schedule(&curated, plan_duration, &state.pacing);
    info!(
        "Content curation completed: {} videos across {} skills",
        stats.total_videos,
        skills.len()
    );

    Ok(Json(CurateResponse {
        metadata: CurateMetadata {
            total_videos: stats.total_videos,
            skills_covered: skills.len(),
            difficulty: request.difficulty,
            content_type: request.content_type,
            plan_duration,
            curated_at: Utc::now(),
        },
        curated_content: curated,
        learning_path,
        content_stats: stats,
    }))
}
