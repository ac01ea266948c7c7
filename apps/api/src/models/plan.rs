use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::content::VideoContent;

/// Pacing strategy, chosen from plan duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityTier {
    Intensive,
    Moderate,
    Comprehensive,
}

impl IntensityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityTier::Intensive => "intensive",
            IntensityTier::Moderate => "moderate",
            IntensityTier::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for IntensityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntensityTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intensive" => Ok(IntensityTier::Intensive),
            "moderate" => Ok(IntensityTier::Moderate),
            "comprehensive" => Ok(IntensityTier::Comprehensive),
            other => Err(anyhow::anyhow!("Unknown intensity tier '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Active,
    Completed,
    Failed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, PlanStatus::Active)
    }
}

impl FromStr for PlanStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PlanStatus::Active),
            "completed" => Ok(PlanStatus::Completed),
            "failed" => Ok(PlanStatus::Failed),
            other => Err(anyhow::anyhow!("Unknown plan status '{other}'")),
        }
    }
}

/// Target weekly study hours for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoursRange {
    pub min: f64,
    pub max: f64,
}

/// One week of the schedule.
///
/// Weeks are numbered contiguously from 1 and never exceed the plan duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSlot {
    pub week: u32,
    pub skills: Vec<String>,
    pub focus: String,
    pub videos: Vec<VideoContent>,
    pub estimated_hours: f64,
    pub milestones: Vec<String>,
    pub completion_criteria: Vec<String>,
}

/// Outcome of validating a single content substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// New minus original difficulty score (0 – 100 scale).
    pub difficulty_change: f64,
    /// New minus original estimated completion time, in minutes.
    pub estimated_time_change: i64,
}

/// An accepted content substitution. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub id: Uuid,
    pub skill_id: String,
    pub original_content_id: Option<String>,
    pub new_content_id: String,
    pub new_content: VideoContent,
    pub reason: String,
    pub validation_result: SubstitutionValidation,
    pub created_at: DateTime<Utc>,
}

/// Where a plan overview came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewSource {
    Generated,
    #[default]
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewHeader {
    pub title: String,
    pub duration: String,
    pub hours: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewSkillGaps {
    pub critical: Vec<String>,
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekObjective {
    pub week: u32,
    pub title: String,
    pub objectives: Vec<String>,
    pub key_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewResources {
    pub courses: Vec<String>,
    pub books: Vec<String>,
}

/// Free-form plan narrative. Generated by the text provider when available,
/// otherwise built from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOverview {
    pub overview: OverviewHeader,
    pub skill_gaps: OverviewSkillGaps,
    pub weekly_plan: Vec<WeekObjective>,
    pub resources: OverviewResources,
    #[serde(default)]
    pub source: OverviewSource,
}

/// A candidate's learning plan for one job. Exclusively owned by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub duration_weeks: u32,
    pub intensity: IntensityTier,
    pub weekly_hours_target: HoursRange,
    /// Skills from the gap analysis. Coverage validation is measured against these.
    pub required_skills: Vec<String>,
    pub weekly_schedule: Vec<WeekSlot>,
    pub total_videos: u32,
    pub total_hours: f64,
    /// 1 – 10 scale. Feeds the payout calculator.
    pub content_difficulty: f64,
    pub overview: Option<PlanOverview>,
    pub customizations: Vec<Customization>,
    pub is_customized: bool,
    pub status: PlanStatus,
    /// Percentage, 0 – 100.
    pub progress: f64,
    pub completed_video_ids: Vec<String>,
    pub final_score: Option<f64>,
    /// Optimistic concurrency token. Bumped by the store on every successful write.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningPlan {
    /// Recomputes per-week hours and plan totals from the assigned videos.
    pub fn recompute_totals(&mut self) {
        let mut total_minutes = 0u64;
        let mut total_videos = 0u32;
        for slot in &mut self.weekly_schedule {
            let minutes: u64 = slot
                .videos
                .iter()
                .map(|v| v.estimated_completion_time as u64)
                .sum();
            slot.estimated_hours = round1(minutes as f64 / 60.0);
            total_minutes += minutes;
            total_videos += slot.videos.len() as u32;
        }
        self.total_videos = total_videos;
        self.total_hours = round1(total_minutes as f64 / 60.0);
    }

    /// Every video currently scheduled, in week order.
    pub fn all_videos(&self) -> impl Iterator<Item = &VideoContent> {
        self.weekly_schedule.iter().flat_map(|w| w.videos.iter())
    }

    pub fn find_video(&self, content_id: &str) -> Option<&VideoContent> {
        self.all_videos().find(|v| v.id == content_id)
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Row mapping
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, FromRow)]
pub struct LearningPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub duration_weeks: i32,
    pub intensity: String,
    pub weekly_hours_min: f64,
    pub weekly_hours_max: f64,
    pub required_skills: Vec<String>,
    pub weekly_schedule: Json<Vec<WeekSlot>>,
    pub total_videos: i32,
    pub total_hours: f64,
    pub content_difficulty: f64,
    pub overview: Option<Json<PlanOverview>>,
    pub customizations: Json<Vec<Customization>>,
    pub is_customized: bool,
    pub status: String,
    pub progress: f64,
    pub completed_video_ids: Vec<String>,
    pub final_score: Option<f64>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LearningPlanRow> for LearningPlan {
    type Error = anyhow::Error;

    fn try_from(row: LearningPlanRow) -> Result<Self, Self::Error> {
        Ok(LearningPlan {
            id: row.id,
            user_id: row.user_id,
            job_id: row.job_id,
            duration_weeks: u32::try_from(row.duration_weeks)?,
            intensity: row.intensity.parse()?,
            weekly_hours_target: HoursRange {
                min: row.weekly_hours_min,
                max: row.weekly_hours_max,
            },
            required_skills: row.required_skills,
            weekly_schedule: row.weekly_schedule.0,
            total_videos: u32::try_from(row.total_videos)?,
            total_hours: row.total_hours,
            content_difficulty: row.content_difficulty,
            overview: row.overview.map(|o| o.0),
            customizations: row.customizations.0,
            is_customized: row.is_customized,
            status: row.status.parse()?,
            progress: row.progress,
            completed_video_ids: row.completed_video_ids,
            final_score: row.final_score,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
