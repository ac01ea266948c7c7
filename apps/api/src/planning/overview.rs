//! Plan overview narrative. Generated by the text provider when configured, with a
//! templated overview whenever the provider is absent, fails, or returns something
//! that doesn't fit the plan.

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::models::job::JobContext;
use crate::models::plan::{
    IntensityTier, LearningPlan, OverviewHeader, OverviewResources, OverviewSkillGaps,
    OverviewSource, PlanOverview, WeekObjective,
};
use crate::planning::prompts::{overview_prompt, overview_system};

const MAX_CRITICAL_SKILLS: usize = 5;
const MAX_COURSES: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum OverviewRejection {
    #[error("overview title is empty")]
    EmptyTitle,
    #[error("weekly plan is empty")]
    EmptyWeeklyPlan,
    #[error("weekly plan has {got} weeks, plan has {expected}")]
    WeekCountMismatch { got: usize, expected: usize },
    #[error("week {0} is outside the plan")]
    WeekOutOfRange(u32),
}

/// Structural checks on a provider overview against the plan it describes.
pub fn validate_overview(
    overview: &PlanOverview,
    plan: &LearningPlan,
) -> Result<(), OverviewRejection> {
    if overview.overview.title.trim().is_empty() {
        return Err(OverviewRejection::EmptyTitle);
    }
    if overview.weekly_plan.is_empty() {
        return Err(OverviewRejection::EmptyWeeklyPlan);
    }
    let expected = plan.weekly_schedule.len();
    if overview.weekly_plan.len() > expected.max(1) {
        return Err(OverviewRejection::WeekCountMismatch {
            got: overview.weekly_plan.len(),
            expected,
        });
    }
    if let Some(bad) = overview
        .weekly_plan
        .iter()
        .find(|w| w.week == 0 || w.week > plan.duration_weeks)
    {
        return Err(OverviewRejection::WeekOutOfRange(bad.week));
    }
    Ok(())
}

fn strategy_for(tier: IntensityTier) -> &'static str {
    match tier {
        IntensityTier::Intensive => {
            "Crash-course pacing: cover the job-critical fundamentals of each skill first \
             and finish every block with a working demo."
        }
        IntensityTier::Moderate => {
            "Balanced pacing: build a solid foundation for each skill, then reinforce it \
             with guided exercises and a mini-project."
        }
        IntensityTier::Comprehensive => {
            "Deep pacing: progress from foundations to advanced topics for each skill \
             and finish with portfolio-ready projects."
        }
    }
}

/// Deterministic overview built from the plan itself.
pub fn template_overview(job: &JobContext, plan: &LearningPlan) -> PlanOverview {
    let mut courses: Vec<String> = Vec::new();
    for video in plan.all_videos() {
        if courses.len() == MAX_COURSES {
            break;
        }
        if !courses.contains(&video.title) {
            courses.push(video.title.clone());
        }
    }

    PlanOverview {
        overview: OverviewHeader {
            title: format!(
                "Learning Plan for {} at {}",
                job.job_title, job.company_name
            ),
            duration: format!("{} weeks ({})", plan.duration_weeks, plan.intensity),
            hours: format!(
                "{}-{} hours per week",
                plan.weekly_hours_target.min, plan.weekly_hours_target.max
            ),
            description: Some(format!(
                "{} videos across {} weeks, about {} hours in total.",
                plan.total_videos,
                plan.weekly_schedule.len(),
                plan.total_hours
            )),
        },
        skill_gaps: OverviewSkillGaps {
            critical: plan
                .required_skills
                .iter()
                .take(MAX_CRITICAL_SKILLS)
                .cloned()
                .collect(),
            strategy: strategy_for(plan.intensity).to_string(),
        },
        weekly_plan: plan
            .weekly_schedule
            .iter()
            .map(|w| WeekObjective {
                week: w.week,
                title: w.focus.clone(),
                objectives: w.milestones.clone(),
                key_areas: w.skills.clone(),
            })
            .collect(),
        resources: OverviewResources {
            courses,
            books: Vec::new(),
        },
        source: OverviewSource::Template,
    }
}

/// Provider overview when available and valid, template otherwise. Never fails.
pub async fn generate_overview(
    llm: Option<&LlmClient>,
    job: &JobContext,
    plan: &LearningPlan,
) -> PlanOverview {
    let Some(llm) = llm else {
        return template_overview(job, plan);
    };

    let prompt = overview_prompt(job, plan);
    match llm.call_json::<PlanOverview>(&prompt, &overview_system()).await {
        Ok(mut overview) => match validate_overview(&overview, plan) {
            Ok(()) => {
                info!("Generated overview for plan {}", plan.id);
                overview.source = OverviewSource::Generated;
                overview
            }
            Err(rejection) => {
                warn!("Discarding generated overview for plan {}: {rejection}", plan.id);
                template_overview(job, plan)
            }
        },
        Err(e) => {
            warn!("Overview generation failed for plan {}, using template: {e}", plan.id);
            template_overview(job, plan)
        }
    }
}
