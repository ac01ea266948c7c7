//! Week-by-week schedule construction.
//!
//! Each skill gets a contiguous block of `max(1, duration / skill_count)` weeks.
//! Videos are taken in curator rank order and dealt out `videos_per_week` at a
//! time. A single global week pointer guarantees weeks stay contiguous from 1 and
//! never run past the plan duration; skills that don't fit are dropped.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{SkillContent, SkillGap, VideoContent};
use crate::models::plan::{round1, HoursRange, IntensityTier, LearningPlan, PlanStatus, WeekSlot};
use crate::planning::pacing::{PacingConfig, TierPacing};

/// Longest plan the engine will build.
pub const MAX_DURATION_WEEKS: u32 = 52;

const ADVANCED_TITLE_MARKERS: &[&str] = &["advanced", "expert", "complex"];

#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub intensity: IntensityTier,
    pub weekly_hours_target: HoursRange,
    pub weeks: Vec<WeekSlot>,
}

pub fn focus_label(skill: &str, block_pos: u32, weeks_per_skill: u32) -> String {
    if block_pos == 0 {
        format!("{skill} Fundamentals")
    } else if block_pos + 1 == weeks_per_skill {
        format!("{skill} Advanced Topics")
    } else {
        format!("{skill} Practical Application")
    }
}

fn milestones(
    skill: &str,
    block_pos: u32,
    weeks_per_skill: u32,
    pacing: &TierPacing,
) -> Vec<String> {
    let mut milestones = if block_pos == 0 {
        vec![
            format!("Understand {skill} fundamentals"),
            format!("Set up {skill} development environment"),
        ]
    } else if block_pos + 1 == weeks_per_skill {
        vec![
            format!("Complete {skill} project"),
            format!("Demonstrate {skill} proficiency"),
        ]
    } else {
        vec![
            format!("Apply {skill} in practical exercises"),
            format!("Build {skill} mini-project"),
        ]
    };
    if block_pos + 1 == weeks_per_skill {
        milestones.push(pacing.closing_milestone.replace("{skill}", skill));
    }
    milestones
}

fn completion_criteria(skill: &str, videos: usize, closes_block: bool) -> Vec<String> {
    let mut criteria = vec![
        format!("Watch all {videos} assigned videos"),
        format!("Write notes on the key {skill} concepts covered"),
    ];
    if closes_block {
        criteria.push(format!("Build a working {skill} demo"));
    }
    criteria
}

fn week_hours(videos: &[VideoContent]) -> f64 {
    let minutes: u64 = videos
        .iter()
        .map(|v| v.estimated_completion_time as u64)
        .sum();
    round1(minutes as f64 / 60.0)
}

/// Builds the schedule only. Used directly for curation previews.
pub fn build_schedule(
    content: &[SkillContent],
    duration_weeks: u32,
    pacing: &PacingConfig,
) -> Schedule {
    let intensity = pacing.tier_for(duration_weeks);
    let tier = pacing.pacing(intensity);
    let per_week = tier.videos_per_week.max(1);
    let skill_count = content.len().max(1) as u32;
    let weeks_per_skill = (duration_weeks / skill_count).max(1);

    let mut weeks = Vec::new();
    let mut current_week = 1u32;

    for skill_content in content {
        if skill_content.videos.is_empty() {
            continue;
        }
        let skill = skill_content.skill.as_str();
        let take = (weeks_per_skill as usize * per_week).min(skill_content.videos.len());
        let mut chunks = skill_content.videos[..take].chunks(per_week);

        for block_pos in 0..weeks_per_skill {
            if current_week > duration_weeks {
                break;
            }
            let Some(chunk) = chunks.next() else {
                break;
            };
            let closes_block = block_pos + 1 == weeks_per_skill;
            weeks.push(WeekSlot {
                week: current_week,
                skills: vec![skill.to_string()],
                focus: focus_label(skill, block_pos, weeks_per_skill),
                videos: chunk.to_vec(),
                estimated_hours: week_hours(chunk),
                milestones: milestones(skill, block_pos, weeks_per_skill, tier),
                completion_criteria: completion_criteria(skill, chunk.len(), closes_block),
            });
            current_week += 1;
        }
    }

    Schedule {
        intensity,
        weekly_hours_target: tier.weekly_hours,
        weeks,
    }
}

/// Content difficulty on a 1 – 10 scale: one point per three videos, +2 when any
/// title signals advanced material.
pub fn schedule_difficulty(weeks: &[WeekSlot]) -> f64 {
    let videos: Vec<&VideoContent> = weeks.iter().flat_map(|w| w.videos.iter()).collect();
    let mut difficulty = (videos.len() as f64 / 3.0).clamp(1.0, 10.0);
    let advanced = videos.iter().any(|v| {
        let title = v.title.to_lowercase();
        ADVANCED_TITLE_MARKERS.iter().any(|m| title.contains(m))
    });
    if advanced {
        difficulty += 2.0;
    }
    round1(difficulty.min(10.0))
}

/// Builds a complete plan for `gaps`, using `content` in the same skill order.
pub fn build_plan(
    user_id: Uuid,
    job_id: Uuid,
    gaps: &[SkillGap],
    content: &[SkillContent],
    duration_weeks: u32,
    pacing: &PacingConfig,
) -> Result<LearningPlan, AppError> {
    if duration_weeks == 0 || duration_weeks > MAX_DURATION_WEEKS {
        return Err(AppError::Validation(format!(
            "duration_weeks must be between 1 and {MAX_DURATION_WEEKS}"
        )));
    }
    if gaps.is_empty() {
        return Err(AppError::Validation(
            "At least one target skill is required".to_string(),
        ));
    }

    let schedule = build_schedule(content, duration_weeks, pacing);
    let now = Utc::now();

    let mut plan = LearningPlan {
        id: Uuid::new_v4(),
        user_id,
        job_id,
        duration_weeks,
        intensity: schedule.intensity,
        weekly_hours_target: schedule.weekly_hours_target,
        required_skills: gaps.iter().map(|g| g.skill.clone()).collect(),
        content_difficulty: schedule_difficulty(&schedule.weeks),
        weekly_schedule: schedule.weeks,
        total_videos: 0,
        total_hours: 0.0,
        overview: None,
        customizations: Vec::new(),
        is_customized: false,
        status: PlanStatus::Active,
        progress: 0.0,
        completed_video_ids: Vec::new(),
        final_score: None,
        version: 1,
        created_at: now,
        updated_at: now,
    };
    plan.recompute_totals();
    Ok(plan)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn video(id: &str, title: &str, minutes: u32) -> VideoContent {
        VideoContent {
            id: id.to_string(),
            title: title.to_string(),
            channel: "freeCodeCamp.org".to_string(),
            duration_secs: minutes * 60,
            view_count: 1000,
            url: None,
            quality_score: 80.0,
            relevance_score: 90.0,
            difficulty_score: 80.0,
            estimated_completion_time: (minutes as f64 * 1.2).ceil() as u32,
            overall_score: 50.0,
            quality_indicators: vec![],
            synthetic: false,
        }
    }

    pub(crate) fn skill_content(skill: &str, count: usize) -> SkillContent {
        SkillContent {
            skill: skill.to_string(),
            videos: (0..count)
                .map(|i| video(&format!("{skill}-{i}"), &format!("{skill} tutorial {i}"), 60))
                .collect(),
        }
    }

    pub(crate) fn gaps(skills: &[&str]) -> Vec<SkillGap> {
        skills
            .iter()
            .enumerate()
            .map(|(i, s)| SkillGap {
                skill: s.to_string(),
                required_level: 3,
                current_level: 0,
                priority: i as u32 + 1,
            })
            .collect()
    }

    #[test]
    fn test_weeks_never_exceed_duration() {
        let pacing = PacingConfig::default();
        let content = vec![
            skill_content("React", 20),
            skill_content("Node", 20),
            skill_content("SQL", 20),
        ];
        for duration in [2, 4, 8, 12, 16] {
            let schedule = build_schedule(&content, duration, &pacing);
            assert!(!schedule.weeks.is_empty(), "duration {duration}");
            assert!(schedule.weeks.len() as u32 <= duration, "duration {duration}");
            for (i, slot) in schedule.weeks.iter().enumerate() {
                assert_eq!(slot.week, i as u32 + 1);
            }
        }
    }

    #[test]
    fn test_react_four_week_intensive() {
        let pacing = PacingConfig::default();
        let plan = build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &gaps(&["React"]),
            &[skill_content("React", 10)],
            4,
            &pacing,
        )
        .unwrap();

        assert_eq!(plan.intensity, IntensityTier::Intensive);
        assert_eq!(plan.weekly_hours_target, HoursRange { min: 15.0, max: 20.0 });
        assert_eq!(plan.weekly_schedule.len(), 4);
        for slot in &plan.weekly_schedule {
            assert_eq!(slot.videos.len(), 2);
        }
        let week1 = &plan.weekly_schedule[0];
        assert!(week1.focus.contains("Fundamentals"));
        assert!(week1
            .milestones
            .contains(&"Set up React development environment".to_string()));
        assert!(week1
            .milestones
            .contains(&"Understand React fundamentals".to_string()));
    }

    #[test]
    fn test_focus_labels_follow_block_position() {
        let pacing = PacingConfig::default();
        let schedule = build_schedule(&[skill_content("Go", 24)], 8, &pacing);
        let focus: Vec<&str> = schedule.weeks.iter().map(|w| w.focus.as_str()).collect();
        assert_eq!(focus[0], "Go Fundamentals");
        assert_eq!(focus[1], "Go Practical Application");
        assert_eq!(focus[7], "Go Advanced Topics");
        assert!(schedule.weeks[7]
            .milestones
            .contains(&"Finish the guided Go exercises".to_string()));
    }

    #[test]
    fn test_skills_without_content_are_skipped() {
        let pacing = PacingConfig::default();
        let content = vec![
            skill_content("Docker", 0),
            skill_content("Kubernetes", 6),
        ];
        let schedule = build_schedule(&content, 6, &pacing);
        assert!(schedule.weeks.iter().all(|w| w.skills == vec!["Kubernetes"]));
        assert_eq!(schedule.weeks[0].week, 1);
    }

    #[test]
    fn test_more_skills_than_weeks() {
        let pacing = PacingConfig::default();
        let content = vec![
            skill_content("A", 4),
            skill_content("B", 4),
            skill_content("C", 4),
        ];
        let schedule = build_schedule(&content, 2, &pacing);
        assert_eq!(schedule.weeks.len(), 2);
        assert_eq!(schedule.weeks[1].skills, vec!["B"]);
    }

    #[test]
    fn test_totals_are_sums_over_weeks() {
        let pacing = PacingConfig::default();
        let plan = build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &gaps(&["Rust", "SQL"]),
            &[skill_content("Rust", 9), skill_content("SQL", 9)],
            8,
            &pacing,
        )
        .unwrap();

        let videos: usize = plan.weekly_schedule.iter().map(|w| w.videos.len()).sum();
        assert_eq!(plan.total_videos as usize, videos);
        // 18 videos × 72 min
        assert_eq!(plan.total_hours, 21.6);
        assert_eq!(plan.weekly_schedule[0].estimated_hours, 3.6);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let pacing = PacingConfig::default();
        for duration in [0, MAX_DURATION_WEEKS + 1] {
            let err = build_plan(
                Uuid::new_v4(),
                Uuid::new_v4(),
                &gaps(&["Rust"]),
                &[skill_content("Rust", 3)],
                duration,
                &pacing,
            )
            .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn test_no_skills_rejected() {
        let err = build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &[],
            &[],
            4,
            &PacingConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_schedule_difficulty_bumps_for_advanced_titles() {
        let mut slot_videos = vec![video("a", "Intro", 30), video("b", "Basics", 30)];
        let base = schedule_difficulty(&[slot(slot_videos.clone())]);
        assert_eq!(base, 1.0);
        slot_videos.push(video("c", "Advanced Patterns", 30));
        assert_eq!(schedule_difficulty(&[slot(slot_videos)]), 3.0);
    }

    fn slot(videos: Vec<VideoContent>) -> WeekSlot {
        WeekSlot {
            week: 1,
            skills: vec!["x".to_string()],
            focus: "x".to_string(),
            videos,
            estimated_hours: 0.0,
            milestones: vec![],
            completion_criteria: vec![],
        }
    }
}
