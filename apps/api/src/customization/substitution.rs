//! Single-video substitutions.
//!
//! A substitution is checked on its own merits first. Rejected ones never touch the
//! plan; accepted ones swap the video into its week, append a `Customization` and
//! refresh plan totals.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::VideoContent;
use crate::models::plan::{round1, Customization, LearningPlan, SubstitutionValidation};

/// Replacements below this relevance are rejected outright.
pub const MIN_RELEVANCE: f64 = 70.0;
const MIN_DIFFICULTY: f64 = 60.0;
const MIN_DURATION_MINUTES: f64 = 5.0;
const DEFAULT_REASON: &str = "User preference";

#[derive(Debug, Clone, Deserialize)]
pub struct SubstitutionRequest {
    pub user_id: Uuid,
    pub skill_id: String,
    /// Video being replaced. Absent means the new video is added to the skill.
    #[serde(default)]
    pub original_content_id: Option<String>,
    pub new_content: VideoContent,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Checks `new` against the content-quality rules and measures it against
/// the video it replaces.
pub fn validate_substitution(
    original: Option<&VideoContent>,
    new: &VideoContent,
) -> SubstitutionValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if new.relevance_score < MIN_RELEVANCE {
        errors.push(format!(
            "New content relevance ({}) is too low for effective learning; at least {MIN_RELEVANCE} is required",
            new.relevance_score
        ));
    }
    if new.difficulty_score < MIN_DIFFICULTY {
        warnings.push("New content may be too easy for the learning objective".to_string());
    }
    if new.duration_minutes() < MIN_DURATION_MINUTES {
        warnings.push(
            "New content may be too short to cover the topic adequately".to_string(),
        );
    }

    let (difficulty_change, estimated_time_change) = match original {
        Some(original) => (
            round1(new.difficulty_score - original.difficulty_score),
            new.estimated_completion_time as i64 - original.estimated_completion_time as i64,
        ),
        None => (0.0, new.estimated_completion_time as i64),
    };

    SubstitutionValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        difficulty_change,
        estimated_time_change,
    }
}

fn skill_matches(slot_skills: &[String], skill_id: &str) -> bool {
    let skill_id = skill_id.trim().to_lowercase();
    slot_skills.iter().any(|s| s.to_lowercase() == skill_id)
}

/// Places `new_content` into the schedule and records the customization.
///
/// The original video is replaced in its own week, which must belong to the
/// requested skill. Without an original, the video joins the last week of the
/// skill's block. `validation` must be the accepted
/// result of [`validate_substitution`].
pub fn apply_substitution(
    plan: &mut LearningPlan,
    request: &SubstitutionRequest,
    validation: SubstitutionValidation,
) -> Result<Customization, AppError> {
    let new_content = &request.new_content;
    if new_content.id.trim().is_empty() {
        return Err(AppError::Validation("new_content.id cannot be empty".to_string()));
    }
    let replaces_itself = request.original_content_id.as_deref() == Some(new_content.id.as_str());
    if !replaces_itself && plan.find_video(&new_content.id).is_some() {
        return Err(AppError::Validation(format!(
            "Content {} is already part of this plan",
            new_content.id
        )));
    }

    match request.original_content_id.as_deref() {
        Some(original_id) => {
            let in_plan = plan.find_video(original_id).is_some();
            let slot_video = plan
                .weekly_schedule
                .iter_mut()
                .filter(|w| skill_matches(&w.skills, &request.skill_id))
                .flat_map(|w| w.videos.iter_mut())
                .find(|v| v.id == original_id);
            match slot_video {
                Some(slot_video) => *slot_video = new_content.clone(),
                None if in_plan => {
                    return Err(AppError::Validation(format!(
                        "Content {original_id} is not scheduled under skill '{}'",
                        request.skill_id
                    )))
                }
                None => {
                    return Err(AppError::NotFound(format!(
                        "Content {original_id} not found in plan"
                    )))
                }
            }
        }
        None => {
            let slot = plan
                .weekly_schedule
                .iter_mut()
                .rev()
                .find(|w| skill_matches(&w.skills, &request.skill_id))
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "Skill '{}' is not scheduled in this plan",
                        request.skill_id
                    ))
                })?;
            slot.videos.push(new_content.clone());
        }
    }

    let customization = Customization {
        id: Uuid::new_v4(),
        skill_id: request.skill_id.trim().to_string(),
        original_content_id: request.original_content_id.clone(),
        new_content_id: new_content.id.clone(),
        new_content: new_content.clone(),
        reason: request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REASON)
            .to_string(),
        validation_result: validation,
        created_at: Utc::now(),
    };

    plan.customizations.push(customization.clone());
    plan.is_customized = true;
    plan.recompute_totals();
    Ok(customization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::pacing::PacingConfig;
    use crate::planning::synthesizer::build_plan;
    use crate::planning::synthesizer::tests::{gaps, skill_content, video};

    fn plan() -> LearningPlan {
        build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &gaps(&["React"]),
            &[skill_content("React", 8)],
            4,
            &PacingConfig::default(),
        )
        .unwrap()
    }

    fn replacement(relevance: f64, difficulty: f64, minutes: u32) -> VideoContent {
        let mut v = video("new-1", "React hooks deep dive", minutes);
        v.relevance_score = relevance;
        v.difficulty_score = difficulty;
        v
    }

    fn request(original: Option<&str>, new_content: VideoContent) -> SubstitutionRequest {
        SubstitutionRequest {
            user_id: Uuid::new_v4(),
            skill_id: "React".to_string(),
            original_content_id: original.map(str::to_string),
            new_content,
            reason: None,
        }
    }

    #[test]
    fn test_low_relevance_is_rejected() {
        let result = validate_substitution(None, &replacement(69.9, 80.0, 30));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_relevance_threshold_is_inclusive() {
        assert!(validate_substitution(None, &replacement(70.0, 80.0, 30)).is_valid);
    }

    #[test]
    fn test_easy_or_short_content_only_warns() {
        let result = validate_substitution(None, &replacement(90.0, 50.0, 4));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_deltas_measured_against_original() {
        let original = video("old", "React intro", 60);
        let new = replacement(90.0, 95.0, 30);
        let result = validate_substitution(Some(&original), &new);
        assert_eq!(result.difficulty_change, 15.0);
        assert_eq!(result.estimated_time_change, 36 - 72);
    }

    #[test]
    fn test_replacement_swaps_video_in_its_week() {
        let mut plan = plan();
        let before_videos = plan.total_videos;
        let new = replacement(90.0, 80.0, 30);
        let req = request(Some("React-2"), new.clone());
        let validation = validate_substitution(plan.find_video("React-2"), &new);

        let customization = apply_substitution(&mut plan, &req, validation).unwrap();
        assert_eq!(customization.original_content_id.as_deref(), Some("React-2"));
        assert_eq!(customization.reason, DEFAULT_REASON);
        assert_eq!(plan.weekly_schedule[1].videos[0].id, "new-1");
        assert!(plan.find_video("React-2").is_none());
        assert_eq!(plan.total_videos, before_videos);
        assert!(plan.is_customized);
        assert_eq!(plan.customizations.len(), 1);
    }

    #[test]
    fn test_addition_joins_last_week_of_skill() {
        let mut plan = plan();
        let new = replacement(90.0, 80.0, 30);
        let validation = validate_substitution(None, &new);
        apply_substitution(&mut plan, &request(None, new), validation).unwrap();

        assert_eq!(plan.total_videos, 9);
        assert_eq!(plan.weekly_schedule[3].videos.last().unwrap().id, "new-1");
    }

    #[test]
    fn test_unknown_original_is_not_found() {
        let mut plan = plan();
        let new = replacement(90.0, 80.0, 30);
        let validation = validate_substitution(None, &new);
        let err = apply_substitution(&mut plan, &request(Some("missing"), new), validation)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(plan.customizations.is_empty());
    }

    #[test]
    fn test_duplicate_content_is_rejected() {
        let mut plan = plan();
        let new = video("React-5", "React tutorial 5", 60);
        let validation = validate_substitution(None, &new);
        let err = apply_substitution(&mut plan, &request(Some("React-0"), new), validation)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_original_from_another_skill_is_rejected() {
        let mut plan = build_plan(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &gaps(&["React", "Node"]),
            &[skill_content("React", 8), skill_content("Node", 8)],
            8,
            &PacingConfig::default(),
        )
        .unwrap();
        let new = replacement(90.0, 80.0, 30);
        let validation = validate_substitution(plan.find_video("Node-0"), &new);

        let err = apply_substitution(&mut plan, &request(Some("Node-0"), new), validation)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(plan.find_video("Node-0").is_some());
        assert!(plan.find_video("new-1").is_none());
        assert!(plan.customizations.is_empty());
    }

    #[test]
    fn test_unscheduled_skill_is_rejected() {
        let mut plan = plan();
        let new = replacement(90.0, 80.0, 30);
        let validation = validate_substitution(None, &new);
        let mut req = request(None, new);
        req.skill_id = "Haskell".to_string();
        assert!(apply_substitution(&mut plan, &req, validation).is_err());
    }
}
