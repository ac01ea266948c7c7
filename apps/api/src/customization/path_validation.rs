//! Whole-path validation for a user-assembled content map.
//!
//! Coverage is advisory: only a path with no content at all is invalid. Everything
//! else comes back as warnings and recommendations.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::content::VideoContent;
use crate::models::plan::round1;

const MIN_TOTAL_HOURS: f64 = 20.0;
const RECOMMENDED_COVERAGE: u32 = 80;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageAnalysis {
    pub total_estimated_hours: f64,
    pub skills_covered: usize,
    pub required_skills: usize,
    /// Whole percent of required skills covered.
    pub coverage_percentage: u32,
    pub uncovered_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub coverage_analysis: CoverageAnalysis,
    pub recommendations: Vec<String>,
}

/// A required skill is covered when some map key with at least one video contains
/// it, ignoring case ("React Hooks" covers "react").
fn is_covered(required: &str, content: &BTreeMap<String, Vec<VideoContent>>) -> bool {
    let required = required.trim().to_lowercase();
    content
        .iter()
        .filter(|(_, videos)| !videos.is_empty())
        .any(|(key, _)| key.to_lowercase().contains(&required))
}

pub fn validate_path(
    required_skills: &[String],
    content: &BTreeMap<String, Vec<VideoContent>>,
) -> PathValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    let total_videos: usize = content.values().map(Vec::len).sum();
    if total_videos == 0 {
        errors.push("Custom path contains no content".to_string());
    }

    let required: Vec<&str> = required_skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let uncovered_skills: Vec<String> = required
        .iter()
        .filter(|skill| !is_covered(skill, content))
        .map(|s| s.to_string())
        .collect();
    let skills_covered = required.len() - uncovered_skills.len();
    let coverage_percentage = if required.is_empty() {
        100
    } else {
        ((skills_covered as f64 / required.len() as f64) * 100.0).round() as u32
    };

    let total_minutes: u64 = content
        .values()
        .flatten()
        .map(|v| v.estimated_completion_time as u64)
        .sum();
    let total_estimated_hours = round1(total_minutes as f64 / 60.0);

    if !uncovered_skills.is_empty() {
        warnings.push(format!(
            "Some required skills may not be fully covered: {}",
            uncovered_skills.join(", ")
        ));
    }
    if total_estimated_hours < MIN_TOTAL_HOURS {
        warnings.push(format!(
            "Total learning time is {total_estimated_hours} hours, below the recommended {MIN_TOTAL_HOURS}"
        ));
        recommendations.push(
            "Consider adding more comprehensive content for better skill development".to_string(),
        );
    }
    if coverage_percentage < RECOMMENDED_COVERAGE {
        recommendations
            .push("Add content for uncovered skills to improve job readiness".to_string());
    }

    PathValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        coverage_analysis: CoverageAnalysis {
            total_estimated_hours,
            skills_covered,
            required_skills: required.len(),
            coverage_percentage,
            uncovered_skills,
        },
        recommendations,
    }
}
