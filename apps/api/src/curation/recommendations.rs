//! Presentation metadata for curated content: ratings, reasons, prerequisites
//! and aggregate statistics across skills.

use serde::Serialize;

use crate::models::content::{SkillContent, VideoContent};
use crate::models::plan::round1;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationMetadata {
    pub quality_rating: &'static str,
    pub difficulty_match: &'static str,
    pub recommendation_reason: String,
    /// Minutes.
    pub estimated_learning_time: u32,
    pub prerequisites: Vec<String>,
    pub learning_outcomes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub content: VideoContent,
    pub metadata: RecommendationMetadata,
}

pub fn quality_rating(quality_score: f64) -> &'static str {
    match quality_score {
        s if s >= 90.0 => "Excellent",
        s if s >= 80.0 => "Very Good",
        s if s >= 70.0 => "Good",
        s if s >= 60.0 => "Fair",
        _ => "Poor",
    }
}

pub fn difficulty_match(difficulty_score: f64) -> &'static str {
    match difficulty_score {
        s if s >= 90.0 => "Perfect Match",
        s if s >= 80.0 => "Good Match",
        s if s >= 70.0 => "Acceptable",
        _ => "May Not Match",
    }
}

pub fn recommendation_reason(content: &VideoContent, skill: &str) -> String {
    let mut reasons = Vec::new();
    if content.quality_score >= 85.0 {
        reasons.push("High quality content".to_string());
    }
    if content.relevance_score >= 90.0 {
        reasons.push(format!("Highly relevant to {skill}"));
    }
    if content
        .quality_indicators
        .iter()
        .any(|i| i == "Educational Channel")
    {
        reasons.push("From trusted educational source".to_string());
    }
    if content.view_count > 100_000 {
        reasons.push("Popular with learners".to_string());
    }

    if reasons.is_empty() {
        "Recommended based on content analysis".to_string()
    } else {
        reasons.join(", ")
    }
}

pub fn prerequisites(skill: &str) -> Vec<String> {
    let list: &[&str] = match skill.trim().to_lowercase().as_str() {
        "react" => &["JavaScript basics", "HTML/CSS"],
        "node.js" | "node" | "nodejs" => &["JavaScript fundamentals", "Basic programming concepts"],
        "python" => &["Basic programming concepts"],
        "machine learning" => &["Python basics", "Statistics fundamentals", "Linear algebra"],
        "docker" => &["Command line basics", "Basic networking concepts"],
        "kubernetes" => &["Docker knowledge", "Container concepts", "Basic networking"],
        _ => &["Basic programming knowledge"],
    };
    list.iter().map(|s| s.to_string()).collect()
}

pub fn learning_outcomes(skill: &str) -> Vec<String> {
    vec![
        format!("Master {skill} fundamentals"),
        format!("Build practical projects using {skill}"),
        "Understand best practices and common patterns".to_string(),
        format!("Prepare for {skill}-related interview questions"),
    ]
}

pub fn enrich(videos: Vec<VideoContent>, skill: &str) -> Vec<Recommendation> {
    videos
        .into_iter()
        .map(|content| {
            let metadata = RecommendationMetadata {
                quality_rating: quality_rating(content.quality_score),
                difficulty_match: difficulty_match(content.difficulty_score),
                recommendation_reason: recommendation_reason(&content, skill),
                estimated_learning_time: content.estimated_completion_time,
                prerequisites: prerequisites(skill),
                learning_outcomes: learning_outcomes(skill),
            };
            Recommendation { content, metadata }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Content statistics
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationDistribution {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopVideo {
    pub title: String,
    pub score: f64,
    pub skill: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentStats {
    pub total_videos: usize,
    pub average_quality: f64,
    /// Minutes.
    pub average_duration: f64,
    pub total_estimated_hours: f64,
    pub quality_distribution: Distribution,
    /// Under 20 min, 20 – 60 min, an hour or more.
    pub duration_distribution: DurationDistribution,
    pub top_quality_videos: Vec<TopVideo>,
}

pub fn content_stats(curated: &[SkillContent]) -> ContentStats {
    let all: Vec<(&str, &VideoContent)> = curated
        .iter()
        .flat_map(|s| s.videos.iter().map(move |v| (s.skill.as_str(), v)))
        .collect();

    if all.is_empty() {
        return ContentStats::default();
    }

    let n = all.len() as f64;
    let average_quality = all.iter().map(|(_, v)| v.quality_score).sum::<f64>() / n;
    let average_duration = all.iter().map(|(_, v)| v.duration_minutes()).sum::<f64>() / n;
    let total_minutes: u64 = all
        .iter()
        .map(|(_, v)| v.estimated_completion_time as u64)
        .sum();

    let mut quality_distribution = Distribution::default();
    let mut duration_distribution = DurationDistribution::default();
    for (_, v) in &all {
        match v.quality_score {
            q if q >= 80.0 => quality_distribution.high += 1,
            q if q >= 60.0 => quality_distribution.medium += 1,
            _ => quality_distribution.low += 1,
        }
        match v.duration_minutes() {
            m if m < 20.0 => duration_distribution.short += 1,
            m if m < 60.0 => duration_distribution.medium += 1,
            _ => duration_distribution.long += 1,
        }
    }

    let mut ranked = all.clone();
    ranked.sort_by(|a, b| b.1.overall_score.total_cmp(&a.1.overall_score));
    let top_quality_videos = ranked
        .into_iter()
        .take(5)
        .map(|(skill, v)| TopVideo {
            title: v.title.clone(),
            score: v.overall_score,
            skill: skill.to_string(),
        })
        .collect();

    ContentStats {
        total_videos: all.len(),
        average_quality: round1(average_quality),
        average_duration: round1(average_duration),
        total_estimated_hours: round1(total_minutes as f64 / 60.0),
        quality_distribution,
        duration_distribution,
        top_quality_videos,
    }
}
