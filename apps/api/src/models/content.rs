use serde::{Deserialize, Serialize};

/// A curated educational video. Produced by the content curator and read-only afterwards.
///
/// Scores are on a 0 – 100 scale. `duration_secs` is the raw video length;
/// `estimated_completion_time` is in minutes and includes pause/replay overhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoContent {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub duration_secs: u32,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub url: Option<String>,
    pub quality_score: f64,
    pub relevance_score: f64,
    pub difficulty_score: f64,
    /// Minutes.
    pub estimated_completion_time: u32,
    /// Raw curation score used for ranking. Unbounded; may be negative.
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub quality_indicators: Vec<String>,
    /// True when the entry came from the synthetic generator rather than the catalog.
    #[serde(default)]
    pub synthetic: bool,
}

impl VideoContent {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_secs as f64 / 60.0
    }
}

/// A single missing or weak skill, ranked by priority (1 = most urgent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub required_level: u8,
    pub current_level: u8,
    pub priority: u32,
}

/// Curated content for one skill, in curator rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillContent {
    pub skill: String,
    pub videos: Vec<VideoContent>,
}

/// Difficulty requested by the caller. Shifts the ideal difficulty band used in scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

/// Shape of content the caller prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    StructuredCourse,
    Tutorial,
    Project,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::StructuredCourse => "structured-course",
            ContentType::Tutorial => "tutorial",
            ContentType::Project => "project",
        }
    }

    /// Qualifiers appended to the topic when querying the catalog.
    pub fn search_qualifiers(&self) -> &'static str {
        match self {
            ContentType::StructuredCourse => "full course tutorial",
            ContentType::Tutorial => "tutorial explained",
            ContentType::Project => "project tutorial step by step",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_serde_kebab_case() {
        let ct: ContentType = serde_json::from_str(r#""structured-course""#).unwrap();
        assert_eq!(ct, ContentType::StructuredCourse);
        assert_eq!(ct.as_str(), "structured-course");
    }

    #[test]
    fn test_difficulty_default_is_intermediate() {
        assert_eq!(DifficultyLevel::default(), DifficultyLevel::Intermediate);
    }

    #[test]
    fn test_video_content_optional_fields_default() {
        let json = r#"{
            "id": "abc",
            "title": "Rust Tutorial",
            "channel": "freeCodeCamp.org",
            "duration_secs": 3600,
            "quality_score": 80.0,
            "relevance_score": 90.0,
            "difficulty_score": 70.0,
            "estimated_completion_time": 72
        }"#;
        let video: VideoContent = serde_json::from_str(json).unwrap();
        assert_eq!(video.view_count, 0);
        assert!(video.quality_indicators.is_empty());
        assert!(!video.synthetic);
        assert!((video.duration_minutes() - 60.0).abs() < f64::EPSILON);
    }
}
