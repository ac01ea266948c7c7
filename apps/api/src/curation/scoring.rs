//! Educational-fit scoring for admitted catalog videos.
//!
//! `overall_score` = channel tier bonus + title keyword bonuses + duration bonus
//! − penalty per disqualifying keyword that slipped past classification.
//! Quality, relevance and difficulty scores (0 – 100) are derived for display
//! and for substitution validation.

use serde::{Deserialize, Serialize};

use crate::curation::catalog::CatalogVideo;
use crate::curation::classifier::NormalizedTitle;
use crate::curation::{ChannelTier, CurationConfig};
use crate::models::content::{DifficultyLevel, VideoContent};

const TEN_MINUTES: u32 = 600;
const FIVE_MINUTES: u32 = 300;
const THREE_HOURS: u32 = 10_800;
const SIX_HOURS: u32 = 21_600;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub channel_tier: ChannelTier,
    pub channel_bonus: f64,
    pub title_bonus: f64,
    pub duration_bonus: f64,
    pub penalty: f64,
    pub total: f64,
}

/// Scores a video that already passed `classifier::admit`.
pub fn score_video(
    video: &CatalogVideo,
    title: &NormalizedTitle,
    config: &CurationConfig,
) -> ScoreBreakdown {
    let channel_tier = config.channel_tier(&video.channel);
    let channel_bonus = config.channel_bonus(channel_tier);

    let title_bonus: f64 = config
        .title_bonuses
        .iter()
        .filter(|(phrase, _)| title.contains_fragment(phrase))
        .map(|(_, bonus)| bonus)
        .sum();

    let duration_bonus = duration_bonus(video.duration_secs);

    let slipped = config
        .disqualifying_keywords
        .iter()
        .filter(|kw| title.contains_keyword_loosely(kw))
        .count();
    let penalty = slipped as f64 * config.disqualifying_penalty;

    ScoreBreakdown {
        channel_tier,
        channel_bonus,
        title_bonus,
        duration_bonus,
        penalty,
        total: channel_bonus + title_bonus + duration_bonus - penalty,
    }
}

/// +20 for 10 min – 3 h, +10 for 5 min – 6 h, −30 under 5 min.
pub fn duration_bonus(duration_secs: u32) -> f64 {
    if (TEN_MINUTES..=THREE_HOURS).contains(&duration_secs) {
        20.0
    } else if (FIVE_MINUTES..=SIX_HOURS).contains(&duration_secs) {
        10.0
    } else if duration_secs < FIVE_MINUTES {
        -30.0
    } else {
        0.0
    }
}

/// Share of topic words present in the title, mapped onto 55 – 100.
pub fn relevance_score(topic: &str, title: &NormalizedTitle, config: &CurationConfig) -> f64 {
    let topic = NormalizedTitle::new(topic);
    let topic_words = topic.words();
    let overlap = if topic_words.is_empty() {
        0.0
    } else {
        let hits = topic_words
            .iter()
            .filter(|w| title.contains_keyword_loosely(w))
            .count();
        hits as f64 / topic_words.len() as f64
    };

    let educational = config
        .educational_keywords
        .iter()
        .any(|kw| title.contains_keyword(kw));

    let score = 55.0 + 45.0 * overlap + if educational { 5.0 } else { 0.0 };
    score.clamp(0.0, 100.0)
}

/// Level the content appears to target, inferred from title markers.
pub fn infer_content_level(title: &NormalizedTitle, config: &CurationConfig) -> DifficultyLevel {
    if config.advanced_markers.iter().any(|m| title.contains_keyword(m)) {
        DifficultyLevel::Advanced
    } else if config.beginner_markers.iter().any(|m| title.contains_keyword(m)) {
        DifficultyLevel::Beginner
    } else {
        DifficultyLevel::Intermediate
    }
}

fn level_rank(level: DifficultyLevel) -> i32 {
    match level {
        DifficultyLevel::Beginner => 1,
        DifficultyLevel::Intermediate => 2,
        DifficultyLevel::Advanced => 3,
    }
}

/// How well the content's depth matches the requested level. Content pitched
/// below the request drops fast (one level easier = 60), harder content drops slowly.
pub fn difficulty_score(
    title: &NormalizedTitle,
    duration_secs: u32,
    requested: DifficultyLevel,
    config: &CurationConfig,
) -> f64 {
    let diff = level_rank(infer_content_level(title, config)) - level_rank(requested);
    let base = match diff {
        0 => 90.0,
        d if d < 0 => 90.0 + 30.0 * d as f64,
        d => 90.0 - 15.0 * d as f64,
    };
    let depth = if duration_secs > THREE_HOURS { 5.0 } else { 0.0 };
    (base + depth).clamp(0.0, 100.0)
}

pub fn quality_score(video: &CatalogVideo, breakdown: &ScoreBreakdown) -> f64 {
    let popularity = ((video.view_count as f64 + 1.0).log10() * 2.0).min(12.0);
    let signal =
        breakdown.channel_bonus + breakdown.title_bonus.min(40.0) + breakdown.duration_bonus;
    (40.0 + 0.5 * signal + popularity - 0.5 * breakdown.penalty).clamp(0.0, 100.0)
}

/// Minutes, rounded up.
pub fn estimated_completion_minutes(duration_secs: u32, config: &CurationConfig) -> u32 {
    ((duration_secs as f64 / 60.0) * config.completion_time_factor).ceil() as u32
}

fn quality_indicators(
    video: &CatalogVideo,
    title: &NormalizedTitle,
    breakdown: &ScoreBreakdown,
) -> Vec<String> {
    let mut indicators = Vec::new();
    if breakdown.channel_tier != ChannelTier::Unranked {
        indicators.push("Educational Channel".to_string());
    }
    if breakdown.channel_tier == ChannelTier::Premium {
        indicators.push("Premium Channel".to_string());
    }
    if title.contains_fragment("full course") || title.contains_fragment("complete") {
        indicators.push("Structured Course".to_string());
    }
    if video.view_count > 100_000 {
        indicators.push("Popular".to_string());
    }
    if breakdown.duration_bonus >= 20.0 {
        indicators.push("Ideal Length".to_string());
    }
    indicators
}

/// Builds the curated `VideoContent` for an admitted, scored candidate.
pub fn build_video_content(
    video: CatalogVideo,
    title: &NormalizedTitle,
    breakdown: &ScoreBreakdown,
    topic: &str,
    requested: DifficultyLevel,
    config: &CurationConfig,
    synthetic: bool,
) -> VideoContent {
    VideoContent {
        quality_score: quality_score(&video, breakdown),
        relevance_score: relevance_score(topic, title, config),
        difficulty_score: difficulty_score(title, video.duration_secs, requested, config),
        estimated_completion_time: estimated_completion_minutes(video.duration_secs, config),
        overall_score: breakdown.total,
        quality_indicators: quality_indicators(&video, title, breakdown),
        synthetic,
        id: video.id,
        title: video.title,
        channel: video.channel,
        duration_secs: video.duration_secs,
        view_count: video.view_count,
        url: video.url,
    }
}
