// Content curation: catalog search → duration filter → educational classification →
// scoring → ranking, with a deterministic synthetic fallback.
// The curator is stateless; every tunable table lives in `CurationConfig`.

pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod curator;
pub mod fallback;
pub mod handlers;
pub mod recommendations;
pub mod scoring;

use serde::{Deserialize, Serialize};

/// Tunable tables for the curator. Injected so tests can pin exact behaviour.
///
/// Channel names and keywords are matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    pub premium_channels: Vec<String>,
    pub good_channels: Vec<String>,
    pub premium_channel_bonus: f64,
    pub good_channel_bonus: f64,
    /// Any of these in a title counts as an educational signal.
    pub educational_keywords: Vec<String>,
    /// Any of these in a title disqualifies the video.
    pub disqualifying_keywords: Vec<String>,
    /// Title phrase → score bonus. Every matching phrase counts once.
    pub title_bonuses: Vec<(String, f64)>,
    /// Title markers used to place content on the beginner/advanced axis.
    pub beginner_markers: Vec<String>,
    pub advanced_markers: Vec<String>,
    pub disqualifying_penalty: f64,
    /// Videos at or below this length are non-substantive clips.
    pub clip_cutoff_secs: u32,
    pub min_duration_secs: u32,
    pub max_duration_secs: u32,
    /// Catalog over-fetch factor, to leave room for post-filtering.
    pub candidate_multiplier: u32,
    pub max_candidates: u32,
    /// Watch-time multiplier used for `estimated_completion_time`.
    pub completion_time_factor: f64,
}

impl CurationConfig {
    pub fn channel_tier(&self, channel: &str) -> ChannelTier {
        let channel = channel.trim().to_lowercase();
        if self.premium_channels.iter().any(|c| c.to_lowercase() == channel) {
            ChannelTier::Premium
        } else if self.good_channels.iter().any(|c| c.to_lowercase() == channel) {
            ChannelTier::Good
        } else {
            ChannelTier::Unranked
        }
    }

    pub fn channel_bonus(&self, tier: ChannelTier) -> f64 {
        match tier {
            ChannelTier::Premium => self.premium_channel_bonus,
            ChannelTier::Good => self.good_channel_bonus,
            ChannelTier::Unranked => 0.0,
        }
    }

    /// How many catalog candidates to request for `max_results` curated videos.
    pub fn candidate_count(&self, max_results: u32) -> u32 {
        max_results
            .saturating_mul(self.candidate_multiplier)
            .min(self.max_candidates)
            .max(max_results.min(self.max_candidates))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelTier {
    Premium,
    Good,
    Unranked,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            premium_channels: strings(&[
                "freeCodeCamp.org",
                "Traversy Media",
                "Programming with Mosh",
                "The Net Ninja",
                "Academind",
                "CS50",
                "MIT OpenCourseWare",
                "Corey Schafer",
            ]),
            good_channels: strings(&[
                "Web Dev Simplified",
                "Tech With Tim",
                "Codevolution",
                "Telusko",
                "Derek Banas",
                "Kevin Powell",
                "TechWorld with Nana",
                "Sentdex",
                "StatQuest with Josh Starmer",
                "Hussein Nasser",
            ]),
            premium_channel_bonus: 30.0,
            good_channel_bonus: 15.0,
            educational_keywords: strings(&[
                "tutorial",
                "tutorials",
                "course",
                "guide",
                "explained",
                "beginner",
                "beginners",
                "learn",
                "lesson",
                "introduction",
                "fundamentals",
                "masterclass",
                "bootcamp",
                "crash course",
                "full course",
                "step by step",
                "how to",
            ]),
            disqualifying_keywords: strings(&[
                "music", "meme", "memes", "shorts", "vs", "reaction", "prank", "funny",
                "trailer", "asmr", "lofi",
            ]),
            title_bonuses: vec![
                ("complete".to_string(), 20.0),
                ("full course".to_string(), 25.0),
                ("crash course".to_string(), 15.0),
                ("tutorial".to_string(), 10.0),
                ("beginner".to_string(), 15.0),
                ("step by step".to_string(), 15.0),
                ("guide".to_string(), 10.0),
                ("explained".to_string(), 10.0),
            ],
            beginner_markers: strings(&[
                "beginner",
                "beginners",
                "basics",
                "introduction",
                "intro",
                "crash course",
                "getting started",
                "fundamentals",
                "for dummies",
            ]),
            advanced_markers: strings(&[
                "advanced",
                "expert",
                "deep dive",
                "internals",
                "masterclass",
                "architecture",
                "performance",
            ]),
            disqualifying_penalty: 50.0,
            clip_cutoff_secs: 60,
            min_duration_secs: 120,
            max_duration_secs: 28_800,
            candidate_multiplier: 3,
            max_candidates: 50,
            completion_time_factor: 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_tier_is_case_insensitive() {
        let config = CurationConfig::default();
        assert_eq!(config.channel_tier("FREECODECAMP.ORG"), ChannelTier::Premium);
        assert_eq!(config.channel_tier("Tech With Tim"), ChannelTier::Good);
        assert_eq!(config.channel_tier("Random Vlogs"), ChannelTier::Unranked);
    }

    #[test]
    fn test_candidate_count_overfetches_and_caps() {
        let config = CurationConfig::default();
        assert_eq!(config.candidate_count(5), 15);
        assert_eq!(config.candidate_count(30), 50);
        assert_eq!(config.candidate_count(0), 0);
    }
}
