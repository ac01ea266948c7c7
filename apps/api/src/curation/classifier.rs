//! Duration filtering and educational classification.
//!
//! Single-word keywords match whole title words; multi-word keywords match as
//! phrases over the normalised title. "React vs Vue" is disqualified by "vs",
//! "canvas" is not.

use serde::{Deserialize, Serialize};

use crate::curation::catalog::CatalogVideo;
use crate::curation::{ChannelTier, CurationConfig};

/// Why a candidate was dropped before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// At or under the clip cutoff.
    NonSubstantiveClip,
    TooShort,
    TooLong,
    NotEducational,
    Disqualified { keyword: String },
}

/// Lowercased title split into alphanumeric words.
#[derive(Debug, Clone)]
pub struct NormalizedTitle {
    words: Vec<String>,
    joined: String,
}

impl NormalizedTitle {
    pub fn new(title: &str) -> Self {
        let words: Vec<String> = title
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .map(|w| w.trim_start_matches('#').to_string())
            .filter(|w| !w.is_empty())
            .collect();
        let joined = words.join(" ");
        Self { words, joined }
    }

    /// Whole-word match for single words, phrase match for multi-word keywords.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return false;
        }
        if keyword.contains(' ') {
            let padded = format!(" {} ", self.joined);
            padded.contains(&format!(" {keyword} "))
        } else {
            self.words.iter().any(|w| *w == keyword)
        }
    }

    /// Like `contains_keyword`, but also accepts simple plurals ("reactions").
    pub fn contains_keyword_loosely(&self, keyword: &str) -> bool {
        if self.contains_keyword(keyword) {
            return true;
        }
        let keyword = keyword.trim().to_lowercase();
        !keyword.contains(' ')
            && self
                .words
                .iter()
                .any(|w| *w == format!("{keyword}s") || *w == format!("{keyword}es"))
    }

    /// Phrase occurrence anywhere in the title, including inside words ("beginners").
    pub fn contains_fragment(&self, fragment: &str) -> bool {
        self.joined.contains(&fragment.trim().to_lowercase())
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Applies the duration window. Anything under the clip cutoff is dropped
/// outright, then the [min, max] window applies.
pub fn check_duration(duration_secs: u32, config: &CurationConfig) -> Result<(), Rejection> {
    if duration_secs < config.clip_cutoff_secs {
        return Err(Rejection::NonSubstantiveClip);
    }
    if duration_secs < config.min_duration_secs {
        return Err(Rejection::TooShort);
    }
    if duration_secs > config.max_duration_secs {
        return Err(Rejection::TooLong);
    }
    Ok(())
}

/// Educational classification: allow-listed channel or educational title keyword,
/// and no disqualifying keyword.
pub fn classify(
    video: &CatalogVideo,
    title: &NormalizedTitle,
    config: &CurationConfig,
) -> Result<(), Rejection> {
    if let Some(keyword) = config
        .disqualifying_keywords
        .iter()
        .find(|kw| title.contains_keyword(kw))
    {
        return Err(Rejection::Disqualified {
            keyword: keyword.clone(),
        });
    }

    let allow_listed = config.channel_tier(&video.channel) != ChannelTier::Unranked;
    let educational_title = config
        .educational_keywords
        .iter()
        .any(|kw| title.contains_keyword(kw));

    if allow_listed || educational_title {
        Ok(())
    } else {
        Err(Rejection::NotEducational)
    }
}

/// Full pre-scoring gate: duration first, then classification.
pub fn admit(video: &CatalogVideo, config: &CurationConfig) -> Result<NormalizedTitle, Rejection> {
    check_duration(video.duration_secs, config)?;
    let title = NormalizedTitle::new(&video.title);
    classify(video, &title, config)?;
    Ok(title)
}
