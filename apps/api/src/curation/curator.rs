use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::curation::cache::{cache_key, CurationCache};
use crate::curation::catalog::{CatalogVideo, VideoCatalog};
use crate::curation::classifier::{admit, check_duration, NormalizedTitle};
use crate::curation::fallback;
use crate::curation::scoring::{build_video_content, score_video};
use crate::curation::CurationConfig;
use crate::models::content::{ContentType, DifficultyLevel, SkillContent, VideoContent};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentQuery {
    pub topic: String,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub content_type: ContentType,
    pub max_results: u32,
}

/// Stateless curation service. Cheap to clone; shared through `AppState`.
#[derive(Clone)]
pub struct ContentCurator {
    catalog: Arc<dyn VideoCatalog>,
    cache: Option<Arc<dyn CurationCache>>,
    config: Arc<CurationConfig>,
    timeout: Duration,
    concurrency: usize,
}

impl ContentCurator {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        config: CurationConfig,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            cache: None,
            config: Arc::new(config),
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CurationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Ranked educational videos for a topic, at most `max_results` long.
    ///
    /// Never fails. Catalog errors, timeouts and empty result sets all fall back
    /// to deterministic synthetic content. Only real catalog results are cached.
    pub async fn search_educational_content(&self, query: &ContentQuery) -> Vec<VideoContent> {
        if query.max_results == 0 || query.topic.trim().is_empty() {
            return Vec::new();
        }

        let key = cache_key(
            &query.topic,
            query.difficulty.as_str(),
            query.content_type.as_str(),
            query.max_results,
        );

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(videos)) => {
                    debug!("Curation cache hit for '{key}'");
                    return videos;
                }
                Ok(None) => {}
                Err(e) => warn!("Curation cache read failed, continuing without it: {e}"),
            }
        }

        let search_term = format!(
            "{} {}",
            query.topic.trim(),
            query.content_type.search_qualifiers()
        );
        let candidates = self.config.candidate_count(query.max_results);

        match tokio::time::timeout(self.timeout, self.catalog.search(&search_term, candidates)).await
        {
            Ok(Ok(videos)) => {
                let fetched = videos.len();
                let ranked = rank_candidates(videos, query, &self.config, false);
                if !ranked.is_empty() {
                    info!(
                        "Curated {} of {fetched} catalog videos for '{}'",
                        ranked.len(),
                        query.topic
                    );
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.put(&key, &ranked).await {
                            warn!("Curation cache write failed: {e}");
                        }
                    }
                    return ranked;
                }
                warn!(
                    "No usable catalog results for '{}' ({fetched} fetched), using synthetic content",
                    query.topic
                );
            }
            Ok(Err(e)) => warn!(
                "Catalog search failed for '{}', using synthetic content: {e}",
                query.topic
            ),
            Err(_) => warn!(
                "Catalog search for '{}' timed out after {:?}, using synthetic content",
                query.topic, self.timeout
            ),
        }

        self.synthetic_content(query)
    }

    fn synthetic_content(&self, query: &ContentQuery) -> Vec<VideoContent> {
        let videos = fallback::synthesize(&query.topic, query.max_results as usize, &self.config);
        rank_candidates(videos, query, &self.config, true)
    }

    /// Curates every skill with bounded concurrency. Output order matches `skills`;
    /// one skill falling back never affects the others.
    pub async fn curate_skills(
        &self,
        skills: &[String],
        difficulty: DifficultyLevel,
        content_type: ContentType,
        per_skill: u32,
    ) -> Vec<SkillContent> {
        stream::iter(skills.iter().cloned())
            .map(|skill| {
                let query = ContentQuery {
                    topic: skill.clone(),
                    difficulty,
                    content_type,
                    max_results: per_skill,
                };
                async move {
                    let videos = self.search_educational_content(&query).await;
                    SkillContent { skill, videos }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Filter, score, sort and truncate. Pure; no I/O.
///
/// Ties on score go to the more-viewed video, then to the lower id, so the
/// ordering is stable across runs.
pub fn rank_candidates(
    videos: Vec<CatalogVideo>,
    query: &ContentQuery,
    config: &CurationConfig,
    synthetic: bool,
) -> Vec<VideoContent> {
    let mut ranked: Vec<VideoContent> = videos
        .into_iter()
        .filter_map(|video| {
            // Synthetic titles embed the topic verbatim, so a topic like "Music Theory"
            // would trip the keyword filter. They only go through the duration window.
            let admitted = if synthetic {
                check_duration(video.duration_secs, config)
                    .map(|()| NormalizedTitle::new(&video.title))
            } else {
                admit(&video, config)
            };
            match admitted {
                Ok(title) => {
                    let breakdown = score_video(&video, &title, config);
                    Some(build_video_content(
                        video,
                        &title,
                        &breakdown,
                        &query.topic,
                        query.difficulty,
                        config,
                        synthetic,
                    ))
                }
                Err(reason) => {
                    debug!("Dropped '{}': {reason:?}", video.title);
                    None
                }
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.overall_score
            .total_cmp(&a.overall_score)
            .then_with(|| b.view_count.cmp(&a.view_count))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen = HashSet::new();
    ranked.retain(|v| seen.insert(v.id.clone()));
    ranked.truncate(query.max_results as usize);
    ranked
}
