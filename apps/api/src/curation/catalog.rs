//! External video catalog: search by topic, then fetch per-video details.
//!
//! The catalog is best-effort. Every error here is recovered by the curator with
//! synthetic content, so nothing in this module surfaces to API callers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
/// Hard cap imposed by the YouTube search endpoint.
const YOUTUBE_MAX_PAGE: u32 = 50;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Catalog is not configured")]
    Disabled,
}

/// Raw catalog metadata before filtering and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogVideo {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub duration_secs: u32,
    pub view_count: u64,
    pub url: Option<String>,
}

/// A searchable video source. Carried by the curator as `Arc<dyn VideoCatalog>`.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Returns up to `max_results` videos with details populated.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<CatalogVideo>, CatalogError>;
}

/// Stand-in used when no catalog key is configured. Always fails, so the curator
/// goes straight to synthetic content.
pub struct DisabledCatalog;

#[async_trait]
impl VideoCatalog for DisabledCatalog {
    async fn search(&self, _query: &str, _max_results: u32) -> Result<Vec<CatalogVideo>, CatalogError> {
        Err(CatalogError::Disabled)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// YouTube Data API v3
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

#[derive(Clone)]
pub struct YouTubeCatalog {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeCatalog {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, CatalogError> {
        Self::with_base_url(api_key, YOUTUBE_API_URL.to_string(), timeout)
    }

    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn search_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>, CatalogError> {
        let max_results = max_results.min(YOUTUBE_MAX_PAGE).to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("order", "relevance"),
                ("videoEmbeddable", "true"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<CatalogVideo>, CatalogError> {
        let joined = ids.join(",");
        let response = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "snippet,contentDetails,statistics"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: VideosResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .map(|item| CatalogVideo {
                url: Some(format!("https://www.youtube.com/watch?v={}", item.id)),
                duration_secs: item
                    .content_details
                    .as_ref()
                    .and_then(|d| parse_iso8601_duration(&d.duration))
                    .unwrap_or(0),
                view_count: item
                    .statistics
                    .and_then(|s| s.view_count)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
                title: item.snippet.title,
                channel: item.snippet.channel_title,
                id: item.id,
            })
            .collect())
    }
}

#[async_trait]
impl VideoCatalog for YouTubeCatalog {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<CatalogVideo>, CatalogError> {
        let ids = self.search_ids(query, max_results).await?;
        debug!("Catalog search '{query}' returned {} ids", ids.len());
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_details(&ids).await
    }
}

/// Parses an ISO-8601 duration such as `PT1H2M3S` or `P1DT30M` into seconds.
/// Returns `None` for anything that is not a day/time duration.
pub fn parse_iso8601_duration(raw: &str) -> Option<u32> {
    let rest = raw.strip_prefix('P')?;
    let mut total: u64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            'D' | 'H' | 'M' | 'S' => {
                let value: u64 = number.parse().ok()?;
                number.clear();
                let unit = match (c, in_time) {
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                total = total.checked_add(value.checked_mul(unit)?)?;
                saw_component = true;
            }
            _ => return None,
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    u32::try_from(total).ok()
}
