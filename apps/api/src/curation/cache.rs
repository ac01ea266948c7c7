//! Curated-result cache keyed by query shape, to stay inside catalog rate limits.
//! Cache failures never fail a curation request; the curator logs and carries on.

use std::time::Duration;

use async_trait::async_trait;
use redis::Client as RedisClient;

use crate::errors::AppError;
use crate::models::content::VideoContent;

#[async_trait]
pub trait CurationCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<VideoContent>>, AppError>;
    async fn put(&self, key: &str, videos: &[VideoContent]) -> Result<(), AppError>;
}

pub fn cache_key(topic: &str, difficulty: &str, content_type: &str, max_results: u32) -> String {
    format!(
        "curation:v1:{}:{difficulty}:{content_type}:{max_results}",
        topic.trim().to_lowercase().replace(char::is_whitespace, "_")
    )
}

pub struct RedisCurationCache {
    client: RedisClient,
    ttl: Duration,
}

impl RedisCurationCache {
    pub fn new(client: RedisClient, ttl: Duration) -> Self {
        Self { client, ttl }
    }
}

#[async_trait]
impl CurationCache for RedisCurationCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<VideoContent>>, AppError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        let raw: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::Cache(format!("Corrupt cache entry '{key}': {e}"))),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, videos: &[VideoContent]) -> Result<(), AppError> {
        let payload = serde_json::to_string(videos).map_err(|e| AppError::Cache(e.to_string()))?;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(self.ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }
}
