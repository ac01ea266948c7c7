use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::config::Config;
use crate::curation::curator::ContentCurator;
use crate::llm_client::LlmClient;
use crate::payout::calculator::PayoutCalculator;
use crate::planning::pacing::PacingConfig;
use crate::store::PlanStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Plan persistence. `PgPlanStore` in production.
    pub store: Arc<dyn PlanStore>,
    pub s3: S3Client,
    /// `None` when no text-generation key is configured; overviews fall back to the template.
    pub llm: Option<LlmClient>,
    pub curator: ContentCurator,
    pub pacing: Arc<PacingConfig>,
    pub payout: Arc<PayoutCalculator>,
    pub config: Config,
}

#[cfg(test)]
pub mod tests {
    use std::time::Duration;

    use aws_sdk_s3::config::{BehaviorVersion, Region};

    use super::*;
    use crate::curation::catalog::DisabledCatalog;
    use crate::curation::CurationConfig;
    use crate::store::memory::MemoryPlanStore;

    pub fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/pathway_test".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            s3_bucket: "pathway-test".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            youtube_api_key: None,
            anthropic_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
            curation_concurrency: 2,
            curation_timeout_secs: 1,
            curation_cache_ttl_secs: 60,
            reward_pool_health: 0.8,
        }
    }

    /// State backed by an in-memory store, synthetic content and no LLM.
    pub fn test_state(store: Arc<MemoryPlanStore>) -> AppState {
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();

        AppState {
            store,
            s3: S3Client::from_conf(s3_config),
            llm: None,
            curator: ContentCurator::new(
                Arc::new(DisabledCatalog),
                CurationConfig::default(),
                Duration::from_secs(1),
                2,
            ),
            pacing: Arc::new(PacingConfig::default()),
            payout: Arc::new(PayoutCalculator::default()),
            config: test_config(),
        }
    }
}
