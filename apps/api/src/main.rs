mod config;
mod curation;
mod customization;
mod db;
mod errors;
mod llm_client;
mod models;
mod payout;
mod planning;
mod routes;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::curation::cache::RedisCurationCache;
use crate::curation::catalog::{DisabledCatalog, VideoCatalog, YouTubeCatalog};
use crate::curation::curator::ContentCurator;
use crate::curation::CurationConfig;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::payout::calculator::{PayoutCalculator, PayoutConfig};
use crate::planning::pacing::PacingConfig;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgPlanStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathway API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgPlanStore::new(db));

    // Initialize Redis (curation cache)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Arc::new(RedisCurationCache::new(
        redis,
        Duration::from_secs(config.curation_cache_ttl_secs),
    ));
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Video catalog: synthetic content only when no key is configured
    let timeout = Duration::from_secs(config.curation_timeout_secs);
    let catalog: Arc<dyn VideoCatalog> = match &config.youtube_api_key {
        Some(key) => Arc::new(YouTubeCatalog::new(key.clone(), timeout)?),
        None => {
            warn!("YOUTUBE_API_KEY not set, curating synthetic content only");
            Arc::new(DisabledCatalog)
        }
    };
    let curator = ContentCurator::new(
        catalog,
        CurationConfig::default(),
        timeout,
        config.curation_concurrency,
    )
    .with_cache(cache);

    // Initialize LLM client (optional)
    let llm = match &config.anthropic_api_key {
        Some(key) => match LlmClient::new(key.clone()) {
            Ok(client) => {
                info!("LLM client initialized (model: {})", llm_client::MODEL);
                Some(client)
            }
            Err(e) => {
                warn!("LLM client unavailable, using templated overviews: {e}");
                None
            }
        },
        None => {
            warn!("ANTHROPIC_API_KEY not set, using templated overviews");
            None
        }
    };

    // Build app state
    let state = AppState {
        store,
        s3,
        llm,
        curator,
        pacing: Arc::new(PacingConfig::default()),
        payout: Arc::new(PayoutCalculator::new(PayoutConfig::default())),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "pathway-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
