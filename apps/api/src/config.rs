use anyhow::{ensure, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// The video catalog and text-generation keys are optional: without them the engine
/// runs on synthetic content and templated overviews.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub youtube_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Max in-flight catalog searches when curating several skills at once.
    pub curation_concurrency: usize,
    pub curation_timeout_secs: u64,
    pub curation_cache_ttl_secs: u64,
    /// Reward pool health fed into market snapshots, 0.0 – 1.0.
    pub reward_pool_health: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            youtube_api_key: optional_env("YOUTUBE_API_KEY"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            curation_concurrency: parse_env("CURATION_CONCURRENCY", 4)
                .context("CURATION_CONCURRENCY must be a positive integer")?
                .max(1),
            curation_timeout_secs: parse_env("CURATION_TIMEOUT_SECS", 8)
                .context("CURATION_TIMEOUT_SECS must be an integer")?,
            curation_cache_ttl_secs: parse_env("CURATION_CACHE_TTL_SECS", 3600)
                .context("CURATION_CACHE_TTL_SECS must be an integer")?,
            reward_pool_health: pool_health(
                parse_env("REWARD_POOL_HEALTH", 0.8_f64)
                    .context("REWARD_POOL_HEALTH must be a number")?,
            )?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

/// `f64::from_str` accepts "NaN" and "inf", which `clamp` would pass through.
fn pool_health(value: f64) -> Result<f64> {
    ensure!(value.is_finite(), "REWARD_POOL_HEALTH must be a finite number");
    Ok(value.clamp(0.0, 1.0))
}
