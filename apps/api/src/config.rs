use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Wall-clock budget for one merge unit of work.
    pub merge_timeout: Duration,
    /// Redis lock lifetime; outlives extraction plus merge.
    pub merge_lock_ttl: Duration,
    pub max_cv_bytes: usize,
    pub db_max_connections: u32,
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
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_or("PORT", std::env::var("PORT").ok(), 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            merge_timeout: Duration::from_secs(parse_or(
                "MERGE_TIMEOUT_SECS",
                std::env::var("MERGE_TIMEOUT_SECS").ok(),
                120,
            )?),
            merge_lock_ttl: Duration::from_secs(parse_or(
                "MERGE_LOCK_TTL_SECS",
                std::env::var("MERGE_LOCK_TTL_SECS").ok(),
                180,
            )?),
            max_cv_bytes: parse_or(
                "MAX_CV_BYTES",
                std::env::var("MAX_CV_BYTES").ok(),
                10 * 1024 * 1024,
            )?,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                std::env::var("DB_MAX_CONNECTIONS").ok(),
                10,
            )?,
        })
    }

    /// Lock lifetime for a CV import. Never shorter than extraction plus the
    /// merge budget, so the lock cannot lapse while the import still runs.
    pub fn merge_lock_ttl_for(&self, extraction_budget: Duration) -> Duration {
        self.merge_lock_ttl.max(self.merge_timeout + extraction_budget)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
    }
}
