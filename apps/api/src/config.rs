use anyhow::{anyhow, Context, Result};

use crate::scoring::ExtractionStrategy;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub extraction_strategy: ExtractionStrategy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            extraction_strategy: match std::env::var("EXTRACTION_STRATEGY") {
                Ok(raw) => raw
                    .parse::<ExtractionStrategy>()
                    .map_err(|e| anyhow!(e))
                    .context("EXTRACTION_STRATEGY is invalid")?,
                Err(_) => ExtractionStrategy::default(),
            },
        })
    }

    /// Defaults for everything except the API key.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            google_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            max_upload_bytes: 1024,
            extraction_strategy: ExtractionStrategy::Pattern,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
