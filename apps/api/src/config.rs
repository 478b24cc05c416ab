use anyhow::{ensure, Context, Result};

use crate::context::formatter::DEFAULT_MAX_CONTEXT_CHARS;
use crate::llm_client::DEFAULT_API_BASE_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound (in characters) on the formatted context block.
    pub context_max_chars: usize,
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            port: parse_env("PORT", 3000).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            context_max_chars: parse_env("CONTEXT_MAX_CHARS", DEFAULT_MAX_CONTEXT_CHARS)
                .context("CONTEXT_MAX_CHARS must be a positive integer")?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)
                .context("LLM_TIMEOUT_SECS must be a positive integer")?,
        };

        ensure!(config.context_max_chars > 0, "CONTEXT_MAX_CHARS must be greater than 0");
        ensure!(config.llm_timeout_secs > 0, "LLM_TIMEOUT_SECS must be greater than 0");
        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
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
