use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::evaluation::rules::RatingScale;

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Shared by the rating prompts and the score reducer.
    pub rating_scale: RatingScale,
    pub llm_timeout: Duration,
    pub default_temperature: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            rating_scale: RatingScale::default(),
            llm_timeout: Duration::from_secs(120),
            default_temperature: 0.3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match read("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => defaults.port,
        };

        let rating_scale = match read("RATING_SCALE") {
            Some(v) => v
                .parse::<RatingScale>()
                .map_err(|e| anyhow!(e))
                .context("RATING_SCALE is invalid")?,
            None => defaults.rating_scale,
        };

        let llm_timeout = match read("LLM_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.llm_timeout,
        };

        let default_temperature = match read("DEFAULT_TEMPERATURE") {
            Some(v) => {
                let t = v
                    .trim()
                    .parse::<f64>()
                    .context("DEFAULT_TEMPERATURE must be a number")?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(anyhow!("DEFAULT_TEMPERATURE must be between 0 and 2, got {t}"));
                }
                t
            }
            None => defaults.default_temperature,
        };

        Ok(Config {
            port,
            rust_log: read("RUST_LOG").unwrap_or(defaults.rust_log),
            rating_scale,
            llm_timeout,
            default_temperature,
        })
    }
}
