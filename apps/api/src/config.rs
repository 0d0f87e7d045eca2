use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,https://resume-shortlist-ui.vercel.app";

/// Application configuration loaded from environment variables.
///
/// Nothing here is required: a missing API key leaves the service running
/// but every processing request is rejected until it is configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_model: String,
    /// `None` means model calls may wait indefinitely.
    pub llm_timeout: Option<Duration>,
    /// `None` means unbounded fan-out within a request.
    pub max_concurrent_files: Option<usize>,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_timeout_secs: u64 = parse_or(
            non_blank("LLM_TIMEOUT_SECS"),
            "LLM_TIMEOUT_SECS",
            DEFAULT_LLM_TIMEOUT_SECS,
        )?;
        let max_concurrent_files: usize =
            parse_or(non_blank("MAX_CONCURRENT_FILES"), "MAX_CONCURRENT_FILES", 0)?;

        Ok(Config {
            // OPEN_API_KEY is the legacy name.
            openai_api_key: non_blank("OPENAI_API_KEY").or_else(|| non_blank("OPEN_API_KEY")),
            openai_base_url: non_blank("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_model: non_blank("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout: (llm_timeout_secs > 0).then(|| Duration::from_secs(llm_timeout_secs)),
            max_concurrent_files: (max_concurrent_files > 0).then_some(max_concurrent_files),
            max_upload_bytes: parse_or(
                non_blank("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            cors_allowed_origins: non_blank("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            port: parse_or(non_blank("PORT"), "PORT", 8000)
                .context("PORT must be a valid port number")?,
            rust_log: non_blank("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.llm_model, "gpt-4o-mini");
        assert_eq!(config.llm_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.max_concurrent_files, None);
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn test_legacy_key_name_is_accepted() {
        let config = config_from(&[("OPEN_API_KEY", "sk-legacy")]).unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-legacy"));
    }

    #[test]
    fn test_primary_key_wins_over_legacy_key() {
        let config =
            config_from(&[("OPENAI_API_KEY", "sk-new"), ("OPEN_API_KEY", "sk-old")]).unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-new"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_zero_disables_timeout_and_concurrency_bound() {
        let config =
            config_from(&[("LLM_TIMEOUT_SECS", "0"), ("MAX_CONCURRENT_FILES", "0")]).unwrap();
        assert_eq!(config.llm_timeout, None);
        assert_eq!(config.max_concurrent_files, None);
    }

    #[test]
    fn test_concurrency_bound_is_parsed() {
        let config = config_from(&[("MAX_CONCURRENT_FILES", "4")]).unwrap();
        assert_eq!(config.max_concurrent_files, Some(4));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config =
            config_from(&[("CORS_ALLOWED_ORIGINS", " https://a.example , ,https://b.example")])
                .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_trailing_slash_is_stripped_from_base_url() {
        let config = config_from(&[("OPENAI_BASE_URL", "http://localhost:9999/v1/")]).unwrap();
        assert_eq!(config.openai_base_url, "http://localhost:9999/v1");
    }
}
