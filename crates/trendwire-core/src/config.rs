use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric env var fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric env var fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("TRENDWIRE_LOG_LEVEL", "info");

    let newsdata_api_key = lookup("TRENDWIRE_NEWSDATA_API_KEY").ok();
    let youtube_api_key = lookup("TRENDWIRE_YOUTUBE_API_KEY").ok();
    let llm_api_url = lookup("TRENDWIRE_LLM_API_URL").ok();
    let llm_api_key = lookup("TRENDWIRE_LLM_API_KEY").ok();

    let request_timeout_secs = parse_u64("TRENDWIRE_REQUEST_TIMEOUT_SECS", "10")?;
    let probe_timeout_secs = parse_u64("TRENDWIRE_PROBE_TIMEOUT_SECS", "5")?;
    let user_agent = or_default("TRENDWIRE_USER_AGENT", "trendwire/0.1 (trend-aggregation)");
    let forum_inter_request_delay_ms = parse_u64("TRENDWIRE_FORUM_INTER_REQUEST_DELAY_MS", "150")?;

    let rng_seed = match lookup("TRENDWIRE_RNG_SEED") {
        Ok(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "TRENDWIRE_RNG_SEED".to_string(),
            reason: e.to_string(),
        })?),
        Err(_) => None,
    };

    Ok(AppConfig {
        log_level,
        newsdata_api_key,
        youtube_api_key,
        llm_api_url,
        llm_api_key,
        request_timeout_secs,
        probe_timeout_secs,
        user_agent,
        forum_inter_request_delay_ms,
        rng_seed,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn empty_env_yields_defaults_and_no_credentials() {
        let map: HashMap<&str, &str> = HashMap::new();
        let config = build_app_config(lookup_from_map(&map)).expect("defaults should load");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.forum_inter_request_delay_ms, 150);
        assert!(config.newsdata_api_key.is_none());
        assert!(config.youtube_api_key.is_none());
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn credentials_are_picked_up_when_present() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TRENDWIRE_NEWSDATA_API_KEY", "nd-key");
        map.insert("TRENDWIRE_YOUTUBE_API_KEY", "yt-key");
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(config.newsdata_api_key.as_deref(), Some("nd-key"));
        assert_eq!(config.youtube_api_key.as_deref(), Some("yt-key"));
    }

    #[test]
    fn invalid_timeout_fails() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TRENDWIRE_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "TRENDWIRE_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar, got: {result:?}"
        );
    }

    #[test]
    fn rng_seed_parses_when_set() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TRENDWIRE_RNG_SEED", "42");
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn invalid_rng_seed_fails() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TRENDWIRE_RNG_SEED", "forty-two");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRENDWIRE_RNG_SEED"
        ));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TRENDWIRE_NEWSDATA_API_KEY", "super-secret");
        let config = build_app_config(lookup_from_map(&map)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"), "key leaked: {debug}");
        assert!(debug.contains("[redacted]"));
    }
}
