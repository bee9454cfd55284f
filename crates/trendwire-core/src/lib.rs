//! Shared configuration for the trendwire workspace.
//!
//! Holds the process-wide [`AppConfig`] (credentials, timeouts, user agent,
//! RNG seed override) and its env-driven loader. Credentials are optional:
//! an absent key is a recoverable condition that makes the engine skip the
//! corresponding fetch strategy, never an error.

pub mod app_config;
pub mod config;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
