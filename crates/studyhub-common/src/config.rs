//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for
//! production. Config precedence: env vars > .env file > config.toml > defaults.

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// Falls back to compiled-in defaults when [`init`] was never called, so
/// embedded and test use does not require a config file.
pub fn get() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::defaults)
}

/// Initialize the global configuration from the environment.
///
/// Should be called once at application startup, before any other code
/// accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::builder()
        // Defaults
        .set_default("limits.max_message_length", 500)?
        .set_default("limits.default_max_members", 50)?
        .set_default("limits.stats_timeout_secs", 10)?
        .set_default("prefs.path", "./data/preferences.json")?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (STUDYHUB__LIMITS__MAX_MESSAGE_LENGTH, etc.)
        .add_source(
            config::Environment::with_prefix("STUDYHUB")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub limits: LimitsConfig,
    pub prefs: PrefsConfig,
}

impl AppConfig {
    fn defaults() -> Self {
        Self {
            limits: LimitsConfig {
                max_message_length: 500,
                default_max_members: 50,
                stats_timeout_secs: 10,
            },
            prefs: PrefsConfig {
                path: "./data/preferences.json".into(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Maximum chat message length in characters.
    pub max_message_length: usize,
    /// Member cap applied to new courses when the creator leaves it blank.
    pub default_max_members: u32,
    /// Profile stats aggregation races this timeout and falls back to zeroes.
    pub stats_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PrefsConfig {
    /// Where local UI preferences (theme, notification toggle) are persisted.
    pub path: String,
}
