//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BootstrapConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "LIBRATE_DATABASE_URL";
/// Overrides `observability.log_level`.
pub const LOG_LEVEL_ENV: &str = "LIBRATE_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<BootstrapConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse and validate configuration text, reading overrides through `env`.
pub fn parse_config<F>(content: &str, env: F) -> Result<BootstrapConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: BootstrapConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut BootstrapConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
        config.database.url = url;
    }
    if let Some(level) = env(LOG_LEVEL_ENV).filter(|v| !v.is_empty()) {
        config.observability.log_level = level;
    }
}
