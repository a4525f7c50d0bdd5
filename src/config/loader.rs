//! Configuration loading.
//!
//! Loads the optional TOML file, overlays environment variables (`PORT`,
//! `BUILD_VERSION`), resolves the build version fallback, and validates.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid PORT value {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid configuration: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate the server configuration.
///
/// Precedence, lowest to highest: built-in defaults, the TOML file (when
/// given), then the `PORT` and `BUILD_VERSION` environment variables. A
/// missing build version defaults to the Unix timestamp at load time, so
/// every process start gets a distinct cache-busting value.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let mut config: ServerConfig = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    if config.site.build_version.is_none() {
        config.site.build_version = Some(unix_timestamp());
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto a loaded configuration.
///
/// The lookup is injected so tests do not race on the process environment.
fn apply_env_overrides<F>(config: &mut ServerConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env("PORT") {
        let port = value
            .parse::<u16>()
            .map_err(|source| ConfigError::InvalidPort { value, source })?;
        config.listener.set_port(port);
    }

    if let Some(version) = env("BUILD_VERSION") {
        config.site.build_version = Some(version);
    }

    Ok(())
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_env_overrides_listener() {
        let mut config = ServerConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "PORT").then(|| "8123".to_string())
        })
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");
    }

    #[test]
    fn invalid_port_env_is_an_error() {
        let mut config = ServerConfig::default();
        let err = apply_env_overrides(&mut config, |key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn build_version_env_wins_over_file_value() {
        let mut config = ServerConfig::default();
        config.site.build_version = Some("from-file".to_string());
        apply_env_overrides(&mut config, |key| {
            (key == "BUILD_VERSION").then(|| "42".to_string())
        })
        .unwrap();
        assert_eq!(config.site.build_version.as_deref(), Some("42"));
    }

    #[test]
    fn timestamp_fallback_is_numeric() {
        let stamp = unix_timestamp();
        assert!(stamp.parse::<u64>().is_ok());
        assert!(stamp.parse::<u64>().unwrap() > 1_700_000_000);
    }
}
