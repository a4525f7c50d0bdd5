//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the proxy route is well-formed (prefix shape, upstream URL)
//! - Check the site section names a usable entry document
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("proxy.path_prefix must start with '/' and name a segment, got {0:?}")]
    BadProxyPrefix(String),

    #[error("proxy.upstream must be an absolute http(s) URL, got {0:?}")]
    BadUpstream(String),

    #[error("site.index_file must be a bare file name, got {0:?}")]
    BadIndexFile(String),

    #[error("site.version_placeholder must not be empty")]
    EmptyPlaceholder,

    #[error("site.build_dir must not be empty")]
    EmptyBuildDir,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.proxy.path_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ValidationError::BadProxyPrefix(prefix.clone()));
    }

    match Url::parse(&config.proxy.upstream) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::BadUpstream(config.proxy.upstream.clone())),
    }

    let index = &config.site.index_file;
    if index.is_empty() || index.contains('/') || index.contains('\\') {
        errors.push(ValidationError::BadIndexFile(index.clone()));
    }

    if config.site.version_placeholder.is_empty() {
        errors.push(ValidationError::EmptyPlaceholder);
    }

    if config.site.build_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyBuildDir);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
