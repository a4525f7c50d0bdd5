//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a minimal (or absent) config file works.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Static site settings (build directory, entry document, versioning).
    pub site: SiteConfig,

    /// Reverse-proxy route settings.
    pub proxy: ProxyRouteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port while keeping the configured host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .bind_address
            .rsplit_once(':')
            .map_or("0.0.0.0", |(host, _)| host);
        self.bind_address = format!("{host}:{port}");
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Static site configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the compiled front-end bundle.
    pub build_dir: PathBuf,

    /// Entry HTML document, relative to `build_dir`.
    pub index_file: String,

    /// Literal marker in the entry document replaced with the build version.
    pub version_placeholder: String,

    /// Build version string. Resolved at load time when absent: the
    /// `BUILD_VERSION` environment variable, falling back to the Unix
    /// timestamp at process start.
    pub build_version: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("./build"),
            index_file: "index.html".to_string(),
            version_placeholder: "__BUILD_VERSION__".to_string(),
            build_version: None,
        }
    }
}

/// Reverse-proxy route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyRouteConfig {
    /// Path prefix that routes to the upstream (stripped before forwarding).
    pub path_prefix: String,

    /// Upstream origin, an absolute http(s) URL.
    pub upstream: String,

    /// Accept invalid/self-signed upstream TLS certificates.
    ///
    /// This is a deliberate trust relaxation for a single known upstream.
    /// It is off unless explicitly enabled.
    pub insecure_tls: bool,
}

impl Default for ProxyRouteConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/sales-agent".to_string(),
            upstream: "https://sales-agent-c3f5ecevdefjcafc.canadacentral-01.azurewebsites.net"
                .to_string(),
            insecure_tls: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is not set
    /// (e.g. "info" or "site_server=debug,tower_http=debug").
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "site_server=info,tower_http=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_port_keeps_host() {
        let mut listener = ListenerConfig {
            bind_address: "127.0.0.1:3000".to_string(),
        };
        listener.set_port(8080);
        assert_eq!(listener.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn set_port_handles_ipv6_bracket_form() {
        let mut listener = ListenerConfig {
            bind_address: "[::]:3000".to_string(),
        };
        listener.set_port(4000);
        assert_eq!(listener.bind_address, "[::]:4000");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.proxy.path_prefix, "/sales-agent");
        assert_eq!(config.site.version_placeholder, "__BUILD_VERSION__");
        assert!(!config.proxy.insecure_tls);
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let config: ServerConfig = toml::from_str(
            r#"
            [proxy]
            path_prefix = "/demo"
            upstream = "http://127.0.0.1:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.proxy.path_prefix, "/demo");
        assert_eq!(config.proxy.upstream, "http://127.0.0.1:9000");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }
}
