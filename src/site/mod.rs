//! Static site subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → assets.rs (sanitize, resolve against build dir, stream file)
//!     → [miss falls through to proxy / fallback]
//!     → fallback.rs (entry document + build-version substitution)
//! ```
//!
//! # Design Decisions
//! - Path sanitization happens before any filesystem access
//! - Asset misses are not errors; they fall through the handler chain
//! - The entry document is read per request so deployments need no restart

pub mod assets;
pub mod fallback;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::schema::SiteConfig;

/// Read-only site state shared across requests.
#[derive(Debug)]
pub struct SiteState {
    /// Root of the compiled front-end bundle.
    pub build_dir: PathBuf,

    /// Absolute path of the entry HTML document.
    pub index_path: PathBuf,

    /// Literal marker replaced with `build_version` in the entry document.
    pub version_placeholder: String,

    /// Effective build version for this process.
    pub build_version: String,
}

impl SiteState {
    /// Build the runtime state from a validated config section.
    pub fn from_config(site: &SiteConfig) -> Self {
        let build_version = site.build_version.clone().unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0)
                .to_string()
        });

        Self {
            build_dir: site.build_dir.clone(),
            index_path: site.build_dir.join(&site.index_file),
            version_placeholder: site.version_placeholder.clone(),
            build_version,
        }
    }
}
