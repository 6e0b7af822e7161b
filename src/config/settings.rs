//! Persistent viewer settings.
//!
//! Read from `settings.json` in the config directory. A missing file means
//! defaults; a malformed one is an error so typos are not silently ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::XdgDirs;
use crate::document::DEFAULT_MAX_WALK_DEPTH;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn default_max_walk_depth() -> usize {
    DEFAULT_MAX_WALK_DEPTH
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Attach the hierarchy tracer to every page.
    pub debug_trace: bool,

    /// Bound on ancestor walks.
    #[serde(default = "default_max_walk_depth")]
    pub max_walk_depth: usize,

    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_trace: false,
            max_walk_depth: DEFAULT_MAX_WALK_DEPTH,
            log_filter: None,
        }
    }
}

impl Settings {
    /// Load from the default XDG location.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&XdgDirs::new().settings_file())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
