//! XDG Base Directory support.

use std::path::PathBuf;

/// XDG directory paths for logpage.
pub struct XdgDirs {
    /// Config directory (~/.config/logpage or XDG_CONFIG_HOME/logpage)
    pub config: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            config: std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".config"))
                .join("logpage"),
        }
    }

    /// Default settings file location.
    pub fn settings_file(&self) -> PathBuf {
        self.config.join("settings.json")
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
