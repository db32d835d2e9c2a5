//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw storage configuration from TOML
///
/// # Example
///
/// ```toml
/// [storage]
/// data_dir = "~/.local/share/parley"
/// debounce_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Defaults to the platform data directory
    pub data_dir: Option<PathBuf>,
    pub debounce_ms: u64,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            debounce_ms: 500,
        }
    }
}

impl FileStorageConfig {
    /// Directory session data lives in.
    ///
    /// A leading `~/` is expanded against the home directory. Falls back to
    /// `./.parley` when no platform data directory exists.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => expand_home(dir),
            None => dirs::data_dir()
                .map(|d| d.join("parley"))
                .unwrap_or_else(|| PathBuf::from(".parley")),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_is_used_verbatim() {
        let config = FileStorageConfig {
            data_dir: Some(PathBuf::from("/tmp/parley-data")),
            ..Default::default()
        };
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/parley-data"));
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        let dir = FileStorageConfig::default().resolved_data_dir();
        assert!(dir.ends_with("parley") || dir.ends_with(".parley"));
    }
}
