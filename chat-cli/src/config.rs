//! Configuration management for chat-cli.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_poll_interval_secs() -> u64 {
    2
}

/// Client configuration stored in the data directory.
///
/// Every field has a default, so a missing file just means defaults.
/// Command-line flags override whatever the file says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between polling ticks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Log file path. Relative paths resolve against the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load the configuration from a directory, falling back to defaults
    /// when the file does not exist.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.json");
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).context("Invalid configuration file"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error).context("Failed to read configuration file"),
        }
    }

    /// Save the configuration to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join("config.json");
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save configuration file")?;
        Ok(())
    }

    /// The log file path, resolved against the data directory.
    pub fn log_path(&self, data_dir: &Path) -> PathBuf {
        match &self.log_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join("chat-cli.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.poll_interval_secs, 2);
        assert!(config.log_file.is_none());
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            poll_interval_secs: 5,
            log_file: Some(PathBuf::from("custom.log")),
        };
        config.save(dir.path()).await.unwrap();

        let loaded = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded.poll_interval_secs, 5);
        assert_eq!(loaded.log_path(dir.path()), dir.path().join("custom.log"));
    }

    #[tokio::test]
    async fn invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("config.json"), "not json")
            .await
            .unwrap();
        assert!(AppConfig::load(dir.path()).await.is_err());
    }

    #[test]
    fn default_log_path_lives_in_data_dir() {
        let config = AppConfig::default();
        assert_eq!(
            config.log_path(Path::new("/data")),
            PathBuf::from("/data/chat-cli.log")
        );
    }
}
