// Config module for locating the catalog and choosing a store backend

use crate::constants::{CATALOG_FILE, CONFIG_FILE, DEFAULT_STORAGE_TIMEOUT_MS, DIR_ENV};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub store: StoreKind,
    /// Deadline for each storage call; `None` waits forever
    pub storage_timeout: Option<Duration>,
    pub user_agent: String,
}

/// Optional overrides read from `updraft.toml` in the data directory
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    store: Option<StoreKind>,
    storage_timeout_ms: Option<u64>,
    user_agent: Option<String>,
}

pub fn config_dir() -> PathBuf {
    std::env::var(DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

impl Config {
    /// Resolve configuration from the environment and the optional config file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(config_dir())
    }

    pub fn load_from(data_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.into();
        let path = data_dir.join(CONFIG_FILE);
        let file = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", path.display(), e))?
        } else {
            ConfigFile::default()
        };

        let timeout_ms = file.storage_timeout_ms.unwrap_or(DEFAULT_STORAGE_TIMEOUT_MS);
        Ok(Self {
            data_dir,
            store: file.store.unwrap_or_default(),
            storage_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            user_agent: file
                .user_agent
                .unwrap_or_else(|| concat!("updraft/", env!("CARGO_PKG_VERSION")).to_string()),
        })
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.store, StoreKind::File);
        assert_eq!(config.storage_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(config.catalog_path(), dir.path().join("catalog.toml"));
        assert!(config.user_agent.starts_with("updraft/"));
    }

    #[test]
    fn test_config_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("updraft.toml"),
            "store = \"memory\"\nstorage_timeout_ms = 0\nuser_agent = \"probe/1\"\n",
        )
        .unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.storage_timeout, None);
        assert_eq!(config.user_agent, "probe/1");
    }

    #[test]
    fn test_invalid_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("updraft.toml"), "store = \"redis\"\n").unwrap();
        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(err.to_string().contains("updraft.toml"));
    }
}
