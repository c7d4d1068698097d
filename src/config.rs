//! Configuration loading and management
//!
//! Handles parsing of `todos.toml`, read from the store directory.
//! View selections given here are startup defaults only; the board and CLI
//! never write the current filter or sort back.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::store::{self, DEFAULT_KEY};
use crate::view::{Filter, SortKey};

/// File name of the configuration inside the store directory
pub const CONFIG_FILE: &str = "todos.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Initial view selections
    #[serde(default)]
    pub view: ViewConfig,

    /// Interactive board configuration
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Key the collection is stored under (`<key>.json`)
    #[serde(default = "default_key")]
    pub key: String,

    /// How long a writer waits for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub filter: Filter,

    #[serde(default)]
    pub sort: SortKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// How long a notification stays visible
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,

    /// Pause between marking a task for removal and asking to confirm
    #[serde(default = "default_delete_delay_ms")]
    pub delete_delay_ms: u64,
}

fn default_notification_ms() -> u64 {
    5000
}

fn default_delete_delay_ms() -> u64 {
    300
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ms: default_notification_ms(),
            delete_delay_ms: default_delete_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `todos.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the store directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        // Same rule the file store applies when it opens the key.
        store::validate_key(&self.store.key)
            .map_err(|err| Error::InvalidConfig(format!("store.key: {err}")))?;
        if self.store.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.ui.notification_ms == 0 {
            return Err(Error::InvalidConfig(
                "ui.notification_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory used when no `--store` is given.
pub fn default_store_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "todos")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::InvalidConfig(
                "cannot determine a data directory; pass --store or set TODOS_STORE".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_expected() {
        let config = Config::default();
        assert_eq!(config.store.key, "tasks");
        assert_eq!(config.store.lock_timeout_ms, 5000);
        assert_eq!(config.view.filter, Filter::All);
        assert_eq!(config.view.sort, SortKey::CreatedAt);
        assert_eq!(config.ui.notification_ms, 5000);
        assert_eq!(config.ui.delete_delay_ms, 300);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let content = r#"
[store]
key = "work"

[view]
filter = "active"
sort = "dueDate"

[ui]
notification_ms = 2000
"#;
        std::fs::write(dir.path().join(CONFIG_FILE), content).unwrap();

        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.store.key, "work");
        assert_eq!(config.store.lock_timeout_ms, 5000);
        assert_eq!(config.view.filter, Filter::Active);
        assert_eq!(config.view.sort, SortKey::DueDate);
        assert_eq!(config.ui.notification_ms, 2000);
    }

    #[test]
    fn invalid_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[store]\nkey = \"../x\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_from_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.store.key, "tasks");
    }

    #[test]
    fn key_the_store_would_reject_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[store]\nkey = \"my tasks\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::InvalidConfig(_))));
        assert_eq!(Config::load_from_dir(dir.path()).store.key, "tasks");
    }
}
