//! Configuration and secrets loading.
//!
//! Widget configuration comes from `config.toml` (missing file means
//! defaults); secrets come from `secret.json` (missing file is an error,
//! surfaced without echoing any key material).

use std::path::{Path, PathBuf};

use banter_core::config::{SecretConfig, WidgetConfig};
use banter_core::error::{BanterError, Result};

use crate::paths::BanterPaths;

/// Loads widget configuration from a TOML file.
///
/// # Returns
///
/// - `Ok(WidgetConfig)`: Parsed configuration, or defaults when the file
///   does not exist or is empty
/// - `Err(_)`: The file exists but could not be read or parsed
pub fn load_widget_config(path: impl AsRef<Path>) -> Result<WidgetConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(WidgetConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(WidgetConfig::default());
    }

    let config: WidgetConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Loads widget configuration from the default platform location.
pub fn load_default_widget_config() -> Result<WidgetConfig> {
    let path = BanterPaths::config_file().map_err(|e| BanterError::config(e.to_string()))?;
    load_widget_config(path)
}

/// Loader for the secrets file.
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    /// Creates a loader over an explicit secrets path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a loader at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let path = BanterPaths::secret_file().map_err(|e| BanterError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    /// Whether the secrets file exists.
    pub async fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the secret configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is missing or unparseable.
    /// Error messages never contain key material.
    pub async fn load(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Err(BanterError::config(format!(
                "secret file not found: {}",
                self.path.display()
            )));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let secrets: SecretConfig = serde_json::from_str(&content)
            .map_err(|e| BanterError::config(format!("failed to parse secret file: {}", e)))?;
        Ok(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_widget_config(dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backup_interval_secs, 30);
    }

    #[test]
    fn test_config_overrides_are_applied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "greeting = \"Hello!\"\ntyping_tick_ms = 5\n").unwrap();

        let config = load_widget_config(&path).unwrap();
        assert_eq!(config.greeting, "Hello!");
        assert_eq!(config.typing_tick_ms, 5);
        assert_eq!(config.thinking_delay_ms, 500);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "typing_tick_ms = \"fast\"\n").unwrap();

        assert!(load_widget_config(&path).is_err());
    }

    #[tokio::test]
    async fn test_secret_store_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": {"api_key": "k-abc"}}"#).unwrap();

        let store = SecretStore::new(&path);
        assert!(store.exists().await);
        let secrets = store.load().await.unwrap();
        assert_eq!(secrets.gemini.unwrap().api_key, "k-abc");
    }

    #[tokio::test]
    async fn test_secret_store_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path().join("secret.json"));

        let err = store.load().await.unwrap_err();
        assert!(err.is_config());
    }
}
