//! Unified path management for banter files.
//!
//! All configuration, secrets, and backup data live under a single
//! application directory resolved per platform:
//!
//! ```text
//! ~/.config/banter/            # Config directory
//! ├── config.toml              # Widget configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/banter/       # Data directory
//! └── backup.json              # Crash-recovery backup slot
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "banter";

/// Unified path management for banter.
pub struct BanterPaths;

impl BanterPaths {
    /// Returns the banter configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/banter/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the banter data directory.
    ///
    /// Used for larger files such as the backup slot and exports.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the path to the crash-recovery backup slot.
    pub fn backup_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("backup.json"))
    }

    /// Returns the default directory for exported transcripts.
    ///
    /// Prefers the platform download directory, falling back to the data
    /// directory.
    pub fn export_dir() -> Result<PathBuf, PathError> {
        if let Some(downloads) = dirs::download_dir() {
            return Ok(downloads);
        }
        Self::data_dir()
    }
}
