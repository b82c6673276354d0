//! Single-slot JSON backup repository.
//!
//! Persists the full session snapshot to one named file so a reload within
//! the restore window can pick the conversation back up. Every write is a
//! full-document overwrite performed atomically (tmp file + fsync + rename);
//! there are no partial or incremental writes.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use banter_core::error::{BanterError, Result};
use banter_core::session::{BackupRepository, Session};

use crate::paths::BanterPaths;

/// File-backed implementation of the backup slot.
pub struct JsonBackupRepository {
    path: PathBuf,
}

impl JsonBackupRepository {
    /// Creates a repository over an explicit slot path.
    ///
    /// The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Creates a repository at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined or
    /// created.
    pub fn default_location() -> Result<Self> {
        let path = BanterPaths::backup_file()
            .map_err(|e| BanterError::io(e.to_string()))?;
        Self::new(path)
    }

    /// The slot path (for diagnostics and tests).
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(path: &Path, contents: &str) -> Result<()> {
        let tmp_path = path.with_extension("json.tmp");

        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl BackupRepository for JsonBackupRepository {
    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || Self::write_atomic(&path, &json))
            .await
            .map_err(|e| BanterError::internal(format!("backup write task failed: {}", e)))?
    }

    async fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        // A corrupt slot never blocks startup; the stale file stays on disk.
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("[Backup] Ignoring unparseable backup slot: {}", e);
                Ok(None)
            }
        }
    }
}
