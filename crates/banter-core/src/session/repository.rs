//! Backup repository trait.
//!
//! Defines the interface for the local durability slot.

use async_trait::async_trait;

use super::model::Session;
use crate::error::Result;

/// An abstract single-slot store for the crash-recovery backup.
///
/// There is exactly one slot; every write is a full-document overwrite of
/// the previous backup, never an incremental patch. Implementations decide
/// where the slot lives (a JSON file, browser storage, a test map).
#[async_trait]
pub trait BackupRepository: Send + Sync {
    /// Overwrites the slot with the given session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written (e.g., quota or IO
    /// failure). Callers treat this as best-effort and must not crash.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Reads the slot.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: A parseable backup exists
    /// - `Ok(None)`: The slot is empty or its contents are unparseable
    /// - `Err(_)`: The slot exists but could not be read
    async fn load(&self) -> Result<Option<Session>>;
}
