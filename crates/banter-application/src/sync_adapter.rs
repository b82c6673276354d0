//! Remote sync adapter.
//!
//! Drives the `Disconnected -> Connecting -> Connected -> Disconnected`
//! lifecycle around the `RemoteStore` capability. Sync itself is
//! fire-and-forget: a failed mirror write is logged and surfaced as a
//! transient warning, and never rolls back or blocks the local transcript.

use std::sync::Arc;

use banter_core::error::{BanterError, Result};
use banter_core::notification::Notification;
use banter_core::session::Session;
use banter_core::sync::{RemoteStore, RemoteStoreConnector, SyncConfig};
use tokio::sync::RwLock;

use crate::events::{EventSender, WidgetEvent, notify};

enum SyncState {
    Disconnected,
    Connecting,
    Connected {
        store: Arc<dyn RemoteStore>,
        config: SyncConfig,
    },
}

/// Connection lifecycle and mirroring around a remote document store.
pub struct RemoteSyncAdapter {
    connector: Arc<dyn RemoteStoreConnector>,
    state: RwLock<SyncState>,
    events: EventSender,
}

impl RemoteSyncAdapter {
    /// Creates a disconnected adapter.
    pub fn new(connector: Arc<dyn RemoteStoreConnector>, events: EventSender) -> Self {
        Self {
            connector,
            state: RwLock::new(SyncState::Disconnected),
            events,
        }
    }

    /// Connects using the user-supplied JSON configuration.
    ///
    /// Validates the configuration before any state change, establishes the
    /// client handle, and on success immediately mirrors the given snapshot.
    /// On any failure the adapter stays (or returns to) Disconnected and the
    /// transcript is untouched.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparseable/incomplete config or a
    /// connect attempt while one is already in flight, and a sync error when
    /// the handle cannot be established. All failures are also surfaced as
    /// error notifications.
    pub async fn connect(&self, config_text: &str, initial_snapshot: Session) -> Result<()> {
        let config = match SyncConfig::from_json(config_text) {
            Ok(config) => config,
            Err(e) => {
                notify(
                    &self.events,
                    Notification::error("❌ Invalid sync configuration format"),
                );
                return Err(e.into());
            }
        };

        {
            let mut state = self.state.write().await;
            match *state {
                SyncState::Connecting => {
                    return Err(BanterError::config("a connect attempt is already in flight"));
                }
                SyncState::Connected { .. } => {
                    return Err(BanterError::config("remote sync is already connected"));
                }
                SyncState::Disconnected => *state = SyncState::Connecting,
            }
        }

        match self.connector.connect(&config).await {
            Ok(store) => {
                {
                    let mut state = self.state.write().await;
                    *state = SyncState::Connected { store, config };
                }
                tracing::info!("[RemoteSync] Connected");
                let _ = self
                    .events
                    .send(WidgetEvent::SyncStateChanged { connected: true });
                notify(
                    &self.events,
                    Notification::success("✅ Remote sync connected successfully!"),
                );

                // Full snapshot sync right after connecting.
                self.sync(initial_snapshot).await;
                Ok(())
            }
            Err(e) => {
                {
                    let mut state = self.state.write().await;
                    *state = SyncState::Disconnected;
                }
                tracing::warn!("[RemoteSync] Connection failed: {}", e);
                notify(
                    &self.events,
                    Notification::error(format!("❌ Remote sync connection failed: {}", e)),
                );
                Err(e.into())
            }
        }
    }

    /// Mirrors a snapshot to the remote document keyed by its session id.
    ///
    /// No-op when not connected. Failures are logged and surfaced as a
    /// transient warning; connection and transcript state are unchanged.
    pub async fn sync(&self, snapshot: Session) {
        let (store, collection) = {
            let state = self.state.read().await;
            match &*state {
                SyncState::Connected { store, config } => {
                    (store.clone(), config.collection.clone())
                }
                _ => return,
            }
        };

        let stamp = chrono::Utc::now().to_rfc3339();
        match store.upsert(&snapshot, &stamp).await {
            Ok(()) => {
                tracing::debug!(
                    "[RemoteSync] Mirrored session {} to collection {}",
                    snapshot.session_id,
                    collection
                );
            }
            Err(e) => {
                tracing::warn!(
                    "[RemoteSync] Failed to mirror session {}: {}",
                    snapshot.session_id,
                    e
                );
                notify(
                    &self.events,
                    Notification::warning("⚠️ Failed to save chat to remote store"),
                );
            }
        }
    }

    /// Drops the stored config and client handle. Idempotent.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write().await;
            if matches!(*state, SyncState::Disconnected) {
                return;
            }
            *state = SyncState::Disconnected;
        }
        tracing::info!("[RemoteSync] Disconnected");
        let _ = self
            .events
            .send(WidgetEvent::SyncStateChanged { connected: false });
        notify(
            &self.events,
            Notification::info("🔌 Disconnected from remote sync"),
        );
    }

    /// Fetches a stored snapshot by session id (cross-device resume).
    ///
    /// # Returns
    ///
    /// `Ok(None)` when not connected or no document exists under the id.
    pub async fn load_by_key(&self, session_id: &str) -> Result<Option<Session>> {
        let store = {
            let state = self.state.read().await;
            match &*state {
                SyncState::Connected { store, .. } => store.clone(),
                _ => return Ok(None),
            }
        };

        store.fetch(session_id).await.map_err(Into::into)
    }

    /// Whether the adapter currently holds a connected handle.
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.read().await, SyncState::Connected { .. })
    }
}
