//! Backup scheduler.
//!
//! Periodically snapshots the live transcript into the durable slot so a
//! reload within the restore window can recover the conversation. Writes are
//! best-effort: a failed backup is logged, surfaced as a warning, and the
//! loop keeps ticking.

use std::sync::Arc;
use std::time::Duration;

use banter_core::notification::Notification;
use banter_core::session::{BackupRepository, TranscriptStore};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::events::{EventSender, notify};

/// Interval-driven snapshot loop over the backup slot.
pub struct BackupScheduler {
    store: Arc<RwLock<TranscriptStore>>,
    repository: Arc<dyn BackupRepository>,
    events: EventSender,
    interval: Duration,
}

impl BackupScheduler {
    pub(crate) fn new(
        store: Arc<RwLock<TranscriptStore>>,
        repository: Arc<dyn BackupRepository>,
        events: EventSender,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            repository,
            events,
            interval,
        }
    }

    /// Spawns the loop; it runs until the token is cancelled.
    ///
    /// The snapshot is taken at the instant each tick fires, so a reset
    /// between ticks simply makes the next backup cover the new session.
    pub(crate) fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of `interval` fires immediately; consume it so
            // backups start one full interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => self.run_once().await,
                }
            }
            tracing::debug!("[Backup] Scheduler stopped");
        })
    }

    async fn run_once(&self) {
        let snapshot = self.store.read().await.snapshot();
        match self.repository.save(&snapshot).await {
            Ok(()) => {
                tracing::debug!("[Backup] Session {} backed up", snapshot.session_id);
            }
            Err(e) => {
                tracing::warn!("[Backup] Failed to back up chat: {}", e);
                notify(
                    &self.events,
                    Notification::warning("⚠️ Failed to back up chat locally"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_channel;
    use banter_core::error::{BanterError, Result};
    use banter_core::notification::NotificationKind;
    use banter_core::session::{MessageRole, Session, SessionMetadata};
    use crate::events::WidgetEvent;
    use std::sync::Mutex;

    struct MemoryBackupRepository {
        slot: Mutex<Option<Session>>,
        fail: bool,
    }

    impl MemoryBackupRepository {
        fn new(fail: bool) -> Self {
            Self {
                slot: Mutex::new(None),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl BackupRepository for MemoryBackupRepository {
        async fn save(&self, session: &Session) -> Result<()> {
            if self.fail {
                return Err(BanterError::io("quota exceeded"));
            }
            *self.slot.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Option<Session>> {
            Ok(self.slot.lock().unwrap().clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_fires_on_interval() {
        let (events, _rx) = event_channel();
        let store = Arc::new(RwLock::new(TranscriptStore::new(SessionMetadata::default())));
        let repository = Arc::new(MemoryBackupRepository::new(false));
        let cancel = CancellationToken::new();

        store
            .write()
            .await
            .append(MessageRole::User, "hello", None);

        let scheduler = BackupScheduler::new(
            store.clone(),
            repository.clone(),
            events,
            Duration::from_secs(30),
        );
        let handle = scheduler.spawn(cancel.clone());

        // Nothing written before the first interval elapses.
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(repository.slot.lock().unwrap().is_none());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let backed_up = repository.slot.lock().unwrap().clone().unwrap();
        assert_eq!(backed_up.messages.len(), 1);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_overwrites_with_latest_snapshot() {
        let (events, _rx) = event_channel();
        let store = Arc::new(RwLock::new(TranscriptStore::new(SessionMetadata::default())));
        let repository = Arc::new(MemoryBackupRepository::new(false));
        let cancel = CancellationToken::new();

        let scheduler = BackupScheduler::new(
            store.clone(),
            repository.clone(),
            events,
            Duration::from_secs(30),
        );
        let handle = scheduler.spawn(cancel.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(
            repository.slot.lock().unwrap().as_ref().unwrap().messages.len(),
            0
        );

        store.write().await.append(MessageRole::Bot, "hi", None);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(
            repository.slot.lock().unwrap().as_ref().unwrap().messages.len(),
            1
        );

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_failure_warns_and_keeps_running() {
        let (events, mut rx) = event_channel();
        let store = Arc::new(RwLock::new(TranscriptStore::new(SessionMetadata::default())));
        let repository = Arc::new(MemoryBackupRepository::new(true));
        let cancel = CancellationToken::new();

        let scheduler =
            BackupScheduler::new(store, repository, events, Duration::from_secs(30));
        let handle = scheduler.spawn(cancel.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;
        match rx.recv().await.unwrap() {
            WidgetEvent::Notice(notice) => assert_eq!(notice.kind, NotificationKind::Warning),
            other => panic!("unexpected event: {:?}", other),
        }

        // Still alive after a failure: the next tick warns again.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(matches!(
            rx.recv().await.unwrap(),
            WidgetEvent::Notice(_)
        ));

        cancel.cancel();
        handle.await.unwrap();
    }
}
