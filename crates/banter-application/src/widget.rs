//! Chat widget facade.
//!
//! `ChatWidget` owns the transcript store and every background task around
//! it, and exposes the capability surface an embedding page drives:
//! snapshot, clear, export, connect/disconnect sync, submit, and the
//! keyboard-shortcut command dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use banter_core::config::WidgetConfig;
use banter_core::error::{BanterError, Result};
use banter_core::inference::InferenceAgent;
use banter_core::notification::Notification;
use banter_core::session::{
    BackupRepository, FileRef, MessageRole, Session, SessionMetadata, TranscriptStore,
};
use banter_core::sync::RemoteStoreConnector;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backup::BackupScheduler;
use crate::composer::Composer;
use crate::events::{EventSender, WidgetEvent, event_channel, notify};
use crate::export;
use crate::pipeline::ResponsePipeline;
use crate::sync_adapter::RemoteSyncAdapter;

/// Keyboard-shortcut commands forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCommand {
    /// Export the transcript to a file.
    ExportTranscript,
    /// Clear the transcript; requires confirmation.
    ClearTranscript { confirmed: bool },
    /// Insert an emoji at the composer cursor.
    InsertEmoji(String),
    /// Stage a file for the next submission.
    AttachFile(FileRef),
    /// Remove the staged file.
    RemoveFile,
    /// Connect remote sync with the given JSON configuration.
    ConnectSync { config: String },
    /// Disconnect remote sync.
    DisconnectSync,
}

/// Result of dispatching a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command completed.
    Done,
    /// A destructive command was issued without confirmation.
    ConfirmationRequired,
    /// The transcript was exported to this path.
    Exported(PathBuf),
}

/// The embeddable chat widget core.
pub struct ChatWidget {
    store: Arc<RwLock<TranscriptStore>>,
    composer: Mutex<Composer>,
    pipeline: ResponsePipeline,
    sync: Arc<RemoteSyncAdapter>,
    backup_repository: Arc<dyn BackupRepository>,
    events: EventSender,
    config: WidgetConfig,
    cancel: CancellationToken,
    backup_task: Mutex<Option<JoinHandle<()>>>,
}

impl ChatWidget {
    /// Wires a widget from its collaborators.
    ///
    /// The widget starts with a fresh session; call [`ChatWidget::start`] to
    /// attempt a backup restore and launch the background tasks.
    pub fn new(
        config: WidgetConfig,
        metadata: SessionMetadata,
        agent: Arc<dyn InferenceAgent>,
        connector: Arc<dyn RemoteStoreConnector>,
        backup_repository: Arc<dyn BackupRepository>,
    ) -> Self {
        let (events, _) = event_channel();
        let store = Arc::new(RwLock::new(TranscriptStore::new(metadata)));
        let sync = Arc::new(RemoteSyncAdapter::new(connector, events.clone()));
        let cancel = CancellationToken::new();
        let pipeline = ResponsePipeline::new(
            store.clone(),
            agent,
            sync.clone(),
            events.clone(),
            config.clone(),
            cancel.clone(),
        );

        Self {
            store,
            composer: Mutex::new(Composer::new(config.max_attachment_bytes)),
            pipeline,
            sync,
            backup_repository,
            events,
            config,
            cancel,
            backup_task: Mutex::new(None),
        }
    }

    /// Starts the widget: backup restore, greeting, backup loop.
    ///
    /// A backup within the restore window replaces the fresh session; a
    /// missing, corrupt, or stale one is ignored and left on disk. Restore
    /// failures never block startup.
    pub async fn start(&self) {
        match self.backup_repository.load().await {
            Ok(Some(backup)) => {
                let window = chrono::Duration::hours(self.config.restore_window_hours);
                if backup.is_within(window) {
                    tracing::info!(
                        "[Widget] Restored session {} from backup",
                        backup.session_id
                    );
                    let session_id = backup.session_id.clone();
                    *self.store.write().await = TranscriptStore::from_session(backup);
                    let _ = self.events.send(WidgetEvent::SessionReplaced { session_id });
                } else {
                    tracing::info!("[Widget] Ignoring stale backup");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("[Widget] Failed to read backup slot: {}", e);
            }
        }

        // Fresh sessions open with the greeting.
        if self.store.read().await.is_empty() && !self.config.greeting.is_empty() {
            self.pipeline
                .record(MessageRole::Bot, self.config.greeting.clone(), None)
                .await;
        }

        let scheduler = BackupScheduler::new(
            self.store.clone(),
            self.backup_repository.clone(),
            self.events.clone(),
            std::time::Duration::from_secs(self.config.backup_interval_secs),
        );
        let handle = scheduler.spawn(self.cancel.child_token());
        *self.backup_task.lock().await = Some(handle);
    }

    /// Stops the background tasks. In-flight exchanges are abandoned.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.backup_task.lock().await.take() {
            let _ = handle.await;
        }
        tracing::debug!("[Widget] Shut down");
    }

    /// Subscribes to the widget event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Capability surface for embedding pages
    // ------------------------------------------------------------------

    /// Immutable copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.store.read().await.snapshot()
    }

    /// Replaces the session with a fresh one.
    ///
    /// # Returns
    ///
    /// The new session id.
    pub async fn clear(&self) -> String {
        let session_id = self.store.write().await.reset();
        tracing::info!("[Widget] Chat history cleared, new session {}", session_id);
        let _ = self.events.send(WidgetEvent::SessionReplaced {
            session_id: session_id.clone(),
        });
        session_id
    }

    /// Renders the downloadable transcript artifact.
    pub async fn export_json(&self) -> Result<String> {
        export::export_json(&self.snapshot().await)
    }

    /// Writes the transcript artifact to the configured export directory.
    pub async fn export_to_file(&self) -> Result<PathBuf> {
        let dir = match &self.config.export_dir {
            Some(dir) => dir.clone(),
            None => banter_infrastructure::BanterPaths::export_dir()
                .map_err(|e| BanterError::io(e.to_string()))?,
        };
        export::export_to_file(&self.snapshot().await, &dir).await
    }

    /// Connects remote sync with the user-supplied JSON configuration.
    pub async fn connect_sync(&self, config_text: &str) -> Result<()> {
        let snapshot = self.snapshot().await;
        self.sync.connect(config_text, snapshot).await
    }

    /// Disconnects remote sync. Idempotent.
    pub async fn disconnect_sync(&self) {
        self.sync.disconnect().await;
    }

    /// Whether remote sync is connected.
    pub async fn is_sync_connected(&self) -> bool {
        self.sync.is_connected().await
    }

    /// Fetches a mirrored session by id (cross-device resume).
    pub async fn load_remote(&self, session_id: &str) -> Result<Option<Session>> {
        self.sync.load_by_key(session_id).await
    }

    // ------------------------------------------------------------------
    // Composer surface
    // ------------------------------------------------------------------

    /// Replaces the draft text.
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.composer.lock().await.set_draft(text);
    }

    /// Moves the composer cursor.
    pub async fn set_cursor(&self, offset: usize) {
        self.composer.lock().await.set_cursor(offset);
    }

    /// Stages a file for the next submission.
    ///
    /// # Errors
    ///
    /// Oversized files are rejected with a validation error and surfaced as
    /// an error notification; any previously staged file is kept.
    pub async fn attach_file(&self, file: FileRef) -> Result<()> {
        if let Err(e) = self.composer.lock().await.attach(file) {
            notify(&self.events, Notification::error(e.to_string()));
            return Err(BanterError::Validation(e.to_string()));
        }
        Ok(())
    }

    /// Removes the staged file.
    pub async fn remove_file(&self) {
        self.composer.lock().await.remove_attachment();
    }

    /// Submits the pending draft/attachment as a new exchange.
    ///
    /// # Returns
    ///
    /// The exchange id, or `None` for a blank submission (nothing happens).
    pub async fn submit(&self) -> Option<String> {
        let submission = self.composer.lock().await.take_submission()?;
        Some(self.pipeline.submit(submission).await)
    }

    /// Convenience for hosts that manage their own input box: sets the
    /// draft and submits it in one step.
    pub async fn submit_text(&self, text: impl Into<String>) -> Option<String> {
        self.set_draft(text).await;
        self.submit().await
    }

    // ------------------------------------------------------------------
    // Command dispatch (keyboard-shortcut surface)
    // ------------------------------------------------------------------

    /// Dispatches a host command.
    ///
    /// # Errors
    ///
    /// Propagates the underlying operation's error; every failure has
    /// already been surfaced as a notification by the time it returns.
    pub async fn handle_command(&self, command: WidgetCommand) -> Result<CommandOutcome> {
        match command {
            WidgetCommand::ExportTranscript => {
                let path = self.export_to_file().await?;
                notify(
                    &self.events,
                    Notification::success("📥 Chat history exported!"),
                );
                Ok(CommandOutcome::Exported(path))
            }
            WidgetCommand::ClearTranscript { confirmed: false } => {
                Ok(CommandOutcome::ConfirmationRequired)
            }
            WidgetCommand::ClearTranscript { confirmed: true } => {
                self.clear().await;
                notify(&self.events, Notification::info("🗑️ Chat history cleared!"));
                Ok(CommandOutcome::Done)
            }
            WidgetCommand::InsertEmoji(emoji) => {
                self.composer.lock().await.insert_emoji(&emoji);
                Ok(CommandOutcome::Done)
            }
            WidgetCommand::AttachFile(file) => {
                self.attach_file(file).await?;
                Ok(CommandOutcome::Done)
            }
            WidgetCommand::RemoveFile => {
                self.remove_file().await;
                Ok(CommandOutcome::Done)
            }
            WidgetCommand::ConnectSync { config } => {
                self.connect_sync(&config).await?;
                Ok(CommandOutcome::Done)
            }
            WidgetCommand::DisconnectSync => {
                self.disconnect_sync().await;
                Ok(CommandOutcome::Done)
            }
        }
    }
}
