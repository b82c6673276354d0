//! End-to-end widget scenarios over mock collaborators.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use banter_application::{
    APOLOGY, ChatWidget, CommandOutcome, ExchangeOutcome, WidgetCommand, WidgetEvent,
};
use banter_core::config::WidgetConfig;
use banter_core::error::Result;
use banter_core::inference::{InferenceAgent, InferenceError};
use banter_core::session::{
    BackupRepository, MessageRole, Session, SessionMetadata, TranscriptStore,
};
use banter_core::sync::{RemoteStore, RemoteStoreConnector, SyncConfig, SyncError};
use tokio::sync::broadcast;

const VALID_SYNC_CONFIG: &str = r#"{"endpoint": "https://store.example"}"#;

struct MockAgent {
    reply: std::result::Result<String, InferenceError>,
    calls: AtomicUsize,
}

impl MockAgent {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(InferenceError::Status {
                status: 503,
                message: "overloaded".to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl InferenceAgent for MockAgent {
    async fn generate(&self, _prompt: &str) -> std::result::Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

#[derive(Default)]
struct MockStore {
    documents: Mutex<Vec<Session>>,
}

#[async_trait::async_trait]
impl RemoteStore for MockStore {
    async fn upsert(
        &self,
        session: &Session,
        _last_updated: &str,
    ) -> std::result::Result<(), SyncError> {
        self.documents.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> std::result::Result<Option<Session>, SyncError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.session_id == session_id)
            .cloned())
    }
}

struct MockConnector {
    store: Arc<MockStore>,
}

#[async_trait::async_trait]
impl RemoteStoreConnector for MockConnector {
    async fn connect(
        &self,
        _config: &SyncConfig,
    ) -> std::result::Result<Arc<dyn RemoteStore>, SyncError> {
        Ok(self.store.clone())
    }
}

#[derive(Default)]
struct MemoryBackupRepository {
    slot: Mutex<Option<Session>>,
}

impl MemoryBackupRepository {
    fn preloaded(session: Session) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Some(session)),
        })
    }
}

#[async_trait::async_trait]
impl BackupRepository for MemoryBackupRepository {
    async fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().unwrap().clone())
    }
}

struct Harness {
    widget: ChatWidget,
    agent: Arc<MockAgent>,
    store: Arc<MockStore>,
    backup: Arc<MemoryBackupRepository>,
}

fn harness_with(
    config: WidgetConfig,
    agent: Arc<MockAgent>,
    backup: Arc<MemoryBackupRepository>,
) -> Harness {
    let store = Arc::new(MockStore::default());
    let widget = ChatWidget::new(
        config,
        SessionMetadata {
            user_agent: "TestAgent/1.0".to_string(),
            locale: "en-US".to_string(),
            timezone: "UTC".to_string(),
        },
        agent.clone(),
        Arc::new(MockConnector {
            store: store.clone(),
        }),
        backup.clone(),
    );
    Harness {
        widget,
        agent,
        store,
        backup,
    }
}

fn harness(agent: Arc<MockAgent>) -> Harness {
    harness_with(
        WidgetConfig::default(),
        agent,
        Arc::new(MemoryBackupRepository::default()),
    )
}

async fn wait_settled(
    rx: &mut broadcast::Receiver<WidgetEvent>,
    exchange_id: &str,
) -> ExchangeOutcome {
    loop {
        if let WidgetEvent::ExchangeSettled {
            exchange_id: id,
            outcome,
        } = rx.recv().await.unwrap()
            && id == exchange_id
        {
            return outcome;
        }
    }
}

fn backup_started_hours_ago(hours: i64) -> Session {
    let mut store = TranscriptStore::new(SessionMetadata::default());
    store.append(MessageRole::User, "from yesterday", None);
    let mut session = store.snapshot();
    session.start_time = (chrono::Utc::now() - chrono::Duration::hours(hours)).to_rfc3339();
    session
}

#[tokio::test(start_paused = true)]
async fn test_hello_exchange_appends_user_then_bot() {
    let h = harness(MockAgent::replying("Hi there"));
    h.widget.start().await;
    let mut rx = h.widget.subscribe();

    let exchange_id = h.widget.submit_text("Hello").await.unwrap();
    let outcome = wait_settled(&mut rx, &exchange_id).await;

    assert_eq!(outcome, ExchangeOutcome::Fulfilled);
    assert_eq!(h.agent.calls.load(Ordering::SeqCst), 1);

    let snapshot = h.widget.snapshot().await;
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[0].role, MessageRole::Bot); // greeting
    assert_eq!(snapshot.messages[1].role, MessageRole::User);
    assert_eq!(snapshot.messages[1].content, "Hello");
    assert_eq!(snapshot.messages[2].role, MessageRole::Bot);
    assert_eq!(snapshot.messages[2].content, "Hi there");

    let ids: Vec<&str> = snapshot.messages.iter().map(|m| m.id.as_str()).collect();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }

    h.widget.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_exchange_appends_apology() {
    let h = harness(MockAgent::failing());
    h.widget.start().await;
    let mut rx = h.widget.subscribe();

    let exchange_id = h.widget.submit_text("Hello").await.unwrap();
    let outcome = wait_settled(&mut rx, &exchange_id).await;

    assert_eq!(outcome, ExchangeOutcome::Failed);
    assert_eq!(h.agent.calls.load(Ordering::SeqCst), 1);

    let snapshot = h.widget.snapshot().await;
    let bots: Vec<&str> = snapshot
        .messages
        .iter()
        .skip(1) // greeting
        .filter(|m| m.role == MessageRole::Bot)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(bots, vec![APOLOGY]);

    h.widget.shutdown().await;
}

#[tokio::test]
async fn test_blank_submission_does_nothing() {
    let h = harness(MockAgent::replying("unused"));
    h.widget.start().await;

    assert!(h.widget.submit_text("   ").await.is_none());
    assert_eq!(h.agent.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.widget.snapshot().await.messages.len(), 1); // greeting only

    h.widget.shutdown().await;
}

#[tokio::test]
async fn test_recent_backup_is_restored() {
    let backup = backup_started_hours_ago(23);
    let backup_id = backup.session_id.clone();
    let h = harness_with(
        WidgetConfig::default(),
        MockAgent::replying("unused"),
        MemoryBackupRepository::preloaded(backup),
    );

    h.widget.start().await;

    let snapshot = h.widget.snapshot().await;
    assert_eq!(snapshot.session_id, backup_id);
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].content, "from yesterday");

    h.widget.shutdown().await;
}

#[tokio::test]
async fn test_stale_backup_is_discarded_but_kept_on_disk() {
    let backup = backup_started_hours_ago(25);
    let backup_id = backup.session_id.clone();
    let repository = MemoryBackupRepository::preloaded(backup);
    let h = harness_with(
        WidgetConfig::default(),
        MockAgent::replying("unused"),
        repository,
    );

    h.widget.start().await;

    let snapshot = h.widget.snapshot().await;
    assert_ne!(snapshot.session_id, backup_id);
    // Fresh session: greeting only, and the stale slot is untouched.
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(
        h.backup.slot.lock().unwrap().as_ref().unwrap().session_id,
        backup_id
    );

    h.widget.shutdown().await;
}

#[tokio::test]
async fn test_clear_replaces_session() {
    let h = harness(MockAgent::replying("unused"));
    h.widget.start().await;
    let old_id = h.widget.snapshot().await.session_id;

    let outcome = h
        .widget
        .handle_command(WidgetCommand::ClearTranscript { confirmed: false })
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::ConfirmationRequired);
    assert_eq!(h.widget.snapshot().await.session_id, old_id);

    let outcome = h
        .widget
        .handle_command(WidgetCommand::ClearTranscript { confirmed: true })
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Done);

    let snapshot = h.widget.snapshot().await;
    assert_ne!(snapshot.session_id, old_id);
    assert!(snapshot.messages.is_empty());

    h.widget.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_export_command_round_trips() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = WidgetConfig {
        export_dir: Some(dir.path().to_path_buf()),
        ..WidgetConfig::default()
    };
    let h = harness_with(
        config,
        MockAgent::replying("Hi there"),
        Arc::new(MemoryBackupRepository::default()),
    );
    h.widget.start().await;
    let mut rx = h.widget.subscribe();

    let exchange_id = h.widget.submit_text("Hello").await.unwrap();
    wait_settled(&mut rx, &exchange_id).await;
    let snapshot = h.widget.snapshot().await;

    let outcome = h
        .widget
        .handle_command(WidgetCommand::ExportTranscript)
        .await
        .unwrap();
    let path = match outcome {
        CommandOutcome::Exported(path) => path,
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        format!("chat_history_{}.json", snapshot.session_id)
    );
    let parsed: Session = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, snapshot);

    h.widget.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_connected_sync_mirrors_every_append() {
    let h = harness(MockAgent::replying("Hi there"));
    h.widget.start().await;

    h.widget.connect_sync(VALID_SYNC_CONFIG).await.unwrap();
    assert!(h.widget.is_sync_connected().await);

    let mut rx = h.widget.subscribe();
    let exchange_id = h.widget.submit_text("Hello").await.unwrap();
    wait_settled(&mut rx, &exchange_id).await;

    // Give the fire-and-forget mirror tasks a few turns to finish.
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    let documents = h.store.documents.lock().unwrap();
    // Initial connect sync + one per append (user, bot).
    assert_eq!(documents.len(), 3);
    let last = documents.last().unwrap();
    assert_eq!(last.messages.last().unwrap().content, "Hi there");

    drop(documents);
    h.widget.shutdown().await;
}

#[tokio::test]
async fn test_invalid_sync_config_leaves_transcript_unchanged() {
    let h = harness(MockAgent::replying("unused"));
    h.widget.start().await;
    let before = h.widget.snapshot().await;

    let err = h
        .widget
        .connect_sync(r#"{"api_key": "missing endpoint"}"#)
        .await
        .unwrap_err();

    assert!(err.is_config());
    assert!(!h.widget.is_sync_connected().await);
    assert_eq!(h.widget.snapshot().await, before);
    assert!(h.store.documents.lock().unwrap().is_empty());

    h.widget.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_sync_is_a_no_op() {
    let h = harness(MockAgent::replying("Hi there"));
    h.widget.start().await;
    let mut rx = h.widget.subscribe();

    let exchange_id = h.widget.submit_text("Hello").await.unwrap();
    wait_settled(&mut rx, &exchange_id).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    assert!(h.store.documents.lock().unwrap().is_empty());

    h.widget.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_load_remote_round_trips_after_connect() {
    let h = harness(MockAgent::replying("unused"));
    h.widget.start().await;

    h.widget.connect_sync(VALID_SYNC_CONFIG).await.unwrap();
    let session_id = h.widget.snapshot().await.session_id;

    let loaded = h.widget.load_remote(&session_id).await.unwrap().unwrap();
    assert_eq!(loaded.session_id, session_id);

    h.widget.disconnect_sync().await;
    assert!(h.widget.load_remote(&session_id).await.unwrap().is_none());

    h.widget.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_backup_loop_persists_and_stops_on_shutdown() {
    let h = harness(MockAgent::replying("unused"));
    h.widget.start().await;

    tokio::time::sleep(std::time::Duration::from_secs(31)).await;
    let first = h.backup.slot.lock().unwrap().clone().unwrap();
    assert_eq!(first.session_id, h.widget.snapshot().await.session_id);

    h.widget.shutdown().await;

    // A stopped loop writes nothing more, even after more intervals.
    *h.backup.slot.lock().unwrap() = None;
    tokio::time::sleep(std::time::Duration::from_secs(120)).await;
    assert!(h.backup.slot.lock().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_exchanges_both_settle() {
    let h = harness(MockAgent::replying("ok"));
    h.widget.start().await;
    let mut rx = h.widget.subscribe();

    let first = h.widget.submit_text("one").await.unwrap();
    let second = h.widget.submit_text("two").await.unwrap();
    assert_ne!(first, second);

    let mut settled = Vec::new();
    while settled.len() < 2 {
        if let WidgetEvent::ExchangeSettled { exchange_id, .. } = rx.recv().await.unwrap() {
            settled.push(exchange_id);
        }
    }
    assert!(settled.contains(&first));
    assert!(settled.contains(&second));

    // greeting + 2 user + 2 bot
    assert_eq!(h.widget.snapshot().await.messages.len(), 5);

    h.widget.shutdown().await;
}

#[tokio::test]
async fn test_oversized_attachment_is_rejected() {
    let config = WidgetConfig {
        max_attachment_bytes: 1024,
        ..WidgetConfig::default()
    };
    let h = harness_with(
        config,
        MockAgent::replying("unused"),
        Arc::new(MemoryBackupRepository::default()),
    );
    h.widget.start().await;
    let mut rx = h.widget.subscribe();

    let err = h
        .widget
        .attach_file(banter_core::session::FileRef {
            name: "big.bin".to_string(),
            size_bytes: 4096,
            mime_type: "application/octet-stream".to_string(),
            last_modified: 0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, banter_core::BanterError::Validation(_)));
    assert!(matches!(
        rx.recv().await.unwrap(),
        WidgetEvent::Notice(notice)
            if notice.kind == banter_core::notification::NotificationKind::Error
    ));

    h.widget.shutdown().await;
}
