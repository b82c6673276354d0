//! Response pipeline.
//!
//! Turns a pending user submission into exactly one inference request and
//! appends the outcome to the transcript. Each exchange moves through
//! `Composing -> Pending -> Fulfilled | Failed` independently; overlapping
//! exchanges are permitted and settle in whatever order their requests do.

use std::sync::Arc;
use std::time::Duration;

use banter_core::config::WidgetConfig;
use banter_core::id;
use banter_core::inference::InferenceAgent;
use banter_core::session::{FileRef, Message, MessageRole, TranscriptStore};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::composer::Submission;
use crate::events::{EventSender, ExchangeOutcome, WidgetEvent};
use crate::sync_adapter::RemoteSyncAdapter;

/// Fixed bot message appended when an exchange fails.
pub const APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Orchestrates the request/response lifecycle around the transcript store.
#[derive(Clone)]
pub struct ResponsePipeline {
    store: Arc<RwLock<TranscriptStore>>,
    agent: Arc<dyn InferenceAgent>,
    sync: Arc<RemoteSyncAdapter>,
    events: EventSender,
    config: WidgetConfig,
    cancel: CancellationToken,
}

impl ResponsePipeline {
    pub(crate) fn new(
        store: Arc<RwLock<TranscriptStore>>,
        agent: Arc<dyn InferenceAgent>,
        sync: Arc<RemoteSyncAdapter>,
        events: EventSender,
        config: WidgetConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            agent,
            sync,
            events,
            config,
            cancel,
        }
    }

    /// Appends a message, publishes it, and fires one mirror attempt.
    ///
    /// The snapshot handed to sync is taken inside the same lock hold as the
    /// append, so the mirrored document always contains the new message.
    pub(crate) async fn record(
        &self,
        role: MessageRole,
        content: impl Into<String>,
        attachment: Option<FileRef>,
    ) -> Message {
        let (message, snapshot) = {
            let mut store = self.store.write().await;
            let message = store.append(role, content, attachment);
            (message, store.snapshot())
        };

        let _ = self
            .events
            .send(WidgetEvent::MessageAppended(message.clone()));

        // Fire-and-forget mirror; the adapter surfaces failures itself.
        let sync = self.sync.clone();
        tokio::spawn(async move {
            sync.sync(snapshot).await;
        });

        message
    }

    /// Opens an exchange for a validated submission.
    ///
    /// The user message is appended immediately (optimistic); the rest of
    /// the exchange runs as an independent task that settles on its own.
    ///
    /// # Returns
    ///
    /// The exchange id, usable to correlate the lifecycle events.
    pub async fn submit(&self, submission: Submission) -> String {
        let exchange_id = id::new_id("xchg");
        let prompt = compose_prompt(&submission);

        self.record(
            MessageRole::User,
            submission.content,
            submission.attachment,
        )
        .await;
        let _ = self.events.send(WidgetEvent::ExchangePending {
            exchange_id: exchange_id.clone(),
        });

        let pipeline = self.clone();
        let task_exchange_id = exchange_id.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = pipeline.cancel.cancelled() => {
                    tracing::debug!("[Pipeline] Exchange {} abandoned at shutdown", task_exchange_id);
                }
                _ = pipeline.run_exchange(&task_exchange_id, &prompt) => {}
            }
        });

        exchange_id
    }

    async fn run_exchange(&self, exchange_id: &str, prompt: &str) {
        // Short pause between the user message and the thinking indicator.
        tokio::time::sleep(Duration::from_millis(self.config.thinking_delay_ms)).await;
        let _ = self.events.send(WidgetEvent::ThinkingStarted {
            exchange_id: exchange_id.to_string(),
        });

        match self.agent.generate(prompt).await {
            Ok(reply) => {
                self.reveal(exchange_id, &reply).await;
                // The full reply is recorded only after the reveal completes,
                // decoupling progressive display from the atomic append.
                self.record(MessageRole::Bot, reply, None).await;
                let _ = self.events.send(WidgetEvent::ExchangeSettled {
                    exchange_id: exchange_id.to_string(),
                    outcome: ExchangeOutcome::Fulfilled,
                });
            }
            Err(e) => {
                tracing::warn!("[Pipeline] Exchange {} failed: {}", exchange_id, e);
                self.record(MessageRole::Bot, APOLOGY, None).await;
                let _ = self.events.send(WidgetEvent::ExchangeSettled {
                    exchange_id: exchange_id.to_string(),
                    outcome: ExchangeOutcome::Failed,
                });
            }
        }
    }

    /// Emits the reply one character per tick. Cosmetic only.
    async fn reveal(&self, exchange_id: &str, text: &str) {
        let tick = Duration::from_millis(self.config.typing_tick_ms);
        for chunk in text.chars() {
            let _ = self.events.send(WidgetEvent::RevealChunk {
                exchange_id: exchange_id.to_string(),
                chunk,
            });
            tokio::time::sleep(tick).await;
        }
    }
}

/// Builds the outbound prompt for a submission.
///
/// Attachment content is referenced by name only, never uploaded.
fn compose_prompt(submission: &Submission) -> String {
    match &submission.attachment {
        Some(file) => format!(
            "{}\n\n[User attached a file: {}]",
            submission.content, file.name
        ),
        None => submission.content.clone(),
    }
}
