//! Widget event stream.
//!
//! Everything the embedding host needs to render - appended messages,
//! exchange lifecycle, reveal ticks, notifications - flows through one
//! broadcast channel. Slow or absent receivers never block the core.

use banter_core::notification::Notification;
use banter_core::session::Message;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Terminal state of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The inference reply was appended.
    Fulfilled,
    /// The apology message was appended instead.
    Failed,
}

/// Events published to the embedding host.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// A message was appended to the transcript.
    MessageAppended(Message),
    /// A user submission opened a new exchange.
    ExchangePending { exchange_id: String },
    /// The thinking indicator for an exchange should appear.
    ThinkingStarted { exchange_id: String },
    /// One character of the reply, emitted per reveal tick. Cosmetic; the
    /// stored message always carries the complete reply.
    RevealChunk { exchange_id: String, chunk: char },
    /// The exchange settled and its bot message is in the transcript.
    ExchangeSettled {
        exchange_id: String,
        outcome: ExchangeOutcome,
    },
    /// The active session was replaced (reset or startup restore).
    SessionReplaced { session_id: String },
    /// The remote sync adapter changed connection state.
    SyncStateChanged { connected: bool },
    /// One-shot user-visible feedback.
    Notice(Notification),
}

/// Sender half shared by the widget internals.
pub type EventSender = broadcast::Sender<WidgetEvent>;

/// Creates the widget event channel.
pub fn event_channel() -> (EventSender, broadcast::Receiver<WidgetEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}

/// Publishes a notification, ignoring absent receivers.
pub(crate) fn notify(events: &EventSender, notification: Notification) {
    let _ = events.send(WidgetEvent::Notice(notification));
}
