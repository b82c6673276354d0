//! In-memory transcript store.
//!
//! `TranscriptStore` is the explicit session-manager object that owns the
//! live `Session` and exposes append/snapshot/reset as its only mutation
//! surface. Side effects (durability snapshots, remote sync, UI events) are
//! orchestrated around it by the application layer.

use super::message::{FileRef, Message, MessageRole};
use super::model::{Session, SessionMetadata};

/// Owns the active session and serializes all mutation of it.
///
/// The store itself is synchronous; callers that share it across tasks wrap
/// it in `Arc<RwLock<_>>` so each append or reset completes within a single
/// lock hold and no partial mutation is observable.
#[derive(Debug)]
pub struct TranscriptStore {
    session: Session,
}

impl TranscriptStore {
    /// Creates a store over a fresh, empty session.
    pub fn new(metadata: SessionMetadata) -> Self {
        Self {
            session: Session::new(metadata),
        }
    }

    /// Creates a store over an existing session (startup restore).
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// Appends a message and returns a copy of it.
    ///
    /// Constructs the message with a fresh id and the current timestamp.
    /// Never fails; emptiness of `content` is validated upstream by the
    /// composer.
    pub fn append(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        attachment: Option<FileRef>,
    ) -> Message {
        let message = Message::new(role, content, attachment);
        self.session.messages.push(message.clone());
        message
    }

    /// Returns an immutable point-in-time copy of the session.
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    /// Replaces the active session with a fresh one.
    ///
    /// The new session gets a new id, a fresh start time, an empty
    /// transcript, and the same metadata capture. Irreversible.
    ///
    /// # Returns
    ///
    /// The new session id.
    pub fn reset(&mut self) -> String {
        self.session = Session::new(self.session.metadata.clone());
        self.session.session_id.clone()
    }

    /// The active session id.
    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    /// Number of messages in the transcript.
    pub fn len(&self) -> usize {
        self.session.messages.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.session.messages.is_empty()
    }
}
