//! Session domain model.
//!
//! A session is one continuous conversation: a unique id, a start time, an
//! ordered transcript, and environment metadata captured at creation. The
//! serialized shape (camelCase keys) is the document mirrored to the remote
//! store, written to the durable backup slot, and exported to the user.

use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::id;

/// Host environment captured when a session is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// User agent string of the embedding browser.
    #[serde(default)]
    pub user_agent: String,
    /// BCP 47 locale tag.
    #[serde(default)]
    pub locale: String,
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: String,
}

/// One continuous conversation.
///
/// Mutated only by append; cleared atomically by replacement with a fresh
/// session carrying a new id (see `TranscriptStore`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier, immutable for the session's lifetime.
    pub session_id: String,
    /// Timestamp when the session started (ISO 8601 format).
    pub start_time: String,
    /// Ordered transcript; insertion order is the displayed order.
    pub messages: Vec<Message>,
    /// Host environment metadata.
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl Session {
    /// Creates a fresh, empty session with a new id.
    pub fn new(metadata: SessionMetadata) -> Self {
        Self {
            session_id: id::new_id("chat"),
            start_time: chrono::Utc::now().to_rfc3339(),
            messages: Vec::new(),
            metadata,
        }
    }

    /// Age of the session, measured from its start time.
    ///
    /// # Returns
    ///
    /// `None` if the stored start time cannot be parsed.
    pub fn age(&self) -> Option<chrono::Duration> {
        let started = chrono::DateTime::parse_from_rfc3339(&self.start_time).ok()?;
        Some(chrono::Utc::now().signed_duration_since(started))
    }

    /// Whether the session started within the given window.
    ///
    /// Used by the startup restore path: a backup older than the window is
    /// stale and discarded. An unparseable start time counts as stale.
    pub fn is_within(&self, window: chrono::Duration) -> bool {
        match self.age() {
            Some(age) => age < window,
            None => false,
        }
    }
}
