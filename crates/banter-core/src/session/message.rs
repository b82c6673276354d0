//! Transcript message types.
//!
//! Messages are immutable once appended; transcript order is append order.

use serde::{Deserialize, Serialize};

use crate::id;

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message produced by the assistant (including failure apologies).
    Bot,
}

/// Metadata of a file the user attached to a message.
///
/// Only metadata is retained; the binary payload stays with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type reported by the host.
    pub mime_type: String,
    /// Last-modified stamp in unix milliseconds.
    pub last_modified: i64,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: String,
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// Creation timestamp (ISO 8601 format).
    pub timestamp: String,
    /// Attached file metadata, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<FileRef>,
}

impl Message {
    /// Constructs a message with a fresh id and the current timestamp.
    pub fn new(role: MessageRole, content: impl Into<String>, attachment: Option<FileRef>) -> Self {
        Self {
            id: id::new_id("msg"),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            attachment,
        }
    }
}
