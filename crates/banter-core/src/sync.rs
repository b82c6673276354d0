//! Remote sync capability.
//!
//! This module provides traits and types for mirroring session snapshots to
//! an external document store. The application layer depends only on these
//! interfaces; the concrete HTTP client lives in banter-interaction.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BanterError;
use crate::session::Session;

fn default_collection() -> String {
    "chats".to_string()
}

/// User-supplied remote store configuration.
///
/// Parsed from the JSON blob the user pastes into the connect flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the document store API.
    pub endpoint: String,
    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Collection the session documents are written to.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl SyncConfig {
    /// Parses and validates a configuration from its JSON text form.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the text is not valid JSON for this
    /// shape or the endpoint is missing/blank. No state is touched on error.
    pub fn from_json(text: &str) -> Result<Self, SyncError> {
        let config: SyncConfig = serde_json::from_str(text)
            .map_err(|e| SyncError::Config(format!("invalid sync configuration: {}", e)))?;
        if config.endpoint.trim().is_empty() {
            return Err(SyncError::Config(
                "sync configuration is missing a remote endpoint".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Errors produced by remote store operations.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// The configuration could not be parsed or is incomplete.
    #[error("sync configuration error: {0}")]
    Config(String),

    /// The request never produced a response.
    #[error("remote request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status.
    #[error("remote store returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl SyncError {
    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<SyncError> for BanterError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Config(msg) => BanterError::Config(msg),
            other => BanterError::Sync(other.to_string()),
        }
    }
}

/// A connected handle to a remote document store.
///
/// Documents are keyed by session id; writes are full-document upserts
/// (create-or-replace), never incremental patches.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Writes the full session snapshot under its session id.
    ///
    /// # Arguments
    ///
    /// * `session` - The snapshot to mirror
    /// * `last_updated` - RFC 3339 stamp recorded alongside the document
    async fn upsert(&self, session: &Session, last_updated: &str) -> Result<(), SyncError>;

    /// Reads a stored snapshot by session id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Document found
    /// - `Ok(None)`: No document stored under this id
    /// - `Err(_)`: Transport or server error
    async fn fetch(&self, session_id: &str) -> Result<Option<Session>, SyncError>;
}

/// Builds a `RemoteStore` handle from a validated configuration.
#[async_trait]
pub trait RemoteStoreConnector: Send + Sync {
    /// Attempts to establish a remote client handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle cannot be established; the caller
    /// stays disconnected and no transcript state changes.
    async fn connect(&self, config: &SyncConfig) -> Result<Arc<dyn RemoteStore>, SyncError>;
}
