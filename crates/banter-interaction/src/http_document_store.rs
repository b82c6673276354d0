//! HTTP document store client.
//!
//! Mirrors session snapshots to a user-configured remote document store
//! over a plain keyed-document HTTP API: full-document upsert by session id,
//! keyed read, nothing incremental.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use banter_core::session::Session;
use banter_core::sync::{RemoteStore, RemoteStoreConnector, SyncConfig, SyncError};
use reqwest::{Client, StatusCode};
use serde::Serialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The mirrored document: the full session snapshot plus a write stamp.
#[derive(Serialize)]
struct SessionDocument<'a> {
    #[serde(flatten)]
    session: &'a Session,
    #[serde(rename = "lastUpdated")]
    last_updated: &'a str,
}

/// Remote store implementation over a keyed-document HTTP API.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    collection: String,
}

impl HttpDocumentStore {
    /// Builds a store handle from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            collection: config.collection.clone(),
        })
    }

    fn document_url(&self, session_id: &str) -> String {
        format!(
            "{}/documents/{}/{}",
            self.endpoint, self.collection, session_id
        )
    }

    /// Attaches the bearer token when one is configured.
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(api_key) = &self.api_key {
            request.header("Authorization", format!("Bearer {}", api_key))
        } else {
            request
        }
    }
}

#[async_trait]
impl RemoteStore for HttpDocumentStore {
    async fn upsert(&self, session: &Session, last_updated: &str) -> Result<(), SyncError> {
        let url = self.document_url(&session.session_id);
        let document = SessionDocument {
            session,
            last_updated,
        };

        let request = self
            .client
            .put(&url)
            .json(&document)
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .auth_request(request)
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SyncError::Status { status, message });
        }

        tracing::debug!(
            "[RemoteSync] Upserted session {} to remote store",
            session.session_id
        );
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<Session>, SyncError> {
        let url = self.document_url(session_id);

        let request = self.client.get(&url).timeout(REQUEST_TIMEOUT);
        let response = self
            .auth_request(request)
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("[RemoteSync] No document stored for session {}", session_id);
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SyncError::Status { status, message });
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| SyncError::Request(format!("failed to parse remote document: {}", e)))?;
        Ok(Some(session))
    }
}

/// Connector that builds `HttpDocumentStore` handles.
pub struct HttpStoreConnector;

#[async_trait]
impl RemoteStoreConnector for HttpStoreConnector {
    async fn connect(&self, config: &SyncConfig) -> Result<Arc<dyn RemoteStore>, SyncError> {
        let store = HttpDocumentStore::from_config(config)?;
        tracing::info!("[RemoteSync] Remote store handle established for {}", store.endpoint);
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_core::session::SessionMetadata;

    fn store_for(endpoint: &str) -> HttpDocumentStore {
        HttpDocumentStore::from_config(&SyncConfig {
            endpoint: endpoint.to_string(),
            api_key: None,
            collection: "chats".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_document_url_is_keyed_by_session_id() {
        let store = store_for("https://store.example/api");
        assert_eq!(
            store.document_url("chat_1_abc"),
            "https://store.example/api/documents/chats/chat_1_abc"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let store = store_for("https://store.example/api/");
        assert_eq!(
            store.document_url("chat_1_abc"),
            "https://store.example/api/documents/chats/chat_1_abc"
        );
    }

    #[test]
    fn test_document_carries_session_fields_and_stamp() {
        let session = Session::new(SessionMetadata::default());
        let document = SessionDocument {
            session: &session,
            last_updated: "2026-01-01T00:00:00Z",
        };

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["sessionId"], session.session_id.as_str());
        assert_eq!(json["lastUpdated"], "2026-01-01T00:00:00Z");
        assert!(json.get("messages").is_some());
    }
}
