//! Remote service clients for the Banter chat widget.
//!
//! Concrete implementations of the core capabilities: the Gemini REST
//! inference agent and the HTTP document store used for remote sync.

pub mod gemini_api_agent;
pub mod http_document_store;

pub use gemini_api_agent::GeminiApiAgent;
pub use http_document_store::{HttpDocumentStore, HttpStoreConnector};
