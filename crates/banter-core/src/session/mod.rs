//! Session domain module.
//!
//! This module contains the session and message models, the in-memory
//! transcript store, and the backup repository interface.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionMetadata`)
//! - `message`: Transcript message types (`MessageRole`, `Message`, `FileRef`)
//! - `store`: In-memory transcript store (`TranscriptStore`)
//! - `repository`: Repository trait for the durable backup slot

mod message;
mod model;
mod repository;
mod store;

// Re-export public API
pub use message::{FileRef, Message, MessageRole};
pub use model::{Session, SessionMetadata};
pub use repository::BackupRepository;
pub use store::TranscriptStore;
