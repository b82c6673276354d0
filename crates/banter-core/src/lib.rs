//! Domain layer of the Banter chat widget.
//!
//! Holds the typed error, identifier generation, the session/transcript
//! model, and the capability traits (backup slot, remote store, inference
//! agent) the outer layers implement. No I/O happens here.

pub mod config;
pub mod error;
pub mod id;
pub mod inference;
pub mod notification;
pub mod session;
pub mod sync;

// Re-export common error type
pub use error::{BanterError, Result};
