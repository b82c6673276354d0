//! Inference agent capability.
//!
//! Defines the narrow interface the response pipeline depends on. Concrete
//! implementations (e.g., the Gemini REST agent) live in banter-interaction.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::BanterError;

/// Errors produced by an inference request.
///
/// Any of these is terminal for the exchange that issued the request; the
/// pipeline makes exactly one attempt and never retries.
#[derive(Error, Debug, Clone)]
pub enum InferenceError {
    /// The request never produced a response (connect/transport failure).
    #[error("inference request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("inference service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response parsed but carried no text at the expected path.
    #[error("inference response contained no text")]
    EmptyResponse,

    /// The response body could not be parsed.
    #[error("failed to parse inference response: {0}")]
    Parse(String),
}

impl From<InferenceError> for BanterError {
    fn from(err: InferenceError) -> Self {
        BanterError::Inference(err.to_string())
    }
}

/// An agent that turns a composed prompt into a reply.
///
/// Implementations issue exactly one outbound request per call and rely on
/// the underlying transport's default timeout; the core enforces none.
#[async_trait]
pub trait InferenceAgent: Send + Sync {
    /// Generates a reply for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an `InferenceError` on transport failure, non-success status,
    /// or a missing/empty response payload.
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError>;
}
