//! Error types for wikihop
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can surface from an episode
#[derive(Debug, Error)]
pub enum WikihopError {
    /// The agent used its whole inference budget without answering
    #[error("Bounded loop exceeded: no answer after {max_inferences} inferences")]
    BoundedLoopExceeded { max_inferences: u32 },

    /// Tool results no longer line up with their invocations
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Inference gateway error
    #[error("Inference error: {0}")]
    Inference(String),

    /// Content source error outside of a tool call
    #[error("Content source error: {0}")]
    ContentSource(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::llm::InferenceError> for WikihopError {
    fn from(err: crate::llm::InferenceError) -> Self {
        WikihopError::Inference(err.to_string())
    }
}

impl From<crate::wiki::LookupError> for WikihopError {
    fn from(err: crate::wiki::LookupError) -> Self {
        WikihopError::ContentSource(err.to_string())
    }
}

/// Result type alias for wikihop operations
pub type Result<T> = std::result::Result<T, WikihopError>;
