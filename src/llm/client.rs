//! Inference client trait, its error type, and a scripted mock

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{InferenceRequest, InferenceResponse};

/// One blocking request/response call per turn.
///
/// Implementations do not retry; the agent loop never retries either.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Run one inference over the full transcript
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError>;
}

/// Errors that can occur talking to the inference backend
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl InferenceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::RateLimited { .. } => true,
            InferenceError::ApiError { status, .. } => *status >= 500,
            InferenceError::Network(_) => true,
            InferenceError::InvalidResponse(_) => false,
            InferenceError::JsonError(_) => false,
        }
    }
}

/// Mock client that replays scripted responses and records every request
#[derive(Debug, Default)]
pub struct MockInferenceClient {
    responses: Mutex<VecDeque<InferenceResponse>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl MockInferenceClient {
    /// Create a mock that answers with `responses` in order
    pub fn new(responses: Vec<InferenceResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of inference calls made so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copies of every request received, oldest first
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| InferenceError::InvalidResponse("mock has no responses left".to_string()))
    }
}
