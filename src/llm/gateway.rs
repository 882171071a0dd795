//! TensorZero gateway client
//!
//! Implements [`InferenceClient`] against the gateway's `/inference` HTTP
//! endpoint. The gateway owns the function, its variants, and the tool
//! schemas; this client only ships the transcript and the episode id.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

use super::client::{InferenceClient, InferenceError};
use super::tool_parser::{arguments_to_raw, parse_response};
use super::types::{ContentBlock, InferenceRequest, InferenceResponse, Role, ToolInvocation, Turn, TurnContent};

/// Default gateway address
const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000";

/// Default function configured in the gateway
const DEFAULT_FUNCTION_NAME: &str = "wikipedia_agent";

/// Configuration for the gateway client
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub function_name: String,
    pub variant_name: Option<String>,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            variant_name: None,
            timeout: Duration::from_secs(300),
        }
    }
}

/// HTTP client for a TensorZero gateway
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/inference", self.config.url.trim_end_matches('/'))
    }

    /// Build the request body for the gateway
    fn build_request(&self, request: &InferenceRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(turn_to_json).collect();

        let mut body = json!({
            "function_name": self.config.function_name,
            "input": { "messages": messages },
            "stream": false
        });

        if let Some(episode_id) = &request.episode_id {
            body["episode_id"] = json!(episode_id);
        }

        if let Some(variant) = &self.config.variant_name {
            body["variant_name"] = json!(variant);
        }

        body
    }

    /// Send a request to the gateway
    async fn send_request(&self, body: Value) -> Result<Value, InferenceError> {
        let response = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(InferenceError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        decode_body(&response.bytes().await?)
    }
}

#[async_trait]
impl InferenceClient for GatewayClient {
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let body = self.build_request(&request);
        debug!(
            "POST {} ({} messages, episode {:?})",
            self.endpoint(),
            request.messages.len(),
            request.episode_id
        );
        let response = self.send_request(body).await?;
        parse_response(&response)
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("url", &self.config.url)
            .field("function_name", &self.config.function_name)
            .finish()
    }
}

/// A 2xx body that is not JSON is a protocol failure, not a transport one
fn decode_body(bytes: &[u8]) -> Result<Value, InferenceError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn turn_to_json(turn: &Turn) -> Value {
    let role = match turn.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    let content = match &turn.content {
        TurnContent::Text(text) => json!(text),
        TurnContent::Blocks(blocks) => Value::Array(blocks.iter().map(block_to_json).collect()),
    };
    json!({ "role": role, "content": content })
}

fn block_to_json(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({ "type": "text", "text": text }),
        ContentBlock::ToolCall(ToolInvocation::WellFormed(call)) => json!({
            "type": "tool_call",
            "id": call.id,
            "name": call.name,
            "arguments": arguments_to_raw(&call.arguments)
        }),
        ContentBlock::ToolCall(ToolInvocation::Malformed {
            id,
            raw_name,
            raw_arguments,
        }) => json!({
            "type": "tool_call",
            "id": id,
            "name": raw_name,
            "arguments": raw_arguments
        }),
        ContentBlock::ToolResult(result) => json!({
            "type": "tool_result",
            "id": result.id,
            "name": result.name,
            "result": result.result
        }),
    }
}
