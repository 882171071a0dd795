//! Inference layer - TensorZero gateway integration and conversation types
//!
//! This module provides:
//! - Transcript types (turns, content blocks, tool invocations and results)
//! - InferenceClient trait for backend abstraction
//! - GatewayClient implementation
//! - Response parsing

pub mod client;
pub mod gateway;
pub mod tool_parser;
pub mod types;

pub use client::{InferenceClient, InferenceError, MockInferenceClient};
pub use gateway::{GatewayClient, GatewayConfig};
pub use tool_parser::{parse_content_block, parse_response};
pub use types::{
    ContentBlock, InferenceRequest, InferenceResponse, Role, ToolCall, ToolDefinition, ToolInvocation, ToolResult,
    Turn, TurnContent, Usage,
};
