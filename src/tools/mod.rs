//! Tool system for the agent
//!
//! Tools give the model its lookups. Every handler turns a [`ToolCall`] into
//! a [`ToolResult`]; recoverable failures are reported inside the result text
//! so the model can correct itself on its next turn.

mod load_page;
mod registry;
mod search;
mod think;

pub use load_page::LoadPageTool;
pub use registry::ToolRegistry;
pub use search::SearchTool;
pub use think::ThinkTool;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{ToolCall, ToolDefinition, ToolResult};

/// A tool that can be called by the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the tool_call name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for the arguments
    fn input_schema(&self) -> Value;

    /// Execute the tool. An `Err` is turned into an error payload by the registry.
    async fn execute(&self, call: &ToolCall) -> eyre::Result<ToolResult>;

    /// Definition advertised to the backend
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Fetch a required string argument, or the error result to hand back instead
pub(crate) fn required_str<'a>(call: &'a ToolCall, key: &str) -> Result<&'a str, ToolResult> {
    call.str_arg(key)
        .ok_or_else(|| ToolResult::error_for_call(call, format!("missing required string argument '{}'", key)))
}
