//! think tool - lets the model reason out loud as a tool call

use async_trait::async_trait;
use serde_json::Value;

use super::Tool;
use crate::llm::{ToolCall, ToolResult};

pub struct ThinkTool;

#[async_trait]
impl Tool for ThinkTool {
    fn name(&self) -> &'static str {
        "think"
    }

    fn description(&self) -> &'static str {
        "Think out loud about the question and plan the next lookup. Has no side effects and returns nothing."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "thought": {
                    "type": "string",
                    "description": "Your reasoning"
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> eyre::Result<ToolResult> {
        Ok(ToolResult::for_call(call, ""))
    }
}
