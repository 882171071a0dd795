//! search_wikipedia tool - title search

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::{Tool, required_str};
use crate::llm::{ToolCall, ToolResult};
use crate::wiki::ContentSource;

/// Search Wikipedia for page titles
pub struct SearchTool {
    source: Arc<dyn ContentSource>,
}

impl SearchTool {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        "search_wikipedia"
    }

    fn description(&self) -> &'static str {
        "Search Wikipedia for pages matching a query. Returns matching page titles, one per line."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> eyre::Result<ToolResult> {
        let query = match required_str(call, "query") {
            Ok(q) => q,
            Err(result) => return Ok(result),
        };

        let titles = self.source.search(query).await?;
        debug!("search_wikipedia {:?}: {} titles", query, titles.len());

        Ok(ToolResult::for_call(call, titles.join("\n")))
    }
}
