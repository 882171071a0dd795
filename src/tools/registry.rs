//! Tool registry - routes tool calls to handlers by name

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::{LoadPageTool, SearchTool, ThinkTool, Tool};
use crate::llm::{ToolCall, ToolDefinition, ToolResult};
use crate::error::Result;
use crate::wiki::{ContentSource, WikipediaClient, WikipediaConfig};

/// Name-keyed set of tool handlers
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with the lookup tools over `source`
    pub fn standard(source: Arc<dyn ContentSource>) -> Self {
        let mut registry = Self::new();

        registry.add_tool(Arc::new(SearchTool::new(source.clone())));
        registry.add_tool(Arc::new(LoadPageTool::new(source)));
        registry.add_tool(Arc::new(ThinkTool));

        registry
    }

    /// Create a registry with the lookup tools over live Wikipedia
    pub fn wikipedia(config: WikipediaConfig) -> Result<Self> {
        let client = WikipediaClient::new(config)?;
        Ok(Self::standard(Arc::new(client)))
    }

    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool under its own name, replacing any previous one
    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a handler; `None` means the tool is unknown
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Run a tool call. Never fails: unknown tools and handler errors come
    /// back as error payloads correlated to the call.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!("Unknown tool {:?} (call {})", call.name, call.id);
            return ToolResult::error_for_call(call, format!("unknown tool '{}'", call.name));
        };

        debug!("Dispatching {} (call {})", call.name, call.id);
        match tool.execute(call).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool {} failed: {:#}", call.name, e);
                ToolResult::error_for_call(call, format!("{:#}", e))
            }
        }
    }

    /// Definitions of every registered tool, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the registered tool names, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
