//! load_wikipedia_page tool - fetch a page as Markdown

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use super::{Tool, required_str};
use crate::llm::{ToolCall, ToolResult};
use crate::wiki::{ContentSource, LookupError, markup};

/// Load a Wikipedia page by title
pub struct LoadPageTool {
    source: Arc<dyn ContentSource>,
}

impl LoadPageTool {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for LoadPageTool {
    fn name(&self) -> &'static str {
        "load_wikipedia_page"
    }

    fn description(&self) -> &'static str {
        "Load a Wikipedia page by its exact title. Returns the page URL and its content as Markdown."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Exact page title, as returned by search_wikipedia"
                }
            },
            "required": ["title"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> eyre::Result<ToolResult> {
        let title = match required_str(call, "title") {
            Ok(t) => t,
            Err(result) => return Ok(result),
        };

        let payload = match self.source.fetch_page(title).await {
            Ok(page) => {
                let content = markup::html_to_markdown(&page.html);
                debug!(
                    "load_wikipedia_page {:?}: {} bytes html -> {} bytes markdown",
                    title,
                    page.html.len(),
                    content.len()
                );
                format!("# URL\n\n{}\n\n# CONTENT\n\n{}", page.url, content)
            }
            Err(LookupError::PageNotFound { .. }) => {
                warn!("load_wikipedia_page: {:?} not found", title);
                format!("ERROR: page '{}' not found.", title)
            }
            Err(err @ LookupError::Disambiguation { .. }) => {
                warn!("load_wikipedia_page: {:?} is ambiguous", title);
                format!("ERROR: disambiguation error for '{}': {}", title, err)
            }
            Err(err) => return Err(err.into()),
        };

        Ok(ToolResult::for_call(call, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::MemorySource;
    use serde_json::json;

    fn call(title: &str) -> ToolCall {
        ToolCall::new("call_2", "load_wikipedia_page", json!({"title": title}).as_object().cloned().unwrap())
    }

    fn tool() -> LoadPageTool {
        let source = MemorySource::new()
            .with_page(
                "Marie Curie",
                "https://en.wikipedia.org/wiki/Marie_Curie",
                "<p><b>Marie Curie</b> was a physicist.</p>",
            )
            .with_disambiguation("Curie", &["Marie Curie", "Pierre Curie", "Curie (unit)"])
            .with_failure("Flaky", "connection reset");
        LoadPageTool::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_load_page_formats_url_and_content() {
        let result = tool().execute(&call("Marie Curie")).await.unwrap();

        assert_eq!(result.id, "call_2");
        assert_eq!(result.name, "load_wikipedia_page");
        assert_eq!(
            result.result,
            "# URL\n\nhttps://en.wikipedia.org/wiki/Marie_Curie\n\n# CONTENT\n\n**Marie Curie** was a physicist."
        );
    }

    #[tokio::test]
    async fn test_load_page_not_found_is_data() {
        let result = tool().execute(&call("Nonexistent Title")).await.unwrap();
        assert_eq!(result.result, "ERROR: page 'Nonexistent Title' not found.");
    }

    #[tokio::test]
    async fn test_load_page_disambiguation_lists_candidates() {
        let result = tool().execute(&call("Curie")).await.unwrap();

        assert!(result.result.starts_with("ERROR: disambiguation error for 'Curie':"));
        assert!(result.result.contains("Pierre Curie"));
        assert!(result.result.contains("Curie (unit)"));
    }

    #[tokio::test]
    async fn test_load_page_transport_failure_is_an_error() {
        let result = tool().execute(&call("Flaky")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_load_page_missing_title() {
        let call = ToolCall::new("call_3", "load_wikipedia_page", serde_json::Map::new());
        let result = tool().execute(&call).await.unwrap();
        assert_eq!(result.result, "ERROR: missing required string argument 'title'");
    }
}
