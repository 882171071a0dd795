//! Parser for TensorZero gateway inference responses
//!
//! This is the boundary where tool calls the backend could not validate
//! (null `name` or null `arguments`) turn into [`ToolInvocation::Malformed`].

use log::debug;
use serde_json::{Map, Value};

use super::client::InferenceError;
use super::types::{ContentBlock, InferenceResponse, ToolCall, ToolInvocation, Usage};

/// Parse a raw gateway response body into an InferenceResponse
pub fn parse_response(response: &Value) -> Result<InferenceResponse, InferenceError> {
    let episode_id = response
        .get("episode_id")
        .and_then(Value::as_str)
        .ok_or_else(|| InferenceError::InvalidResponse("response has no episode_id".to_string()))?
        .to_string();

    let inference_id = response
        .get("inference_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| InferenceError::InvalidResponse("response has no content array".to_string()))?;

    let content = blocks.iter().filter_map(parse_content_block).collect();

    let usage = response.get("usage").map(parse_usage).unwrap_or_default();

    Ok(InferenceResponse {
        inference_id,
        episode_id,
        content,
        usage,
    })
}

/// Parse one content block; unknown block types are skipped
pub fn parse_content_block(block: &Value) -> Option<ContentBlock> {
    match block.get("type").and_then(Value::as_str) {
        Some("text") => {
            let text = block.get("text").and_then(Value::as_str)?.to_string();
            Some(ContentBlock::Text { text })
        }
        Some("tool_call") => parse_tool_call_block(block).map(ContentBlock::ToolCall),
        other => {
            debug!("Skipping content block of type {:?}", other);
            None
        }
    }
}

/// Parse a tool_call block. Only a missing id makes the block unusable.
fn parse_tool_call_block(block: &Value) -> Option<ToolInvocation> {
    let id = block.get("id").and_then(Value::as_str)?.to_string();
    let name = block.get("name").and_then(Value::as_str);
    let arguments = block.get("arguments").and_then(Value::as_object);

    match (name, arguments) {
        (Some(name), Some(arguments)) => Some(ToolInvocation::WellFormed(ToolCall::new(
            id,
            name,
            arguments.clone(),
        ))),
        _ => {
            let raw_name = block
                .get("raw_name")
                .and_then(Value::as_str)
                .or(name)
                .unwrap_or_default()
                .to_string();
            let raw_arguments = match block.get("raw_arguments").and_then(Value::as_str) {
                Some(raw) => raw.to_string(),
                None => arguments
                    .map(|a| Value::Object(a.clone()).to_string())
                    .unwrap_or_default(),
            };
            debug!("Malformed tool call {} (raw name {:?})", id, raw_name);
            Some(ToolInvocation::Malformed {
                id,
                raw_name,
                raw_arguments,
            })
        }
    }
}

/// Parse usage object from response
fn parse_usage(usage: &Value) -> Usage {
    Usage {
        input_tokens: usage.get("input_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("output_tokens").and_then(Value::as_u64).unwrap_or(0),
    }
}

/// Serialize well-formed arguments the way the gateway expects them echoed back
pub fn arguments_to_raw(arguments: &Map<String, Value>) -> String {
    Value::Object(arguments.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_and_tool_call() {
        let body = json!({
            "inference_id": "inf-1",
            "episode_id": "ep-1",
            "variant_name": "baseline",
            "content": [
                {"type": "text", "text": "Let me look that up."},
                {
                    "type": "tool_call",
                    "id": "call_1",
                    "name": "search_wikipedia",
                    "raw_name": "search_wikipedia",
                    "arguments": {"query": "Marie Curie"},
                    "raw_arguments": "{\"query\": \"Marie Curie\"}"
                }
            ],
            "usage": {"input_tokens": 120, "output_tokens": 30}
        });

        let response = parse_response(&body).unwrap();
        assert_eq!(response.episode_id, "ep-1");
        assert_eq!(response.inference_id.as_deref(), Some("inf-1"));
        assert_eq!(response.usage, Usage::new(120, 30));
        assert_eq!(response.content.len(), 2);
        assert_eq!(
            response.content[0],
            ContentBlock::Text {
                text: "Let me look that up.".to_string()
            }
        );
        match &response.content[1] {
            ContentBlock::ToolCall(ToolInvocation::WellFormed(call)) => {
                assert_eq!(call.id, "call_1");
                assert_eq!(call.name, "search_wikipedia");
                assert_eq!(call.str_arg("query"), Some("Marie Curie"));
            }
            other => panic!("expected well-formed call, got {:?}", other),
        }
    }

    #[test]
    fn test_null_name_is_malformed() {
        let block = json!({
            "type": "tool_call",
            "id": "call_2",
            "name": null,
            "raw_name": "search_wikipeda",
            "arguments": {"query": "x"},
            "raw_arguments": "{\"query\": \"x\"}"
        });

        let parsed = parse_content_block(&block).unwrap();
        assert_eq!(
            parsed,
            ContentBlock::ToolCall(ToolInvocation::Malformed {
                id: "call_2".to_string(),
                raw_name: "search_wikipeda".to_string(),
                raw_arguments: "{\"query\": \"x\"}".to_string(),
            })
        );
    }

    #[test]
    fn test_null_arguments_is_malformed() {
        let block = json!({
            "type": "tool_call",
            "id": "call_3",
            "name": "load_wikipedia_page",
            "raw_name": "load_wikipedia_page",
            "arguments": null,
            "raw_arguments": "{\"title\": "
        });

        match parse_content_block(&block) {
            Some(ContentBlock::ToolCall(ToolInvocation::Malformed { id, raw_arguments, .. })) => {
                assert_eq!(id, "call_3");
                assert_eq!(raw_arguments, "{\"title\": ");
            }
            other => panic!("expected malformed call, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_call_without_id_is_dropped() {
        let block = json!({"type": "tool_call", "name": "think", "arguments": {}});
        assert!(parse_content_block(&block).is_none());
    }

    #[test]
    fn test_unknown_block_types_are_skipped() {
        let body = json!({
            "episode_id": "ep-1",
            "content": [{"type": "thought", "text": "..."}]
        });
        let response = parse_response(&body).unwrap();
        assert!(response.content.is_empty());
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn test_missing_episode_id_is_invalid() {
        let body = json!({"content": []});
        assert!(matches!(parse_response(&body), Err(InferenceError::InvalidResponse(_))));
    }

    #[test]
    fn test_missing_content_is_invalid() {
        let body = json!({"episode_id": "ep-1"});
        assert!(matches!(parse_response(&body), Err(InferenceError::InvalidResponse(_))));
    }

    #[test]
    fn test_arguments_to_raw() {
        let args = json!({"title": "Marie Curie"}).as_object().cloned().unwrap();
        assert_eq!(arguments_to_raw(&args), "{\"title\":\"Marie Curie\"}");
    }
}
