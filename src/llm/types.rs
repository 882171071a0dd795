//! Conversation types shared by the agent loop and the inference gateway
//!
//! A transcript is a list of [`Turn`]s. Assistant turns carry text and tool
//! invocations; the user turn that follows a tool round carries one
//! [`ToolResult`] per dispatched invocation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One party's contribution to the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    /// Create a free-text user turn (the initial question)
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Create an assistant turn from the blocks of an inference response
    pub fn assistant(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        }
    }

    /// Create the user turn that answers a tool round
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Blocks(results.into_iter().map(ContentBlock::ToolResult).collect()),
        }
    }

    /// Content blocks of this turn; empty for free-text turns
    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            TurnContent::Text(_) => &[],
            TurnContent::Blocks(blocks) => blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolCall(ToolInvocation),
    ToolResult(ToolResult),
}

/// A tool invocation as emitted by the inference backend.
///
/// The backend reports a null name or null arguments when the model produced
/// a call it could not validate; those become `Malformed` at the parse
/// boundary so the loop can answer them with an error result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolInvocation {
    WellFormed(ToolCall),
    Malformed {
        id: String,
        raw_name: String,
        raw_arguments: String,
    },
}

impl ToolInvocation {
    /// Correlation id of the invocation
    pub fn id(&self) -> &str {
        match self {
            ToolInvocation::WellFormed(call) => &call.id,
            ToolInvocation::Malformed { id, .. } => id,
        }
    }

    /// Name the model used, valid or not
    pub fn raw_name(&self) -> &str {
        match self {
            ToolInvocation::WellFormed(call) => &call.name,
            ToolInvocation::Malformed { raw_name, .. } => raw_name,
        }
    }
}

/// A validated tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Look up a string argument
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Payload returned to the backend for one invocation.
///
/// Failures are reported in `result` as text; there is no error flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub id: String,
    pub result: String,
}

impl ToolResult {
    /// Create a tool result
    pub fn new(name: impl Into<String>, id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            result: result.into(),
        }
    }

    /// Create a result answering `call`
    pub fn for_call(call: &ToolCall, result: impl Into<String>) -> Self {
        Self::new(call.name.clone(), call.id.clone(), result)
    }

    /// Create an error result answering `call`
    pub fn error_for_call(call: &ToolCall, message: impl std::fmt::Display) -> Self {
        Self::for_call(call, format!("ERROR: {}", message))
    }
}

/// Tool definition advertised to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Request for one inference call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub messages: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
}

impl InferenceRequest {
    /// Create a request over a transcript
    pub fn new(messages: Vec<Turn>, episode_id: Option<String>) -> Self {
        Self { messages, episode_id }
    }
}

/// Response from one inference call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub inference_id: Option<String>,
    pub episode_id: String,
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

impl InferenceResponse {
    /// Create a response with the given episode id and blocks
    pub fn new(episode_id: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        Self {
            inference_id: None,
            episode_id: episode_id.into(),
            content,
            usage: Usage::default(),
        }
    }

    /// Tool invocations of this response, in order
    pub fn tool_invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolCall(invocation) => Some(invocation),
            _ => None,
        })
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    /// Create new usage stats
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate usage from another instance
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}
