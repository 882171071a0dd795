//! Agent loop - drives inference calls and tool rounds until an answer.
//!
//! Each turn:
//! 1. Sends the full transcript and the episode id to the backend
//! 2. Appends the response as an assistant turn
//! 3. Stops if the response calls `answer_question`
//! 4. Otherwise answers every tool call, in order, in one user turn
//!
//! The number of turns is capped; running out is an error, not an answer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;

use super::episode::{Episode, LoopState};
use crate::error::{Result, WikihopError};
use crate::llm::{
    ContentBlock, InferenceClient, InferenceRequest, ToolCall, ToolDefinition, ToolInvocation, ToolResult, Turn,
    Usage,
};
use crate::tools::ToolRegistry;

/// Name of the terminal tool
pub const ANSWER_TOOL: &str = "answer_question";

/// Payload sent back for a call the backend could not validate
pub const INVALID_TOOL_CALL: &str = "ERROR: invalid tool call";

/// User turn sent after a response that called no tools
pub const CONTINUE_PROMPT: &str =
    "Continue researching with the available tools, then call answer_question with your final answer.";

/// Definition of the terminal tool. It is handled by the loop, not the registry.
pub fn answer_tool_definition() -> ToolDefinition {
    ToolDefinition::new(
        ANSWER_TOOL,
        "Give the final answer to the user's question. Ends the conversation.",
        json!({
            "type": "object",
            "properties": {
                "answer": {
                    "type": "string",
                    "description": "The final answer"
                }
            },
            "required": ["answer"],
            "additionalProperties": false
        }),
    )
}

/// Configuration for the agent loop
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Inference calls allowed per episode
    pub max_inferences: u32,
    /// Run the tool calls of one turn concurrently
    pub parallel_tools: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_inferences: 20,
            parallel_tools: false,
        }
    }
}

/// Everything known about a finished episode
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeReport {
    pub answer: String,
    pub episode_id: Option<String>,
    pub inferences: u32,
    /// Final loop state
    pub state: LoopState,
    pub usage: Usage,
    pub finished_at: DateTime<Utc>,
    pub transcript: Vec<Turn>,
}

/// What a response asks the loop to do
#[derive(Debug, PartialEq)]
enum TurnPlan {
    Answer(String),
    Dispatch(Vec<Slot>),
}

/// One position in the next user turn
#[derive(Debug, PartialEq)]
enum Slot {
    Ready(ToolResult),
    Call(ToolCall),
}

impl Slot {
    fn id(&self) -> &str {
        match self {
            Slot::Ready(result) => &result.id,
            Slot::Call(call) => &call.id,
        }
    }
}

/// The question-answering agent
pub struct Agent<C>
where
    C: InferenceClient,
{
    client: Arc<C>,
    registry: ToolRegistry,
    config: AgentConfig,
}

impl<C> Agent<C>
where
    C: InferenceClient,
{
    /// Create an agent with the default configuration
    pub fn new(client: Arc<C>, registry: ToolRegistry) -> Self {
        Self::with_config(client, registry, AgentConfig::default())
    }

    /// Create an agent with a custom configuration
    pub fn with_config(client: Arc<C>, registry: ToolRegistry, config: AgentConfig) -> Self {
        if registry.has_tool(ANSWER_TOOL) {
            warn!("Registered {} tool is shadowed by the agent loop", ANSWER_TOOL);
        }
        debug!("Agent tools: {:?}", registry.tool_names());
        Self {
            client,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answer a question
    pub async fn answer(&self, question: &str) -> Result<String> {
        Ok(self.run_episode(question).await?.answer)
    }

    /// Answer a question and keep the episode's transcript and accounting
    pub async fn run_episode(&self, question: &str) -> Result<EpisodeReport> {
        let mut episode = Episode::new(question);
        info!("Starting episode for question: {}", question);

        loop {
            if episode.turn() >= self.config.max_inferences {
                episode.transition(LoopState::Aborted);
                warn!(
                    "Episode {:?} aborted after {} inferences",
                    episode.episode_id(),
                    self.config.max_inferences
                );
                return Err(WikihopError::BoundedLoopExceeded {
                    max_inferences: self.config.max_inferences,
                });
            }

            let request = InferenceRequest::new(
                episode.transcript().to_vec(),
                episode.episode_id().map(str::to_string),
            );
            let response = self.client.infer(request).await?;
            debug!(
                "Inference {:?} returned {} tool calls",
                response.inference_id,
                response.tool_invocations().count()
            );
            episode.record_response(&response);
            episode.transition(LoopState::DispatchingTools);

            match plan_turn(&response.content) {
                TurnPlan::Answer(answer) => {
                    episode.transition(LoopState::Done);
                    info!(
                        "Episode {:?} answered after {} inferences",
                        episode.episode_id(),
                        episode.turn() + 1
                    );
                    return Ok(EpisodeReport {
                        answer,
                        episode_id: episode.episode_id().map(str::to_string),
                        inferences: episode.turn() + 1,
                        state: episode.state(),
                        usage: episode.usage(),
                        finished_at: Utc::now(),
                        transcript: episode.into_transcript(),
                    });
                }
                TurnPlan::Dispatch(slots) if slots.is_empty() => {
                    debug!("Response called no tools, nudging");
                    episode.push(Turn::user(CONTINUE_PROMPT));
                }
                TurnPlan::Dispatch(slots) => {
                    let results = self.resolve(slots).await?;
                    episode.push(Turn::tool_results(results));
                }
            }

            episode.advance_turn();
            episode.transition(LoopState::AwaitingResponse);
        }
    }

    /// Run the pending calls and return results in slot order
    async fn resolve(&self, slots: Vec<Slot>) -> Result<Vec<ToolResult>> {
        let results = if self.config.parallel_tools {
            join_all(slots.iter().map(|slot| self.run_slot(slot))).await
        } else {
            let mut results = Vec::with_capacity(slots.len());
            for slot in &slots {
                results.push(self.run_slot(slot).await);
            }
            results
        };

        check_pairing(&slots, &results)?;
        Ok(results)
    }

    async fn run_slot(&self, slot: &Slot) -> ToolResult {
        match slot {
            Slot::Ready(result) => result.clone(),
            Slot::Call(call) => self.registry.dispatch(call).await,
        }
    }
}

/// Decide what a response asks for. An answer wins over any other call in
/// the same response.
fn plan_turn(content: &[ContentBlock]) -> TurnPlan {
    let mut slots = Vec::new();

    for block in content {
        match block {
            ContentBlock::Text { text } => debug!("Assistant: {}", text),
            ContentBlock::ToolResult(result) => {
                warn!("Ignoring tool_result block {} in a response", result.id);
            }
            ContentBlock::ToolCall(invocation @ ToolInvocation::Malformed { .. }) => {
                warn!("Invalid tool call {} ({:?})", invocation.id(), invocation.raw_name());
                slots.push(Slot::Ready(ToolResult::new(
                    invocation.raw_name(),
                    invocation.id(),
                    INVALID_TOOL_CALL,
                )));
            }
            ContentBlock::ToolCall(ToolInvocation::WellFormed(call)) if call.name == ANSWER_TOOL => {
                match call.str_arg("answer") {
                    Some(answer) => return TurnPlan::Answer(answer.to_string()),
                    None => {
                        warn!("answer_question call {} has no answer", call.id);
                        slots.push(Slot::Ready(ToolResult::error_for_call(
                            call,
                            "missing required string argument 'answer'",
                        )));
                    }
                }
            }
            ContentBlock::ToolCall(ToolInvocation::WellFormed(call)) => {
                debug!("{}: {}", call.name, serde_json::Value::Object(call.arguments.clone()));
                slots.push(Slot::Call(call.clone()));
            }
        }
    }

    TurnPlan::Dispatch(slots)
}

/// Every result must answer the invocation in the same position
fn check_pairing(slots: &[Slot], results: &[ToolResult]) -> Result<()> {
    if slots.len() != results.len() {
        return Err(WikihopError::ProtocolViolation(format!(
            "{} tool calls produced {} results",
            slots.len(),
            results.len()
        )));
    }

    for (slot, result) in slots.iter().zip(results) {
        if slot.id() != result.id {
            return Err(WikihopError::ProtocolViolation(format!(
                "result id '{}' does not match invocation id '{}'",
                result.id,
                slot.id()
            )));
        }
    }

    Ok(())
}
