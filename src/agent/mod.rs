//! Agent module - the multi-turn tool-calling loop.
//!
//! This module provides:
//! - Agent, which answers one question per episode
//! - Episode and LoopState, the per-question conversation state
//! - Transcript archiving for finished episodes

mod agent_loop;
mod archive;
mod episode;

pub use agent_loop::{
    ANSWER_TOOL, Agent, AgentConfig, CONTINUE_PROMPT, EpisodeReport, INVALID_TOOL_CALL, answer_tool_definition,
};
pub use archive::save_transcript;
pub use episode::{Episode, LoopState};
