//! Episode state - the transcript of one question and its episode id

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::llm::{InferenceResponse, Turn, Usage};

/// Where the agent loop is within an episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Waiting on the inference backend
    #[default]
    AwaitingResponse,
    /// Running the tool calls of the latest response
    DispatchingTools,
    /// An answer was produced
    Done,
    /// The turn budget ran out
    Aborted,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done | LoopState::Aborted)
    }
}

/// State of one question-answering session.
///
/// The transcript is append-only and chronological. The episode id is `None`
/// until the backend assigns one with its first response.
#[derive(Debug, Clone)]
pub struct Episode {
    transcript: Vec<Turn>,
    episode_id: Option<String>,
    turn: u32,
    state: LoopState,
    usage: Usage,
}

impl Episode {
    /// Start an episode seeded with the user's question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            transcript: vec![Turn::user(question)],
            episode_id: None,
            turn: 0,
            state: LoopState::AwaitingResponse,
            usage: Usage::default(),
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn episode_id(&self) -> Option<&str> {
        self.episode_id.as_deref()
    }

    /// Completed tool rounds
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// Fold an inference response in: assistant turn, episode id, usage
    pub fn record_response(&mut self, response: &InferenceResponse) {
        if self.episode_id.as_deref() != Some(response.episode_id.as_str()) {
            debug!("Episode id is now {}", response.episode_id);
            self.episode_id = Some(response.episode_id.clone());
        }
        self.usage.add(&response.usage);
        self.transcript.push(Turn::assistant(response.content.clone()));
    }

    /// Count a finished tool round
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Move to `next`. Terminal states are final.
    pub fn transition(&mut self, next: LoopState) {
        if self.state.is_terminal() {
            warn!("Episode {:?} is {:?}, not moving to {:?}", self.episode_id, self.state, next);
            return;
        }
        debug!("Episode {:?}: {:?} -> {:?}", self.episode_id, self.state, next);
        self.state = next;
    }

    /// Consume the episode, keeping only its transcript
    pub fn into_transcript(self) -> Vec<Turn> {
        self.transcript
    }
}
