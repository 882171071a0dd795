//! Wikihop - a multi-hop Wikipedia question answering agent
//!
//! A model served by a TensorZero gateway answers questions by calling tools:
//! it searches Wikipedia, loads pages, and thinks out loud, over several turns,
//! until it calls `answer_question` or the turn budget runs out.

pub mod agent;
pub mod error;
pub mod llm;
pub mod tools;
pub mod wiki;

pub use error::{Result, WikihopError};
