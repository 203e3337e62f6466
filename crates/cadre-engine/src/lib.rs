//! Agent turn execution for cadre.
//!
//! - [`AgentExecutor`] — Runs one agent on one task until it answers or halts
//! - [`Task`] — A task with its own tools, completion callback and output file
//! - [`LanguageModel`] — The LLM boundary: system prompt and messages in, text out
//! - [`ToolUsage`] / [`ToolsHandler`] — Tool execution with repeat detection,
//!   result caching, retries and format reminders
//!
//! # Execution Model
//!
//! 1. Render the system prompt from the persona, tool listing and task
//! 2. Send it with the conversation so far to the model
//! 3. Parse the reply:
//!    - tool invocation: run the tool, append `Result: <observation>`
//!    - malformed: append the recovery message and the expected format
//!    - final answer: done
//! 4. Repeat until a final answer, the iteration cap (a final answer is
//!    forced once), or too many malformed replies in a row
//!
//! No model backend ships with this crate; implement [`LanguageModel`] for
//! the client of your choice.

mod executor;
mod task;
mod tool_usage;

pub use executor::{AgentExecutor, AgentRun, ExecutorConfig};
pub use task::{Task, TaskCallback, TaskOutput};
pub use tool_usage::{ToolUsage, ToolsHandler};

use async_trait::async_trait;
use cadre_core::{Message, TemplateError};
use cadre_protocol::TurnError;
use thiserror::Error;

pub use cadre_protocol::StopReason;

/// Errors that end an agent run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The language model call failed.
    #[error("LLM request failed: {0}")]
    Model(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The turn state machine was driven out of order.
    #[error(transparent)]
    Turn(#[from] TurnError),

    /// The agent halted before giving a final answer.
    #[error("Task '{task}' ended without a final answer: {stop:?}")]
    NoAnswer { task: String, stop: StopReason },

    /// The task output could not be written.
    #[error("Failed to write task output to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A chat-style language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model's raw reply to `messages` under `system`.
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, EngineError>;
}
