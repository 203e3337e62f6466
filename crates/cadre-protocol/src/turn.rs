//! Conversation turn state machine.
//!
//! ```text
//! AwaitingResponse ── ToolInvocation ──▶ AwaitingToolResult ── result ──▶ AwaitingResponse
//!        │
//!        ├── FinalAnswer ──▶ Terminal(FinalAnswer)
//!        └── Malformed ──▶ AwaitingResponse (recovery injected)
//! ```
//!
//! When the iteration cap is reached the turn asks for a final answer once;
//! any response other than a final answer after that ends the turn. Too many
//! malformed responses in a row end it as well.

use cadre_core::{Failure, ParsedResponse, ToolInvocation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    FinalAnswer,
    IterationLimit,
    MalformedLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    AwaitingResponse,
    AwaitingToolResult(ToolInvocation),
    Terminal(StopReason),
}

impl TurnState {
    fn label(&self) -> &'static str {
        match self {
            TurnState::AwaitingResponse => "awaiting response",
            TurnState::AwaitingToolResult(_) => "awaiting tool result",
            TurnState::Terminal(_) => "terminal",
        }
    }
}

/// What the caller has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Execute the tool and report back with [`Turn::on_tool_result`].
    RunTool(ToolInvocation),
    /// Send the recovery message for the failure and wait for a new response.
    Reprompt(Failure),
    /// The agent gave its final answer.
    Finish(String),
    /// The turn ended without an answer.
    Halt(StopReason),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error("Turn is {actual}, expected {expected}")]
    OutOfOrder {
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Turn {
    max_iterations: u32,
    max_malformed: u32,
    iterations: u32,
    consecutive_malformed: u32,
    forced: bool,
    state: TurnState,
}

impl Turn {
    pub fn new(max_iterations: u32, max_malformed: u32) -> Self {
        Self {
            max_iterations,
            max_malformed,
            iterations: 0,
            consecutive_malformed: 0,
            forced: false,
            state: TurnState::AwaitingResponse,
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Responses received so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TurnState::Terminal(_))
    }

    /// Feeds the classified LLM response into the turn.
    pub fn on_response(&mut self, response: &ParsedResponse) -> Result<Transition, TurnError> {
        self.expect(TurnState::AwaitingResponse.label(), |s| {
            matches!(s, TurnState::AwaitingResponse)
        })?;
        self.iterations += 1;
        debug!(iteration = self.iterations, response = response.label(), "turn response");

        let transition = match response {
            ParsedResponse::FinalAnswer { content } => {
                self.state = TurnState::Terminal(StopReason::FinalAnswer);
                return Ok(Transition::Finish(content.clone()));
            }
            _ if self.forced => {
                warn!(iterations = self.iterations, "no final answer after it was forced");
                self.halt(StopReason::IterationLimit)
            }
            ParsedResponse::Malformed { raw_text } => {
                self.consecutive_malformed += 1;
                if self.consecutive_malformed > self.max_malformed {
                    warn!(count = self.consecutive_malformed, "too many malformed responses");
                    self.halt(StopReason::MalformedLimit)
                } else if self.at_limit() {
                    self.force()
                } else {
                    Transition::Reprompt(Failure::MalformedResponse { raw_text: raw_text.clone() })
                }
            }
            ParsedResponse::ToolInvocation(invocation) => {
                self.consecutive_malformed = 0;
                if self.at_limit() {
                    self.force()
                } else {
                    self.state = TurnState::AwaitingToolResult(invocation.clone());
                    Transition::RunTool(invocation.clone())
                }
            }
        };
        Ok(transition)
    }

    /// Records that the pending tool produced its observation.
    pub fn on_tool_result(&mut self) -> Result<(), TurnError> {
        self.expect("awaiting tool result", |s| matches!(s, TurnState::AwaitingToolResult(_)))?;
        self.state = TurnState::AwaitingResponse;
        Ok(())
    }

    fn at_limit(&self) -> bool {
        self.iterations >= self.max_iterations
    }

    fn force(&mut self) -> Transition {
        self.forced = true;
        Transition::Reprompt(Failure::ExceededToolUseLimit)
    }

    fn halt(&mut self, reason: StopReason) -> Transition {
        self.state = TurnState::Terminal(reason);
        Transition::Halt(reason)
    }

    fn expect(
        &self,
        expected: &'static str,
        check: impl Fn(&TurnState) -> bool,
    ) -> Result<(), TurnError> {
        if check(&self.state) {
            Ok(())
        } else {
            Err(TurnError::OutOfOrder {
                expected,
                actual: self.state.label(),
            })
        }
    }
}
