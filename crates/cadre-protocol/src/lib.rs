//! The response grammar spoken between agents and the LLM.
//!
//! Agents are told (through the `tools`, `no_tools` and `format` slices) to
//! answer in one of two shapes:
//!
//! ```text
//! Use Tool: <tool name>, <tool input>
//! Result: <result of the tool>
//! ```
//!
//! ```text
//! Final Answer: <answer>
//! ```
//!
//! - [`parse`] — Classifies raw output into a [`cadre_core::ParsedResponse`]
//! - [`recovery_message`] — Renders the corrective message for a [`cadre_core::Failure`]
//! - [`Turn`] — Tracks one agent turn across responses and tool results
//! - [`CoworkerRoster`] / [`Delegation`] — Who can be delegated to, and how

mod delegation;
mod lexer;
mod parser;
mod recovery;
mod roster;
mod turn;

pub use delegation::{Delegation, DELEGATION_SEPARATOR};
pub use lexer::{tokenize, Marker, Token};
pub use parser::parse;
pub use recovery::recovery_message;
pub use roster::CoworkerRoster;
pub use turn::{StopReason, Transition, Turn, TurnError, TurnState};
