//! Classification of raw LLM output.
//!
//! The parser walks the token stream with an explicit state machine:
//!
//! | State | Token | Next |
//! |-------|-------|------|
//! | `Start` | text | `Start` |
//! | `Start` | `Use Tool:` | `InTool` |
//! | `Start` | `Final Answer:` | **FinalAnswer** |
//! | `Start` | `Result:` | **Malformed** (result without a tool) |
//! | `InTool` | text | `InTool` (more tool input) |
//! | `InTool` | `Result:` | `ToolDone` |
//! | `InTool` | `Final Answer:` / `Use Tool:` | **Malformed** (conflicting order) |
//! | `ToolDone` | `Final Answer:` | **FinalAnswer** |
//! | `ToolDone` | anything else | `ToolDone` |
//!
//! At the end of input `ToolDone` yields the tool invocation; `Start` and
//! `InTool` yield Malformed.

use cadre_core::{ParsedResponse, ToolInvocation};
use tracing::debug;

use crate::lexer::{tokenize, Marker, Token};

const FENCE: &str = "```";

enum State {
    Start,
    InTool(String),
    ToolDone(ToolInvocation),
}

/// Classifies `raw` as a tool invocation, a final answer, or malformed.
///
/// Total: every input yields exactly one variant.
///
/// ```rust
/// use cadre_core::ParsedResponse;
/// use cadre_protocol::parse;
///
/// assert_eq!(
///     parse("Final Answer: Paris is the capital."),
///     ParsedResponse::FinalAnswer { content: "Paris is the capital.".to_string() }
/// );
/// ```
pub fn parse(raw: &str) -> ParsedResponse {
    let lines: Vec<&str> = raw.lines().collect();
    let mut state = State::Start;

    for token in tokenize(raw) {
        state = match (state, token) {
            (State::Start, Token::Text { .. }) => State::Start,
            (State::Start, Token::Marker { marker, rest, line }) => match marker {
                Marker::UseTool => State::InTool(rest.to_string()),
                Marker::FinalAnswer => return final_answer(rest, &lines[line + 1..]),
                Marker::Result => return malformed(raw, "result without a tool"),
            },
            (State::InTool(mut text), Token::Text { text: more, .. }) => {
                text.push('\n');
                text.push_str(more);
                State::InTool(text)
            }
            (State::InTool(text), Token::Marker { marker, .. }) => match marker {
                Marker::Result => match invocation(&text) {
                    Some(invocation) => State::ToolDone(invocation),
                    None => return malformed(raw, "empty tool name"),
                },
                Marker::FinalAnswer => return malformed(raw, "final answer inside a tool call"),
                Marker::UseTool => return malformed(raw, "second tool before a result"),
            },
            (State::ToolDone(_), Token::Marker { marker: Marker::FinalAnswer, rest, line }) => {
                return final_answer(rest, &lines[line + 1..]);
            }
            (done @ State::ToolDone(_), _) => done,
        };
    }

    match state {
        State::ToolDone(invocation) => ParsedResponse::ToolInvocation(invocation),
        State::InTool(_) => malformed(raw, "tool call without a result"),
        State::Start => malformed(raw, "no marker"),
    }
}

fn malformed(raw: &str, reason: &str) -> ParsedResponse {
    debug!(reason, "malformed response");
    ParsedResponse::Malformed { raw_text: raw.to_string() }
}

fn final_answer(rest: &str, following: &[&str]) -> ParsedResponse {
    let mut content = rest.to_string();
    for line in following {
        content.push('\n');
        content.push_str(line);
    }
    ParsedResponse::FinalAnswer { content: strip_fence(&content).to_string() }
}

/// Splits the text between `Use Tool:` and `Result:` at its first comma.
fn invocation(text: &str) -> Option<ToolInvocation> {
    let text = strip_fence(text);
    let (name, input) = text.split_once(',').unwrap_or((text, ""));
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(ToolInvocation::new(name, input.trim()))
}

/// Trims whitespace and a trailing closing code fence.
fn strip_fence(text: &str) -> &str {
    let text = text.trim();
    text.strip_suffix(FENCE).map(str::trim_end).unwrap_or(text)
}
