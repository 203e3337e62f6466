//! Core domain types and error definitions for cadre.
//!
//! This crate provides the fundamental types shared across the cadre workspace:
//!
//! - [`TemplateKey`] — `category.name` address of a prompt template
//! - [`TemplateError`] — Programmer errors raised while rendering templates
//! - [`Failure`] — Conversational failures that are recovered by re-prompting
//! - [`ParsedResponse`] and [`ToolInvocation`] — Classified LLM output
//! - [`Message`] and [`MessageRole`] — Conversation message types
//!
//! # Example
//!
//! ```rust
//! use cadre_core::{Failure, TemplateKey};
//!
//! let key: TemplateKey = "slices.role_playing".parse().unwrap();
//! assert_eq!(key, TemplateKey::slice("role_playing"));
//!
//! let failure = Failure::UnknownTool {
//!     tool: "browser".to_string(),
//!     tools: "search, calculator".to_string(),
//! };
//! assert_eq!(failure.template_key(), TemplateKey::error("wrong_tool_name"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Template addressing
// ============================================================================

/// Category holding the prompt slices (`role_playing`, `tools`, `task`, ...).
pub const SLICES: &str = "slices";
/// Category holding the recovery messages.
pub const ERRORS: &str = "errors";
/// Category holding built-in tool descriptions.
pub const TOOLS: &str = "tools";

/// Address of a template inside a template store.
///
/// Written as `category.name`, e.g. `errors.unexpected_format`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateKey {
    pub category: String,
    pub name: String,
}

impl TemplateKey {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    /// Key of a prompt slice.
    pub fn slice(name: impl Into<String>) -> Self {
        Self::new(SLICES, name)
    }

    /// Key of a recovery message.
    pub fn error(name: impl Into<String>) -> Self {
        Self::new(ERRORS, name)
    }

    /// Key of a built-in tool description.
    pub fn tool(name: impl Into<String>) -> Self {
        Self::new(TOOLS, name)
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.name)
    }
}

impl FromStr for TemplateKey {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((category, name)) if !category.is_empty() && !name.is_empty() => {
                Ok(Self::new(category, name))
            }
            _ => Err(TemplateError::UnknownTemplate(s.to_string())),
        }
    }
}

impl TryFrom<String> for TemplateKey {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TemplateKey> for String {
    fn from(key: TemplateKey) -> Self {
        key.to_string()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while looking up or rendering a template.
///
/// These are defects in the calling code or the template set, not something
/// the LLM can correct, so they are surfaced to the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No template is registered under the key.
    #[error("Unknown template: '{0}'")]
    UnknownTemplate(String),

    /// The variable mapping lacks a placeholder referenced by the template.
    #[error("Template '{template}' is missing a value for placeholder '{{{placeholder}}}'")]
    MissingPlaceholder { template: String, placeholder: String },
}

/// A failure in the conversation that is recovered by re-prompting the LLM.
///
/// Each variant maps to a fixed recovery template, see [`Failure::template_key`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The response matched none of the grammar's shapes.
    #[error("Malformed response")]
    MalformedResponse {
        #[serde(default)]
        raw_text: String,
    },

    /// A delegation named a co-worker outside the roster.
    #[error("Unknown co-worker '{name}'")]
    UnknownCoworker { name: String, coworkers: String },

    /// The same tool was called with the same input twice in a row.
    #[error("Repeated call to '{tool}' with input '{tool_input}'")]
    RepeatedToolCall { tool: String, tool_input: String },

    /// The named tool is not available to the agent.
    #[error("Unknown tool '{tool}'")]
    UnknownTool { tool: String, tools: String },

    /// The tool raised an error on every attempt.
    #[error("Tool '{tool}' failed: {error}")]
    ToolExecutionFailure { tool: String, error: String },

    /// The agent used more tools than the orchestrator allows.
    #[error("Exceeded tool use limit")]
    ExceededToolUseLimit,
}

impl Failure {
    /// Returns the recovery template for this failure.
    pub fn template_key(&self) -> TemplateKey {
        let name = match self {
            Failure::MalformedResponse { .. } => "unexpected_format",
            Failure::UnknownCoworker { .. } => "unknown_coworker",
            Failure::RepeatedToolCall { .. } => "task_repeated_usage",
            Failure::UnknownTool { .. } => "wrong_tool_name",
            Failure::ToolExecutionFailure { .. } => "tool_usage_exception",
            Failure::ExceededToolUseLimit => "force_final_answer",
        };
        TemplateKey::error(name)
    }

    /// Returns the placeholder values the recovery template is rendered with.
    pub fn variables(&self) -> Vec<(&'static str, String)> {
        match self {
            Failure::MalformedResponse { .. } | Failure::ExceededToolUseLimit => Vec::new(),
            Failure::UnknownCoworker { coworkers, .. } => vec![("coworkers", coworkers.clone())],
            Failure::RepeatedToolCall { tool, tool_input } => {
                vec![("tool", tool.clone()), ("tool_input", tool_input.clone())]
            }
            Failure::UnknownTool { tool, tools } => {
                vec![("tool", tool.clone()), ("tools", tools.clone())]
            }
            Failure::ToolExecutionFailure { tool, error } => {
                vec![("tool", tool.clone()), ("error", error.clone())]
            }
        }
    }
}

// ============================================================================
// Parsed responses
// ============================================================================

/// A request, embedded in free text, to run one tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool, as written by the LLM.
    pub tool_name: String,
    /// All remaining input and context for the tool.
    pub tool_input: String,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, tool_input: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input: tool_input.into(),
        }
    }
}

/// Normalizes a tool or co-worker name for matching: trimmed, Unicode
/// lowercase.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Classification of one raw LLM response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedResponse {
    /// The LLM wants a tool run before continuing.
    ToolInvocation(ToolInvocation),
    /// The LLM produced its terminal answer.
    FinalAnswer { content: String },
    /// The response fits none of the expected shapes.
    Malformed { raw_text: String },
}

impl ParsedResponse {
    /// Returns `true` for a final answer.
    pub fn is_final(&self) -> bool {
        matches!(self, ParsedResponse::FinalAnswer { .. })
    }

    /// Returns a short label for logging.
    #[doc(hidden)]
    pub fn label(&self) -> &'static str {
        match self {
            ParsedResponse::ToolInvocation(_) => "tool invocation",
            ParsedResponse::FinalAnswer { .. } => "final answer",
            ParsedResponse::Malformed { .. } => "malformed",
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message sent to the LLM (prompts, observations, recovery text).
    User,
    /// Message from the LLM.
    Assistant,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    /// Creates a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}
