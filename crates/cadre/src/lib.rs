//! # Cadre — prompt templates and response grammar for LLM crews
//!
//! Cadre renders the instructions a crew of agents is driven by and reads
//! back what the LLM answers. Every agent prompt is assembled from named
//! templates with `{placeholder}` tokens; every reply is classified as a tool
//! invocation, a final answer, or malformed output that earns a corrective
//! message.
//!
//! ## Quick Start — Render and Parse
//!
//! ```rust
//! use std::sync::Arc;
//! use cadre::prelude::*;
//!
//! let renderer = Renderer::new(Arc::new(TemplateStore::default_en()));
//! let vars = Variables::new()
//!     .with("tools", "Tool Name: search\nTool Description: Searches the web\nTool Arguments: query")
//!     .with("tool_names", "search");
//! let prompt = renderer.render(&TemplateKey::slice("tools"), &vars).unwrap();
//! assert!(prompt.contains("should be one of [search]"));
//!
//! match parse("Use Tool: search, Result: ...") {
//!     ParsedResponse::ToolInvocation(call) => assert_eq!(call.tool_name, "search"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Quick Start — Agent Run
//!
//! ```rust,ignore
//! use cadre::prelude::*;
//!
//! let executor = AgentExecutor::new(model, renderer, Persona::new("Researcher", goal, backstory))
//!     .tools(registry)
//!     .config(ExecutorConfig::from(&Settings::from_env()?));
//! let run = executor.run(&TaskPrompt::new("Summarize Rust 2024")).await?;
//! ```
//!
//! ## Crate Structure
//!
//! | Crate | Description |
//! |-------|-------------|
//! | [`cadre_core`] | Template keys, failures, parsed responses, messages |
//! | [`cadre_config`] | Template model, template store, settings |
//! | [`cadre_prompt`] | Renderer and prompt assembly |
//! | [`cadre_protocol`] | Response parser, recovery messages, turn state machine |
//! | `cadre_tools` | Tool trait, registry, delegation tools (feature `engine`) |
//! | `cadre_engine` | Tool usage, agent executor and tasks (feature `engine`) |

// Re-export core types
pub use cadre_core::{
    Failure, Message, MessageRole, ParsedResponse, TemplateError, TemplateKey, ToolInvocation,
};

// Re-export config
pub use cadre_config::{ConfigError, Segment, Settings, Template, TemplateStore, REQUIRED_TEMPLATES};

// Re-export prompt assembly
pub use cadre_prompt::{
    render_template, ExecutionPrompt, Persona, Renderer, TaskPrompt, ToolListing, Variables,
};

// Re-export protocol
pub use cadre_protocol::{
    parse, recovery_message, CoworkerRoster, Delegation, StopReason, Transition, Turn, TurnError,
    TurnState,
};

// Re-export tools
#[cfg(feature = "engine")]
pub use cadre_tools::{Delegate, DelegationKind, DelegationTool, Tool, ToolError, ToolRegistry};

// Re-export engine
#[cfg(feature = "engine")]
pub use cadre_engine::{
    AgentExecutor, AgentRun, EngineError, ExecutorConfig, LanguageModel, Task, TaskCallback,
    TaskOutput, ToolUsage, ToolsHandler,
};

// Tokenizer internals (hidden)
#[doc(hidden)]
pub use cadre_protocol::{tokenize, Marker, Token};

/// Prelude module for convenient imports.
///
/// ```rust
/// use cadre::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{Failure, Message, MessageRole, ParsedResponse, TemplateError, TemplateKey, ToolInvocation};

    // Templates
    pub use crate::{Renderer, Settings, TemplateStore, Variables};

    // Prompts
    pub use crate::{ExecutionPrompt, Persona, TaskPrompt};

    // Protocol
    pub use crate::{parse, recovery_message, CoworkerRoster, StopReason};

    // Engine
    #[cfg(feature = "engine")]
    pub use crate::{AgentExecutor, AgentRun, EngineError, ExecutorConfig, LanguageModel, Task, TaskOutput};

    // Tools
    #[cfg(feature = "engine")]
    pub use crate::{Delegate, Tool, ToolError, ToolRegistry};
}
