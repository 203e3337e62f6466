//! Tools available to cadre agents.
//!
//! - [`Tool`] — Trait for implementing custom tools
//! - [`ToolRegistry`] — Ordered set of an agent's tools with name lookup
//! - [`DelegationTool`] — Built-in `Delegate work to co-worker` / `Ask question to co-worker`
//! - [`Delegate`] — Hands a delegated task to a co-worker
//!
//! Tools take the raw text after the tool name in a `Use Tool:` line and
//! return the observation fed back to the agent.
//!
//! # Implementing a Custom Tool
//!
//! ```rust
//! use async_trait::async_trait;
//! use cadre_tools::{Tool, ToolError};
//!
//! struct Calculator;
//!
//! #[async_trait]
//! impl Tool for Calculator {
//!     fn name(&self) -> &str { "calculator" }
//!     fn description(&self) -> &str { "Adds two integers written as `a + b`" }
//!     fn arguments(&self) -> &str { "a + b" }
//!     async fn run(&self, input: &str) -> Result<String, ToolError> {
//!         let (a, b) = input
//!             .split_once('+')
//!             .ok_or_else(|| ToolError::InvalidArguments(input.to_string()))?;
//!         let parse = |s: &str| {
//!             s.trim()
//!                 .parse::<i64>()
//!                 .map_err(|e| ToolError::InvalidArguments(e.to_string()))
//!         };
//!         Ok((parse(a)? + parse(b)?).to_string())
//!     }
//! }
//! ```

mod delegation;

pub use delegation::{Delegate, DelegationKind, DelegationTool};

use async_trait::async_trait;
use cadre_core::{fold_name, TemplateError};
use cadre_prompt::ToolListing;
use std::sync::Arc;
use thiserror::Error;

/// Separator between tool description blocks in `{tools}`.
pub const DESCRIPTION_SEPARATOR: &str = "\n--\n";

/// Errors that can occur during tool execution.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool execution failed with a message.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// The tool input could not be understood.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// A capability an agent invokes with `Use Tool: <name>, <input>`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name the agent calls this tool by.
    fn name(&self) -> &str;

    /// Returns a description of what this tool does.
    fn description(&self) -> &str;

    /// Describes the expected input.
    fn arguments(&self) -> &str {
        ""
    }

    /// Runs the tool on the raw input text.
    async fn run(&self, input: &str) -> Result<String, ToolError>;

    /// The block listed for this tool in the `tools` slice.
    fn description_block(&self) -> String {
        format!(
            "Tool Name: {}\nTool Description: {}\nTool Arguments: {}",
            self.name(),
            self.description(),
            self.arguments()
        )
    }
}

/// The tools of one agent, in registration order.
///
/// Lookup ignores case and surrounding whitespace, since the name comes from
/// LLM output.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// If a tool with the same name already exists, it is replaced in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        match self.position(tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.position(name).map(|idx| self.tools[idx].clone())
    }

    /// Returns true if a tool with the given name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the names of all registered tools.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool names as listed in `{tool_names}` and recovery messages.
    pub fn tool_names(&self) -> String {
        self.names().join(", ")
    }

    /// Description blocks of all tools as listed in `{tools}`.
    pub fn descriptions(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.description_block())
            .collect::<Vec<_>>()
            .join(DESCRIPTION_SEPARATOR)
    }

    pub fn listing(&self) -> ToolListing {
        ToolListing {
            descriptions: self.descriptions(),
            names: self.tool_names(),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = fold_name(name);
        self.tools.iter().position(|t| fold_name(t.name()) == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Repeats the input"
        }

        fn arguments(&self) -> &str {
            "any text"
        }

        async fn run(&self, input: &str) -> Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn test_description_block() {
        assert_eq!(
            Echo("echo").description_block(),
            "Tool Name: echo\nTool Description: Repeats the input\nTool Arguments: any text"
        );
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo("search"));
        registry.register(Echo("fetch"));
        registry.register(Echo("Search"));
        assert_eq!(registry.names(), ["Search", "fetch"]);
        assert_eq!(registry.tool_names(), "Search, fetch");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo("Web Search"));
        assert!(registry.has("  web search "));
        assert_eq!(registry.get("WEB SEARCH").map(|t| t.name().to_string()), Some("Web Search".to_string()));
        assert!(registry.get("search").is_none());
    }

    #[test]
    fn test_lookup_folds_non_ascii_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo("Übersetzer"));
        assert!(registry.has("ÜBERSETZER"));
        assert!(registry.has("übersetzer"));
    }

    #[test]
    fn test_listing() {
        let mut registry = ToolRegistry::new();
        assert_eq!(registry.listing(), ToolListing::default());

        registry.register(Echo("a"));
        registry.register(Echo("b"));
        let listing = registry.listing();
        assert_eq!(listing.names, "a, b");
        assert_eq!(listing.descriptions.matches(DESCRIPTION_SEPARATOR).count(), 1);
        assert!(listing.descriptions.starts_with("Tool Name: a\n"));
    }

    #[tokio::test]
    async fn test_run_through_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo("echo"));
        let tool = registry.get("echo").unwrap();
        assert_eq!(tool.run("hello").await.unwrap(), "hello");
    }
}
