//! Running the tool an agent asked for and shaping the observation it gets back.

use std::collections::HashMap;

use cadre_core::{fold_name, Failure, ToolInvocation};
use cadre_prompt::{Renderer, Variables};
use cadre_protocol::recovery_message;
use cadre_tools::{Tool, ToolRegistry};
use tracing::{info, warn};

use crate::{EngineError, ExecutorConfig};

/// Remembers the last tool call and caches tool results by (tool, input).
#[derive(Debug, Clone, Default)]
pub struct ToolsHandler {
    last_used: Option<ToolInvocation>,
    cache: HashMap<(String, String), String>,
}

impl ToolsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_used(&self) -> Option<&ToolInvocation> {
        self.last_used.as_ref()
    }

    pub fn read(&self, tool: &str, input: &str) -> Option<&str> {
        self.cache.get(&cache_key(tool, input)).map(String::as_str)
    }

    pub fn on_tool_use(&mut self, invocation: &ToolInvocation, output: &str) {
        self.cache.insert(
            cache_key(&invocation.tool_name, &invocation.tool_input),
            output.to_string(),
        );
        self.last_used = Some(invocation.clone());
    }

    /// True if `invocation` repeats the last call exactly.
    pub fn is_repeat(&self, invocation: &ToolInvocation) -> bool {
        self.last_used.as_ref().is_some_and(|last| {
            fold_name(&last.tool_name) == fold_name(&invocation.tool_name)
                && last.tool_input == invocation.tool_input
        })
    }
}

fn cache_key(tool: &str, input: &str) -> (String, String) {
    (fold_name(tool), input.to_string())
}

/// Executes tool invocations for one agent run.
///
/// Every outcome is an observation string for the agent. Only template
/// problems surface as errors.
#[derive(Debug)]
pub struct ToolUsage {
    registry: ToolRegistry,
    renderer: Renderer,
    handler: ToolsHandler,
    max_parsing_attempts: u32,
    remember_format_after: u32,
    used_tools: u32,
}

impl ToolUsage {
    pub fn new(registry: ToolRegistry, renderer: Renderer, config: &ExecutorConfig) -> Self {
        Self {
            registry,
            renderer,
            handler: ToolsHandler::new(),
            max_parsing_attempts: config.max_parsing_attempts.max(1),
            remember_format_after: config.remember_format_after.max(1),
            used_tools: 0,
        }
    }

    /// Tools used so far, repeats and cache hits included.
    pub fn used_tools(&self) -> u32 {
        self.used_tools
    }

    pub fn handler(&self) -> &ToolsHandler {
        &self.handler
    }

    /// Runs `invocation` and returns the observation for the agent.
    pub async fn use_tool(&mut self, invocation: &ToolInvocation) -> Result<String, EngineError> {
        let Some(tool) = self.registry.get(&invocation.tool_name) else {
            warn!("║       ⚠ Unknown tool: {}", invocation.tool_name);
            let failure = Failure::UnknownTool {
                tool: invocation.tool_name.clone(),
                tools: self.registry.tool_names(),
            };
            return Ok(recovery_message(&self.renderer, &failure)?);
        };

        let observation = if self.handler.is_repeat(invocation) {
            warn!("║       ⚠ Repeated call: {}({})", invocation.tool_name, invocation.tool_input);
            let failure = Failure::RepeatedToolCall {
                tool: invocation.tool_name.clone(),
                tool_input: invocation.tool_input.clone(),
            };
            let text = recovery_message(&self.renderer, &failure)?;
            self.format_result(text)?
        } else if let Some(cached) = self.handler.read(tool.name(), &invocation.tool_input) {
            info!("║       → Cached result for: {}", tool.name());
            let text = cached.to_string();
            self.format_result(text)?
        } else {
            match self.run_with_retries(tool.as_ref(), &invocation.tool_input).await? {
                Ok(text) => {
                    self.handler.on_tool_use(invocation, &text);
                    self.format_result(text)?
                }
                Err(given_up) => given_up,
            }
        };

        let reminder = self.renderer.slice("final_answer_format", &Variables::new())?;
        Ok(format!("{observation}\n\n{reminder}"))
    }

    /// Runs the tool up to `max_parsing_attempts` times.
    ///
    /// The inner `Err` is the give-up observation.
    async fn run_with_retries(
        &self,
        tool: &dyn Tool,
        input: &str,
    ) -> Result<Result<String, String>, EngineError> {
        let mut attempt = 1;
        loop {
            info!("║       → Executing tool: {} (attempt {})", tool.name(), attempt);
            match tool.run(input).await {
                Ok(result) => {
                    info!("║       ← Tool result: {} chars", result.len());
                    return Ok(Ok(result));
                }
                Err(e) if attempt < self.max_parsing_attempts => {
                    warn!("║       ⚠ Tool {} failed: {}", tool.name(), e);
                    attempt += 1;
                }
                Err(e) => {
                    warn!("║       ⚠ Giving up on {} after {} attempts: {}", tool.name(), attempt, e);
                    let failure = Failure::ToolExecutionFailure {
                        tool: tool.name().to_string(),
                        error: e.to_string(),
                    };
                    let message = recovery_message(&self.renderer, &failure)?;
                    let format = self.format_reminder()?;
                    return Ok(Err(format!("\n{message}.\nMoving on then. {format}")));
                }
            }
        }
    }

    /// Counts the use and, every `remember_format_after` uses, appends the
    /// tool list with the expected format.
    fn format_result(&mut self, result: String) -> Result<String, EngineError> {
        self.used_tools += 1;
        if self.used_tools % self.remember_format_after != 0 {
            return Ok(result);
        }
        info!("║       → Reminding format after {} tool uses", self.used_tools);
        let vars = Variables::new()
            .with("tools", self.registry.descriptions())
            .with("tool_names", self.registry.tool_names());
        let tools = self.renderer.slice("tools", &vars)?;
        Ok(format!("{result}\n\n{tools}"))
    }

    pub(crate) fn format_reminder(&self) -> Result<String, EngineError> {
        let vars = Variables::new().with("tool_names", self.registry.tool_names());
        Ok(self.renderer.slice("format", &vars)?)
    }
}
