use std::sync::Arc;

use cadre_config::Settings;
use cadre_core::{Failure, Message};
use cadre_prompt::{ExecutionPrompt, Persona, Renderer, TaskPrompt};
use cadre_protocol::{parse, recovery_message, StopReason, Transition, Turn};
use cadre_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{EngineError, LanguageModel, ToolUsage};

/// Limits for one agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub max_iterations: u32,
    pub max_malformed: u32,
    pub max_parsing_attempts: u32,
    pub remember_format_after: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ExecutorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            max_malformed: settings.max_malformed,
            max_parsing_attempts: settings.max_parsing_attempts,
            remember_format_after: settings.remember_format_after,
        }
    }
}

/// Outcome of [`AgentExecutor::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: Uuid,
    /// The final answer; `None` when the run halted.
    pub answer: Option<String>,
    /// LLM responses consumed.
    pub iterations: u32,
    pub stop: StopReason,
    /// The full exchange after the system prompt.
    pub messages: Vec<Message>,
}

/// Drives one agent through a task: prompt, parse, run tools, recover.
pub struct AgentExecutor {
    model: Arc<dyn LanguageModel>,
    renderer: Renderer,
    persona: Persona,
    tools: ToolRegistry,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn LanguageModel>, renderer: Renderer, persona: Persona) -> Self {
        Self {
            model,
            renderer,
            persona,
            tools: ToolRegistry::new(),
            config: ExecutorConfig::default(),
        }
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// The agent's own tools, used when a task brings none.
    pub fn registry(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Builds the system prompt for `task`.
    pub fn system_prompt(&self, task: &TaskPrompt, chat_history: Option<&str>) -> Result<String, EngineError> {
        self.render_system(&self.tools, task.render(&self.renderer)?, chat_history)
    }

    fn render_system(
        &self,
        tools: &ToolRegistry,
        input: String,
        chat_history: Option<&str>,
    ) -> Result<String, EngineError> {
        let listing = tools.listing();
        let mut prompt = ExecutionPrompt::new(&self.persona, input).tools(&listing);
        if let Some(history) = chat_history {
            prompt = prompt.chat_history(history);
        }
        Ok(prompt.render(&self.renderer)?)
    }

    pub async fn run(&self, task: &TaskPrompt) -> Result<AgentRun, EngineError> {
        self.run_with_history(task, None).await
    }

    /// Runs `task`, with a summary of earlier work rendered through the
    /// `memory` slice.
    pub async fn run_with_history(
        &self,
        task: &TaskPrompt,
        chat_history: Option<&str>,
    ) -> Result<AgentRun, EngineError> {
        self.run_with_tools(task, &self.tools, chat_history).await
    }

    /// Runs `task` with `tools` in place of the agent's own registry.
    pub(crate) async fn run_with_tools(
        &self,
        task: &TaskPrompt,
        tools: &ToolRegistry,
        chat_history: Option<&str>,
    ) -> Result<AgentRun, EngineError> {
        let id = Uuid::new_v4();
        let input = task.render(&self.renderer)?;
        let system = self.render_system(tools, input.clone(), chat_history)?;
        let mut usage = ToolUsage::new(tools.clone(), self.renderer.clone(), &self.config);
        let mut turn = Turn::new(self.config.max_iterations, self.config.max_malformed);
        let mut messages = vec![Message::user(input)];

        info!("╔══════════════════════════════════════════════════════════════");
        info!("║ AGENT RUN: {} ({})", self.persona.role, id);
        info!("║ Task: {}...", task.description.chars().take(50).collect::<String>());
        if !tools.is_empty() {
            info!("║ Tools: {:?}", tools.names());
        }
        info!("╠══════════════════════════════════════════════════════════════");

        loop {
            let raw = self.model.complete(&system, &messages).await?;
            let parsed = parse(&raw);
            debug!("║     ← Response: {} chars, {}", raw.len(), parsed.label());
            messages.push(Message::assistant(raw));

            match turn.on_response(&parsed)? {
                Transition::RunTool(invocation) => {
                    info!("║ [{}] Use Tool: {}", turn.iterations(), invocation.tool_name);
                    let observation = usage.use_tool(&invocation).await?;
                    turn.on_tool_result()?;
                    messages.push(Message::user(format!("Result: {observation}")));
                }
                Transition::Reprompt(failure) => {
                    warn!("║ [{}] ⚠ {}", turn.iterations(), failure);
                    let content = self.recovery(&usage, &failure)?;
                    messages.push(Message::user(content));
                }
                Transition::Finish(answer) => {
                    info!("║ ✓ Final answer after {} iterations", turn.iterations());
                    info!("╚══════════════════════════════════════════════════════════════");
                    return Ok(AgentRun {
                        id,
                        answer: Some(answer),
                        iterations: turn.iterations(),
                        stop: StopReason::FinalAnswer,
                        messages,
                    });
                }
                Transition::Halt(stop) => {
                    warn!("║ ⚠ Halted after {} iterations: {:?}", turn.iterations(), stop);
                    info!("╚══════════════════════════════════════════════════════════════");
                    return Ok(AgentRun {
                        id,
                        answer: None,
                        iterations: turn.iterations(),
                        stop,
                        messages,
                    });
                }
            }
        }
    }

    /// The recovery text, followed by the format reminder for malformed output.
    fn recovery(&self, usage: &ToolUsage, failure: &Failure) -> Result<String, EngineError> {
        let message = recovery_message(&self.renderer, failure)?;
        match failure {
            Failure::MalformedResponse { .. } => {
                Ok(format!("{message}\n{}", usage.format_reminder()?))
            }
            _ => Ok(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadre_config::TemplateStore;
    use cadre_core::MessageRole;
    use cadre_tools::{Tool, ToolError};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replies from a script and records what it was sent.
    struct Scripted {
        replies: Mutex<VecDeque<String>>,
        systems: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                systems: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for Scripted {
        async fn complete(&self, system: &str, _messages: &[Message]) -> Result<String, EngineError> {
            self.systems.lock().unwrap().push(system.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| EngineError::Model("script exhausted".to_string()))
        }
    }

    struct Weather;

    #[async_trait]
    impl Tool for Weather {
        fn name(&self) -> &str {
            "weather"
        }

        fn description(&self) -> &str {
            "Current weather for a city"
        }

        async fn run(&self, input: &str) -> Result<String, ToolError> {
            Ok(format!("Sunny in {input}"))
        }
    }

    fn executor(model: Arc<Scripted>) -> AgentExecutor {
        let renderer = Renderer::new(Arc::new(TemplateStore::default_en()));
        let mut tools = ToolRegistry::new();
        tools.register(Weather);
        AgentExecutor::new(model, renderer, Persona::new("Local Expert", "Provide insights", "You know the city."))
            .tools(tools)
    }

    #[tokio::test]
    async fn test_direct_final_answer() {
        let model = Scripted::new(&["Final Answer: Paris is the capital."]);
        let run = executor(model.clone()).run(&TaskPrompt::new("Capital of France?")).await.unwrap();
        assert_eq!(run.answer.as_deref(), Some("Paris is the capital."));
        assert_eq!(run.stop, StopReason::FinalAnswer);
        assert_eq!(run.iterations, 1);

        let systems = model.systems.lock().unwrap();
        assert!(systems[0].starts_with("You are Local Expert."));
        assert!(systems[0].contains("Tool Name: weather"));
        assert!(systems[0].contains("Current Task: Capital of France?"));
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let model = Scripted::new(&[
            "I should check.\nUse Tool: weather, Lisbon\nResult:",
            "Final Answer: Go outside.",
        ]);
        let run = executor(model).run(&TaskPrompt::new("Plan my day")).await.unwrap();
        assert_eq!(run.answer.as_deref(), Some("Go outside."));
        assert_eq!(run.iterations, 2);

        let observation = &run.messages[2];
        assert_eq!(observation.role, MessageRole::User);
        assert!(observation.content.starts_with("Result: Sunny in Lisbon\n\nIf I don't need to use any more tools"));
    }

    #[tokio::test]
    async fn test_malformed_response_gets_recovery_and_format() {
        let model = Scripted::new(&["I think it is sunny.", "Final Answer: Sunny."]);
        let run = executor(model).run(&TaskPrompt::new("Weather?")).await.unwrap();
        assert_eq!(run.answer.as_deref(), Some("Sunny."));

        let recovery = &run.messages[2].content;
        assert!(recovery.starts_with("\nSorry, I didn't use the expected format"));
        assert!(recovery.contains("should be one of [weather]"));
    }

    #[tokio::test]
    async fn test_malformed_limit_halts() {
        let config = ExecutorConfig { max_malformed: 1, ..ExecutorConfig::default() };
        let model = Scripted::new(&["nope", "still nope"]);
        let run = executor(model).config(config).run(&TaskPrompt::new("x")).await.unwrap();
        assert_eq!(run.answer, None);
        assert_eq!(run.stop, StopReason::MalformedLimit);
        assert_eq!(run.iterations, 2);
    }

    #[tokio::test]
    async fn test_iteration_limit_forces_final_answer() {
        let config = ExecutorConfig { max_iterations: 2, ..ExecutorConfig::default() };
        let model = Scripted::new(&[
            "Use Tool: weather, Oslo\nResult:",
            "Use Tool: weather, Rome\nResult:",
            "Final Answer: Pack an umbrella.",
        ]);
        let run = executor(model).config(config).run(&TaskPrompt::new("x")).await.unwrap();
        assert_eq!(run.answer.as_deref(), Some("Pack an umbrella."));
        assert_eq!(run.iterations, 3);
        assert!(run.messages[4].content.starts_with("Actually, I used too many tools"));
    }

    #[tokio::test]
    async fn test_ignored_force_halts() {
        let config = ExecutorConfig { max_iterations: 1, ..ExecutorConfig::default() };
        let model = Scripted::new(&["Use Tool: weather, Oslo\nResult:", "Use Tool: weather, Rome\nResult:"]);
        let run = executor(model).config(config).run(&TaskPrompt::new("x")).await.unwrap();
        assert_eq!(run.answer, None);
        assert_eq!(run.stop, StopReason::IterationLimit);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Scripted::new(&[]);
        let err = executor(model).run(&TaskPrompt::new("x")).await.unwrap_err();
        assert!(matches!(err, EngineError::Model(_)));
    }

    #[tokio::test]
    async fn test_history_adds_memory_slice() {
        let model = Scripted::new(&["Final Answer: ok"]);
        executor(model.clone())
            .run_with_history(&TaskPrompt::new("x"), Some("Booked the hotel."))
            .await
            .unwrap();
        let systems = model.systems.lock().unwrap();
        assert!(systems[0].contains("This is the summary of your work so far:\nBooked the hotel."));
    }
}
