//! Assembly of full agent prompts from slices.

use cadre_config::{Template, TemplateStore};
use cadre_core::{TemplateError, TemplateKey};
use serde::{Deserialize, Serialize};

use crate::{render_template, Renderer, Variables};

/// Who an agent is: the values behind the `role_playing` slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Persona {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// The manager persona used by hierarchical crews.
    pub fn manager(store: &TemplateStore) -> Result<Self, TemplateError> {
        let field = |name: &str| {
            store
                .get(&TemplateKey::new("hierarchical_manager_agent", name))
                .map(|t| t.source().to_string())
        };
        Ok(Self {
            role: field("role")?,
            goal: field("goal")?,
            backstory: field("backstory")?,
        })
    }
}

/// The `{tools}` and `{tool_names}` values describing an agent's toolbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolListing {
    /// One description block per tool.
    pub descriptions: String,
    /// Comma separated tool names.
    pub names: String,
}

/// A task as the agent sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPrompt {
    pub description: String,
    /// Criteria for the final answer, appended via the `expected_output` slice.
    #[serde(default)]
    pub expected_output: Option<String>,
    /// Outputs of earlier tasks this one builds on.
    #[serde(default)]
    pub context: Vec<String>,
}

impl TaskPrompt {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    pub fn context(mut self, output: impl Into<String>) -> Self {
        self.context.push(output.into());
        self
    }

    /// Renders the task text: description, expected output criteria, then the
    /// shared context (joined by newlines) through `task_with_context`.
    pub fn render(&self, renderer: &Renderer) -> Result<String, TemplateError> {
        let mut task = self.description.clone();
        if let Some(expected) = &self.expected_output {
            let vars = Variables::new().with("expected_output", expected);
            task.push('\n');
            task.push_str(&renderer.slice("expected_output", &vars)?);
        }

        if self.context.is_empty() {
            return Ok(task);
        }

        let vars = Variables::new()
            .with("task", task)
            .with("context", self.context.join("\n"));
        renderer.slice("task_with_context", &vars)
    }
}

/// Builds the system prompt an agent executes a task with.
///
/// Concatenates `role_playing`, `tools` (or `no_tools` when the agent has
/// none), `memory` when a chat history is present, and `task` into one
/// template before substituting, so a value can never be re-interpreted as a
/// placeholder of a later slice.
///
/// ```rust
/// use std::sync::Arc;
/// use cadre_config::TemplateStore;
/// use cadre_prompt::{ExecutionPrompt, Persona, Renderer};
///
/// let renderer = Renderer::new(Arc::new(TemplateStore::default_en()));
/// let persona = Persona::new("Researcher", "Find facts", "You love sources.");
/// let prompt = ExecutionPrompt::new(&persona, "Summarize Rust 2024")
///     .render(&renderer)
///     .unwrap();
/// assert!(prompt.starts_with("You are Researcher."));
/// assert!(prompt.contains("Current Task: Summarize Rust 2024"));
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionPrompt<'a> {
    persona: &'a Persona,
    input: String,
    tools: Option<&'a ToolListing>,
    chat_history: Option<String>,
}

impl<'a> ExecutionPrompt<'a> {
    pub fn new(persona: &'a Persona, input: impl Into<String>) -> Self {
        Self {
            persona,
            input: input.into(),
            tools: None,
            chat_history: None,
        }
    }

    /// Gives the agent tools; an empty listing counts as no tools.
    pub fn tools(mut self, tools: &'a ToolListing) -> Self {
        self.tools = Some(tools).filter(|t| !t.names.is_empty());
        self
    }

    pub fn chat_history(mut self, history: impl Into<String>) -> Self {
        self.chat_history = Some(history.into()).filter(|h| !h.is_empty());
        self
    }

    /// Names of the slices this prompt is built from, in order.
    pub fn slices(&self) -> Vec<&'static str> {
        let mut slices = vec!["role_playing"];
        slices.push(if self.tools.is_some() { "tools" } else { "no_tools" });
        if self.chat_history.is_some() {
            slices.push("memory");
        }
        slices.push("task");
        slices
    }

    pub fn render(&self, renderer: &Renderer) -> Result<String, TemplateError> {
        let slices = self.slices();
        let parts = slices
            .iter()
            .map(|name| renderer.store().get(&TemplateKey::slice(*name)))
            .collect::<Result<Vec<&Template>, _>>()?;
        let template = Template::concat(parts);

        let mut vars = Variables::new()
            .with("role", &self.persona.role)
            .with("goal", &self.persona.goal)
            .with("backstory", &self.persona.backstory)
            .with("input", &self.input);
        if let Some(tools) = self.tools {
            vars.insert("tools", &tools.descriptions);
            vars.insert("tool_names", &tools.names);
        }
        if let Some(history) = &self.chat_history {
            vars.insert("chat_history", history);
        }

        render_template(&template, &format!("slices.{}", slices.join("+")), &vars)
    }
}
