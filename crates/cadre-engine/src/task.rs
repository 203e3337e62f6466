//! A unit of work handed to an agent, with its own tools and outputs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cadre_prompt::TaskPrompt;
use cadre_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{AgentExecutor, EngineError};

/// The result of a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub description: String,
    /// The agent's final answer, unmodified.
    pub raw_output: String,
}

/// Called once with the output when a task completes.
pub type TaskCallback = Arc<dyn Fn(&TaskOutput) + Send + Sync>;

/// A task: the prompt an agent works from, plus what happens around the run.
///
/// Tools given to the task replace the agent's own for that run. On a final
/// answer the output is recorded, written to `output_file` if set, and passed
/// to the callback.
///
/// # Example
///
/// ```rust,ignore
/// let mut task = Task::new("Score the title 'The impact of AI'")
///     .expected_output("An integer between 1 and 5.")
///     .output_file("score.txt");
/// let output = task.execute(&scorer).await?;
/// ```
pub struct Task {
    id: Uuid,
    prompt: TaskPrompt,
    tools: ToolRegistry,
    callback: Option<TaskCallback>,
    output_file: Option<PathBuf>,
    output: Option<TaskOutput>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self::from_prompt(TaskPrompt::new(description))
    }

    pub fn from_prompt(prompt: TaskPrompt) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt,
            tools: ToolRegistry::new(),
            callback: None,
            output_file: None,
            output: None,
        }
    }

    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.prompt = self.prompt.expected_output(expected);
        self
    }

    /// Adds the raw output of an earlier task as context.
    pub fn context_from(mut self, earlier: &TaskOutput) -> Self {
        self.prompt = self.prompt.context(earlier.raw_output.clone());
        self
    }

    /// Restricts the agent to `tools` for this task.
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn callback(mut self, callback: impl Fn(&TaskOutput) + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Writes the final answer to `path` on completion.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn prompt(&self) -> &TaskPrompt {
        &self.prompt
    }

    /// The output of the last successful [`Task::execute`].
    pub fn output(&self) -> Option<&TaskOutput> {
        self.output.as_ref()
    }

    /// The tools a run with `agent` uses: the task's own if it has any.
    pub fn effective_tools<'a>(&'a self, agent: &'a AgentExecutor) -> &'a ToolRegistry {
        if self.tools.is_empty() {
            agent.registry()
        } else {
            &self.tools
        }
    }

    /// Runs the task with `agent`.
    ///
    /// A run that halts without a final answer is an error; the callback and
    /// output file are skipped in that case.
    pub async fn execute(&mut self, agent: &AgentExecutor) -> Result<TaskOutput, EngineError> {
        let run = agent
            .run_with_tools(&self.prompt, self.effective_tools(agent), None)
            .await?;
        let Some(answer) = run.answer else {
            return Err(EngineError::NoAnswer {
                task: self.prompt.description.clone(),
                stop: run.stop,
            });
        };

        let output = TaskOutput {
            description: self.prompt.description.clone(),
            raw_output: answer,
        };
        if let Some(path) = &self.output_file {
            save(path, &output.raw_output)?;
        }
        if let Some(callback) = &self.callback {
            callback(&output);
        }
        self.output = Some(output.clone());
        Ok(output)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("prompt", &self.prompt)
            .field("tools", &self.tools.names())
            .field("callback", &self.callback.is_some())
            .field("output_file", &self.output_file)
            .field("output", &self.output)
            .finish()
    }
}

fn save(path: &Path, content: &str) -> Result<(), EngineError> {
    fs::write(path, content).map_err(|source| EngineError::Output {
        path: path.display().to_string(),
        source,
    })?;
    info!("║ Saved task output to {}", path.display());
    Ok(())
}
