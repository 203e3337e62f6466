//! Prompt rendering and assembly for cadre.
//!
//! - [`Renderer`] — Renders a template by key with [`Variables`]
//! - [`render_template`] — Renders an already-resolved [`cadre_config::Template`]
//! - [`ExecutionPrompt`] — Role, tools, memory and task slices as one system prompt
//! - [`TaskPrompt`] — Task description with expected output and context
//! - [`Persona`] — Role, goal and backstory of an agent
//!
//! Rendering fails with [`cadre_core::TemplateError::UnknownTemplate`] when the
//! key is absent and with [`cadre_core::TemplateError::MissingPlaceholder`]
//! when a placeholder has no value; a token is never silently dropped.

mod prompts;
mod renderer;

pub use prompts::{ExecutionPrompt, Persona, TaskPrompt, ToolListing};
pub use renderer::{render_template, Renderer, Variables};
