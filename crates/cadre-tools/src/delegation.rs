//! Built-in tools that hand work to co-workers.

use async_trait::async_trait;
use cadre_core::TemplateError;
use cadre_prompt::{Renderer, Variables};
use cadre_protocol::{recovery_message, CoworkerRoster, Delegation};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Tool, ToolError, ToolRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationKind {
    DelegateWork,
    AskQuestion,
}

impl DelegationKind {
    pub const ALL: [DelegationKind; 2] = [DelegationKind::DelegateWork, DelegationKind::AskQuestion];

    pub const fn tool_name(self) -> &'static str {
        match self {
            DelegationKind::DelegateWork => "Delegate work to co-worker",
            DelegationKind::AskQuestion => "Ask question to co-worker",
        }
    }

    /// Name of the description template under `tools`.
    pub const fn template(self) -> &'static str {
        match self {
            DelegationKind::DelegateWork => "delegate_work",
            DelegationKind::AskQuestion => "ask_question",
        }
    }
}

/// Runs a delegated task or question on behalf of a co-worker.
///
/// `delegation.coworker` is the role as registered in the roster.
#[async_trait]
pub trait Delegate: Send + Sync {
    async fn delegate(&self, kind: DelegationKind, delegation: Delegation) -> Result<String, ToolError>;
}

/// A delegation tool bound to a roster.
///
/// Bad input and unknown co-workers are not errors: the tool answers with the
/// `tool_arguments_error` or `unknown_coworker` text so the agent can retry.
pub struct DelegationTool {
    kind: DelegationKind,
    description: String,
    roster: CoworkerRoster,
    renderer: Renderer,
    delegate: Arc<dyn Delegate>,
}

impl DelegationTool {
    pub fn new(
        kind: DelegationKind,
        renderer: Renderer,
        roster: CoworkerRoster,
        delegate: Arc<dyn Delegate>,
    ) -> Result<Self, TemplateError> {
        let vars = Variables::new().with("coworkers", roster.joined());
        let description = renderer.tool(kind.template(), &vars)?;
        Ok(Self {
            kind,
            description,
            roster,
            renderer,
            delegate,
        })
    }

    pub fn kind(&self) -> DelegationKind {
        self.kind
    }
}

#[async_trait]
impl Tool for DelegationTool {
    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn arguments(&self) -> &str {
        "coworker|task|context"
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let Some(mut delegation) = Delegation::parse(input) else {
            warn!(tool = self.name(), "delegation input is not coworker|task|context");
            return Ok(self.renderer.error("tool_arguments_error", &Variables::new())?);
        };

        let coworker = match self.roster.check(&delegation.coworker) {
            Ok(role) => role.to_string(),
            Err(failure) => {
                warn!(coworker = %delegation.coworker, "unknown co-worker");
                return Ok(recovery_message(&self.renderer, &failure)?);
            }
        };

        info!(tool = self.name(), coworker = %coworker, "delegating");
        delegation.coworker = coworker;
        self.delegate.delegate(self.kind, delegation).await
    }
}

impl ToolRegistry {
    /// Registers both delegation tools for `roster`.
    pub fn register_delegation(
        &mut self,
        renderer: &Renderer,
        roster: &CoworkerRoster,
        delegate: Arc<dyn Delegate>,
    ) -> Result<(), TemplateError> {
        for kind in DelegationKind::ALL {
            self.register(DelegationTool::new(
                kind,
                renderer.clone(),
                roster.clone(),
                delegate.clone(),
            )?);
        }
        Ok(())
    }
}
