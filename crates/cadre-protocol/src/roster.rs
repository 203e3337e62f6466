use cadre_core::{fold_name, Failure};
use serde::{Deserialize, Serialize};

/// The co-workers an agent may delegate to, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoworkerRoster {
    roles: Vec<String>,
}

impl CoworkerRoster {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Self::default();
        for role in roles {
            roster.add(role);
        }
        roster
    }

    /// Adds a co-worker unless one with the same role is already present.
    pub fn add(&mut self, role: impl Into<String>) {
        let role = role.into().trim().to_string();
        if !role.is_empty() && self.find(&role).is_none() {
            self.roles.push(role);
        }
    }

    /// Case-insensitive lookup returning the role as registered.
    pub fn find(&self, name: &str) -> Option<&str> {
        let name = fold_name(name);
        self.roles
            .iter()
            .find(|r| fold_name(r) == name)
            .map(String::as_str)
    }

    /// Resolves `name` or produces the failure the agent is told about.
    pub fn check(&self, name: &str) -> Result<&str, Failure> {
        self.find(name).ok_or_else(|| Failure::UnknownCoworker {
            name: name.trim().to_string(),
            coworkers: self.joined(),
        })
    }

    /// Roles as they appear in `{coworkers}`.
    pub fn joined(&self) -> String {
        self.roles.join(", ")
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
