use serde::{Deserialize, Serialize};

/// Separator between the fields of a delegation tool input.
pub const DELEGATION_SEPARATOR: char = '|';

/// A delegation request as written by the agent: `coworker|task|context`.
///
/// The context is everything after the second separator, so it may itself
/// contain `|`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub coworker: String,
    pub task: String,
    pub context: String,
}

impl Delegation {
    /// Returns `None` unless all three fields are present and non-empty.
    pub fn parse(input: &str) -> Option<Self> {
        let mut fields = input.splitn(3, DELEGATION_SEPARATOR).map(str::trim);
        let coworker = fields.next().filter(|f| !f.is_empty())?;
        let task = fields.next().filter(|f| !f.is_empty())?;
        let context = fields.next().filter(|f| !f.is_empty())?;
        Some(Self {
            coworker: coworker.to_string(),
            task: task.to_string(),
            context: context.to_string(),
        })
    }
}
