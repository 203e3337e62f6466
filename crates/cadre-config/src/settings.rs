//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use crate::ConfigError;

pub const PROMPT_FILE_VAR: &str = "CADRE_PROMPT_FILE";
pub const MAX_PARSING_ATTEMPTS_VAR: &str = "CADRE_MAX_PARSING_ATTEMPTS";
pub const REMEMBER_FORMAT_AFTER_VAR: &str = "CADRE_REMEMBER_FORMAT_AFTER";
pub const MAX_ITERATIONS_VAR: &str = "CADRE_MAX_ITERATIONS";
pub const MAX_MALFORMED_VAR: &str = "CADRE_MAX_MALFORMED";
pub const BIND_ADDR_VAR: &str = "CADRE_BIND_ADDR";

/// Knobs for template loading, tool usage and the agent executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Replacement template file; the bundled English set is used when `None`.
    pub prompt_file: Option<PathBuf>,
    /// Attempts at running a failing tool before giving up on it.
    pub max_parsing_attempts: u32,
    /// Every Nth tool use re-appends the tool list and format to the result.
    pub remember_format_after: u32,
    /// Iterations of one agent run before a final answer is forced.
    pub max_iterations: u32,
    /// Consecutive malformed responses tolerated before a run halts.
    pub max_malformed: u32,
    /// Listen address of the HTTP server.
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt_file: None,
            max_parsing_attempts: 3,
            remember_format_after: 3,
            max_iterations: 15,
            max_malformed: 3,
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset
    /// variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let counter = |name: &str, default: u32| positive(name, get(name), default);

        Ok(Self {
            prompt_file: get(PROMPT_FILE_VAR).map(PathBuf::from),
            max_parsing_attempts: counter(MAX_PARSING_ATTEMPTS_VAR, defaults.max_parsing_attempts)?,
            remember_format_after: counter(REMEMBER_FORMAT_AFTER_VAR, defaults.remember_format_after)?,
            max_iterations: counter(MAX_ITERATIONS_VAR, defaults.max_iterations)?,
            max_malformed: counter(MAX_MALFORMED_VAR, defaults.max_malformed)?,
            bind_addr: get(BIND_ADDR_VAR).unwrap_or(defaults.bind_addr),
        })
    }
}

/// Parses a counter that must be at least 1.
fn positive(var: &str, value: Option<String>, default: u32) -> Result<u32, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match u32::from_str(value.trim()) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid { var: var.to_string(), value }),
    }
}
