//! Template store and runtime settings for cadre.
//!
//! This crate owns everything loaded at startup:
//!
//! - [`Template`] — A template parsed into literal and placeholder segments
//! - [`TemplateStore`] — Category -> name -> template, loaded from JSON
//! - [`REQUIRED_TEMPLATES`] — The templates the workspace relies on
//! - [`Settings`] — Environment-driven knobs (`CADRE_*` variables)
//!
//! # Loading at Startup
//!
//! ```rust,ignore
//! use cadre_config::{Settings, TemplateStore};
//!
//! let settings = Settings::from_env()?;
//! let store = TemplateStore::load(&settings)?; // bundled set unless CADRE_PROMPT_FILE is set
//! ```
//!
//! # Template File Format
//!
//! A JSON object of categories, each an object of template strings:
//!
//! ```json
//! {
//!   "slices": { "role_playing": "You are {role}.\n{backstory}\n\nYour personal goal is: {goal}" },
//!   "errors": { "unexpected_format": "Sorry, I didn't use the expected format." }
//! }
//! ```

mod settings;
mod store;
mod template;

pub use settings::{
    Settings, BIND_ADDR_VAR, MAX_ITERATIONS_VAR, MAX_MALFORMED_VAR, MAX_PARSING_ATTEMPTS_VAR,
    PROMPT_FILE_VAR, REMEMBER_FORMAT_AFTER_VAR,
};
pub use store::{TemplateStore, REQUIRED_TEMPLATES};
pub use template::{Segment, Template};

use cadre_core::TemplateError;

/// Errors that can occur when loading templates or settings.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Failed to read a template file.
    #[error("Failed to read template file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the template JSON.
    #[error("Failed to parse templates: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to parse a template file.
    #[error("Failed to parse template file '{path}': {source}")]
    ParseFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A template the workspace relies on is absent.
    #[error("Required template not found: '{0}'")]
    MissingTemplate(String),

    /// A template failed startup validation.
    #[error("Invalid template '{key}': {message}")]
    Validation { key: String, message: String },

    /// An environment variable holds an unusable value.
    #[error("Invalid value '{value}' for {var}")]
    Invalid { var: String, value: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ConfigError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Creates a validation error.
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            key: key.into(),
            message: message.into(),
        }
    }
}
