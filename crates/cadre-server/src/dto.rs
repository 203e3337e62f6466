//! Data transfer objects for HTTP message serialization.

use cadre::Variables;
use serde::{Deserialize, Serialize};

// === Templates ===

/// One template of the loaded store.
#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub key: String,
    pub placeholders: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub templates: Vec<TemplateInfo>,
}

// === Rendering ===

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// `category.name`
    pub template: String,
    #[serde(default)]
    pub variables: Variables,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub template: String,
    pub text: String,
}

// === Parsing ===

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

// === Recovery ===

#[derive(Debug, Serialize)]
pub struct RecoverResponse {
    pub template: String,
    pub message: String,
}
