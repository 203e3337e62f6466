//! Placeholder substitution.

use std::collections::BTreeMap;
use std::sync::Arc;

use cadre_config::{Segment, Template, TemplateStore};
use cadre_core::{TemplateError, TemplateKey};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Placeholder name -> value mapping supplied at render time.
///
/// ```rust
/// use cadre_prompt::Variables;
///
/// let vars = Variables::new()
///     .with("role", "Local Expert")
///     .with("goal", "Provide insights");
/// assert_eq!(vars.get("role"), Some("Local Expert"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Renders one parsed template.
///
/// `label` names the template in errors. Values are inserted verbatim; extra
/// variables are ignored. Fails on the first placeholder, in template order,
/// that has no value.
pub fn render_template(
    template: &Template,
    label: &str,
    vars: &Variables,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.source().len());
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let value = vars.get(name).ok_or_else(|| TemplateError::MissingPlaceholder {
                    template: label.to_string(),
                    placeholder: name.clone(),
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

/// Renders templates from a shared [`TemplateStore`].
///
/// Stateless apart from the store handle: rendering the same key with the same
/// variables always yields the same string.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cadre_config::TemplateStore;
/// use cadre_core::TemplateKey;
/// use cadre_prompt::{Renderer, Variables};
///
/// let renderer = Renderer::new(Arc::new(TemplateStore::default_en()));
/// let vars = Variables::new()
///     .with("role", "Local Expert")
///     .with("backstory", "...")
///     .with("goal", "Provide insights");
/// let prompt = renderer.render(&TemplateKey::slice("role_playing"), &vars).unwrap();
/// assert_eq!(prompt, "You are Local Expert.\n...\n\nYour personal goal is: Provide insights");
/// ```
#[derive(Debug, Clone)]
pub struct Renderer {
    store: Arc<TemplateStore>,
}

impl Renderer {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }

    /// The store this renderer reads from.
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Renders the template at `key` with `vars`.
    pub fn render(&self, key: &TemplateKey, vars: &Variables) -> Result<String, TemplateError> {
        let template = self.store.get(key)?;
        debug!(template = %key, "rendering");
        render_template(template, &key.to_string(), vars)
    }

    /// Renders a template addressed as `category.name`.
    pub fn render_str(&self, key: &str, vars: &Variables) -> Result<String, TemplateError> {
        self.render(&key.parse()?, vars)
    }

    /// Checks that `vars` covers every placeholder of `key` without rendering.
    pub fn check(&self, key: &TemplateKey, vars: &Variables) -> Result<(), TemplateError> {
        let template = self.store.get(key)?;
        match template.placeholders().iter().find(|p| !vars.contains(p)) {
            Some(missing) => Err(TemplateError::MissingPlaceholder {
                template: key.to_string(),
                placeholder: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Renders a prompt slice.
    pub fn slice(&self, name: &str, vars: &Variables) -> Result<String, TemplateError> {
        self.render(&TemplateKey::slice(name), vars)
    }

    /// Renders a recovery message.
    pub fn error(&self, name: &str, vars: &Variables) -> Result<String, TemplateError> {
        self.render(&TemplateKey::error(name), vars)
    }

    /// Renders a built-in tool description.
    pub fn tool(&self, name: &str, vars: &Variables) -> Result<String, TemplateError> {
        self.render(&TemplateKey::tool(name), vars)
    }
}
