//! The template store: category -> name -> template.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cadre_core::{TemplateError, TemplateKey};
use serde::Serialize;
use tracing::{debug, info};

use crate::{ConfigError, Settings, Template};

/// English templates shipped with the crate.
const BUNDLED_EN: &str = include_str!("../prompts/en.json");

/// Templates the rest of the workspace renders, with the placeholders each may
/// reference.
///
/// [`TemplateStore::validate`] checks a store against this table at startup so
/// a replacement template file cannot break rendering halfway through a run.
pub const REQUIRED_TEMPLATES: &[(&str, &[&str])] = &[
    ("slices.role_playing", &["role", "backstory", "goal"]),
    ("slices.tools", &["tools", "tool_names"]),
    ("slices.no_tools", &[]),
    ("slices.task", &["input"]),
    ("slices.memory", &["chat_history"]),
    ("slices.format", &["tool_names"]),
    ("slices.final_answer_format", &[]),
    ("slices.format_without_tools", &[]),
    ("slices.task_with_context", &["task", "context"]),
    ("slices.expected_output", &["expected_output"]),
    ("errors.unexpected_format", &[]),
    ("errors.force_final_answer", &[]),
    ("errors.unknown_coworker", &["coworkers"]),
    ("errors.task_repeated_usage", &["tool", "tool_input"]),
    ("errors.wrong_tool_name", &["tool", "tools"]),
    ("errors.tool_usage_exception", &["tool", "error"]),
    ("errors.tool_arguments_error", &[]),
    ("tools.delegate_work", &["coworkers"]),
    ("tools.ask_question", &["coworkers"]),
    ("hierarchical_manager_agent.role", &[]),
    ("hierarchical_manager_agent.goal", &[]),
    ("hierarchical_manager_agent.backstory", &[]),
];

/// Immutable set of templates, grouped by category.
///
/// Loaded once at startup and passed explicitly (usually behind an `Arc`) to
/// whatever renders prompts. Tests build substitute stores with
/// [`TemplateStore::with`].
///
/// # Example
///
/// ```rust
/// use cadre_config::TemplateStore;
/// use cadre_core::TemplateKey;
///
/// let store = TemplateStore::default_en();
/// let template = store.get(&TemplateKey::slice("role_playing")).unwrap();
/// assert_eq!(template.placeholders(), ["role", "backstory", "goal"]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TemplateStore {
    categories: BTreeMap<String, BTreeMap<String, Template>>,
}

impl TemplateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bundled English template set.
    ///
    /// Cannot fail at runtime: the file is compiled in, and
    /// `test_default_en_is_the_full_bundled_set` checks that it parses and
    /// validates. Use [`TemplateStore::load`] for files read at startup.
    pub fn default_en() -> Self {
        Self::from_json(BUNDLED_EN).unwrap_or_default()
    }

    /// Loads the store described by `settings` and validates it.
    ///
    /// Uses `settings.prompt_file` when set, the bundled English set otherwise.
    pub fn load(settings: &Settings) -> Result<Self, ConfigError> {
        let store = match &settings.prompt_file {
            Some(path) => Self::from_file(path)?,
            None => Self::from_json(BUNDLED_EN)?,
        };
        store.validate()?;
        info!("Loaded {} templates", store.len());
        Ok(store)
    }

    /// Loads templates from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading templates from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse(source) => ConfigError::ParseFile {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parses templates from a JSON object of objects of strings.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(json)?;
        let categories = raw
            .into_iter()
            .map(|(category, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|(name, source)| (name, Template::parse(source)))
                    .collect();
                (category, entries)
            })
            .collect();
        Ok(Self { categories })
    }

    /// Adds or replaces a template. Intended for building substitute stores.
    pub fn with(mut self, key: TemplateKey, source: impl Into<String>) -> Self {
        self.categories
            .entry(key.category)
            .or_default()
            .insert(key.name, Template::parse(source));
        self
    }

    /// Checks the store against [`REQUIRED_TEMPLATES`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, allowed) in REQUIRED_TEMPLATES {
            let parsed: TemplateKey = key.parse()?;
            let template = self
                .get(&parsed)
                .map_err(|_| ConfigError::MissingTemplate(key.to_string()))?;

            if let Some(unknown) = template
                .placeholders()
                .iter()
                .find(|p| !allowed.contains(&p.as_str()))
            {
                return Err(ConfigError::validation(
                    *key,
                    format!("unexpected placeholder '{{{}}}'", unknown),
                ));
            }
        }
        Ok(())
    }

    /// Looks up a template by key.
    pub fn get(&self, key: &TemplateKey) -> Result<&Template, TemplateError> {
        self.categories
            .get(&key.category)
            .and_then(|entries| entries.get(&key.name))
            .ok_or_else(|| TemplateError::UnknownTemplate(key.to_string()))
    }

    /// Returns `true` if a template is registered under `key`.
    pub fn contains(&self, key: &TemplateKey) -> bool {
        self.get(key).is_ok()
    }

    /// Returns all templates of one category.
    pub fn category(&self, name: &str) -> Option<&BTreeMap<String, Template>> {
        self.categories.get(name)
    }

    /// Category names, sorted.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Returns every key, sorted by category then name.
    pub fn keys(&self) -> Vec<TemplateKey> {
        self.categories
            .iter()
            .flat_map(|(category, entries)| {
                entries.keys().map(move |name| TemplateKey::new(category, name))
            })
            .collect()
    }

    /// Number of templates across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bundled_templates_validate() {
        let store = TemplateStore::from_json(BUNDLED_EN).unwrap();
        store.validate().unwrap();
        assert_eq!(store.len(), REQUIRED_TEMPLATES.len());
    }

    #[test]
    fn test_default_en_is_the_full_bundled_set() {
        let store = TemplateStore::default_en();
        store.validate().unwrap();
        assert_eq!(store.len(), REQUIRED_TEMPLATES.len());
    }

    #[test]
    fn test_default_en_is_not_empty() {
        let store = TemplateStore::default_en();
        assert!(!store.is_empty());
        assert!(store.contains(&TemplateKey::error("unexpected_format")));
    }

    #[test]
    fn test_get_unknown_template() {
        let store = TemplateStore::default_en();
        let err = store.get(&TemplateKey::slice("nope")).unwrap_err();
        assert_eq!(err, TemplateError::UnknownTemplate("slices.nope".to_string()));

        let err = store.get(&TemplateKey::new("missing", "role")).unwrap_err();
        assert_eq!(err, TemplateError::UnknownTemplate("missing.role".to_string()));
    }

    #[test]
    fn test_keys_are_sorted() {
        let store = TemplateStore::new()
            .with(TemplateKey::slice("b"), "x")
            .with(TemplateKey::error("z"), "y")
            .with(TemplateKey::slice("a"), "z");
        let keys: Vec<String> = store.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["errors.z", "slices.a", "slices.b"]);
    }

    #[test]
    fn test_validate_reports_missing_template() {
        let store = TemplateStore::new().with(TemplateKey::slice("role_playing"), "You are {role}.");
        match store.validate() {
            Err(ConfigError::MissingTemplate(key)) => assert_eq!(key, "slices.tools"),
            other => panic!("expected MissingTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_unexpected_placeholder() {
        let store = TemplateStore::default_en()
            .with(TemplateKey::error("unexpected_format"), "Bad format, {name}");
        match store.validate() {
            Err(ConfigError::Validation { key, message }) => {
                assert_eq!(key, "errors.unexpected_format");
                assert!(message.contains("{name}"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_non_string_values() {
        let result = TemplateStore::from_json(r#"{"slices": {"task": 42}}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("prompts.json");
        fs::write(&file_path, r#"{"slices": {"task": "Current Task: {input}"}}"#).unwrap();

        let store = TemplateStore::from_file(&file_path).unwrap();
        let template = store.get(&TemplateKey::slice("task")).unwrap();
        assert_eq!(template.placeholders(), ["input"]);

        temp_dir.close().unwrap();
    }

    #[test]
    fn test_from_file_parse_error_names_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("broken.json");
        fs::write(&file_path, "{ not json").unwrap();

        match TemplateStore::from_file(&file_path) {
            Err(ConfigError::ParseFile { path, .. }) => assert!(path.ends_with("broken.json")),
            other => panic!("expected ParseFile error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = TemplateStore::from_file(PathBuf::from("non_existent_prompts.json"));
        match result {
            Err(ConfigError::Io { path, .. }) => assert_eq!(path, "non_existent_prompts.json"),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_uses_prompt_file_and_validates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("partial.json");
        fs::write(&file_path, r#"{"slices": {"task": "{input}"}}"#).unwrap();

        let settings = Settings {
            prompt_file: Some(file_path),
            ..Settings::default()
        };
        assert!(matches!(
            TemplateStore::load(&settings),
            Err(ConfigError::MissingTemplate(_))
        ));

        let store = TemplateStore::load(&Settings::default()).unwrap();
        assert_eq!(store.len(), REQUIRED_TEMPLATES.len());
    }

    #[test]
    fn test_serializes_as_nested_strings() {
        let store = TemplateStore::new().with(TemplateKey::slice("task"), "Task: {input}");
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json, serde_json::json!({"slices": {"task": "Task: {input}"}}));
    }
}
