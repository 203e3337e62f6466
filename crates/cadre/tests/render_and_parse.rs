use std::io::Write;
use std::sync::Arc;

use cadre::prelude::*;
use cadre::{ConfigError, ToolListing};
use tempfile::NamedTempFile;

fn renderer() -> Renderer {
    Renderer::new(Arc::new(TemplateStore::default_en()))
}

#[test]
fn test_tools_slice_round_trips_through_parser() {
    let renderer = renderer();
    for name in ["search", "Delegate work to co-worker", "calculator"] {
        let vars = Variables::new()
            .with("tools", format!("Tool Name: {name}\nTool Description: d\nTool Arguments: a"))
            .with("tool_names", name);
        let prompt = renderer.render(&TemplateKey::slice("tools"), &vars).unwrap();
        assert!(prompt.contains(&format!("should be one of [{name}]")));

        let reply = format!("Use Tool: {name}, Result: ...");
        assert_eq!(
            parse(&reply),
            ParsedResponse::ToolInvocation(ToolInvocation::new(name, ""))
        );
    }
}

#[test]
fn test_role_playing_example() {
    let vars = Variables::new()
        .with("role", "Local Expert")
        .with("backstory", "...")
        .with("goal", "Provide insights");
    let prompt = renderer().render_str("slices.role_playing", &vars).unwrap();
    assert_eq!(prompt, "You are Local Expert.\n...\n\nYour personal goal is: Provide insights");
}

#[test]
fn test_final_answer_example() {
    assert_eq!(
        parse("Final Answer: Paris is the capital."),
        ParsedResponse::FinalAnswer { content: "Paris is the capital.".to_string() }
    );
}

#[test]
fn test_unmarked_text_recovers_with_unexpected_format() {
    let renderer = renderer();
    let raw = "Paris, obviously.";
    let parsed = parse(raw);
    let ParsedResponse::Malformed { raw_text } = parsed else {
        panic!("expected malformed, got {parsed:?}");
    };

    let message = recovery_message(&renderer, &Failure::MalformedResponse { raw_text }).unwrap();
    let template = renderer
        .store()
        .get(&TemplateKey::error("unexpected_format"))
        .unwrap();
    assert_eq!(message, template.source());
}

#[test]
fn test_missing_placeholder_names_the_token() {
    let vars = Variables::new().with("role", "Local Expert").with("goal", "g");
    let err = renderer().render(&TemplateKey::slice("role_playing"), &vars).unwrap_err();
    assert_eq!(
        err,
        TemplateError::MissingPlaceholder {
            template: "slices.role_playing".to_string(),
            placeholder: "backstory".to_string(),
        }
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let renderer = renderer();
    let persona = Persona::new("Writer", "Write well", "You write.");
    let tools = ToolListing {
        descriptions: "Tool Name: search".to_string(),
        names: "search".to_string(),
    };
    let render = || {
        ExecutionPrompt::new(&persona, "Draft the post")
            .tools(&tools)
            .render(&renderer)
            .unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn test_custom_template_file() {
    let mut store = serde_json::to_value(TemplateStore::default_en()).unwrap();
    store["slices"]["role_playing"] = "Ahoy, I be {role}. {backstory} Me goal: {goal}".into();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(store.to_string().as_bytes()).unwrap();

    let settings = Settings {
        prompt_file: Some(file.path().to_path_buf()),
        ..Settings::default()
    };
    let renderer = Renderer::new(Arc::new(TemplateStore::load(&settings).unwrap()));
    let vars = Variables::new().with("role", "Captain").with("backstory", "Arr.").with("goal", "gold");
    assert_eq!(
        renderer.slice("role_playing", &vars).unwrap(),
        "Ahoy, I be Captain. Arr. Me goal: gold"
    );
}

#[test]
fn test_custom_template_file_with_stray_placeholder_is_rejected() {
    let mut store = serde_json::to_value(TemplateStore::default_en()).unwrap();
    store["errors"]["unexpected_format"] = "Wrong format, {name}!".into();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(store.to_string().as_bytes()).unwrap();

    let settings = Settings {
        prompt_file: Some(file.path().to_path_buf()),
        ..Settings::default()
    };
    let err = TemplateStore::load(&settings).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}
