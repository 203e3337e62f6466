//! HTTP route handlers for the template server.

pub mod parse;
pub mod recover;
pub mod render;
pub mod templates;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use cadre::TemplateStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app, ServerState};

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState::new(TemplateStore::default_en()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app(state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_list_templates() {
        let (status, body) = send(Request::get("/templates").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let templates = body["templates"].as_array().unwrap();
        let role_playing = templates
            .iter()
            .find(|t| t["key"] == "slices.role_playing")
            .unwrap();
        assert_eq!(role_playing["placeholders"], json!(["role", "backstory", "goal"]));
    }

    #[tokio::test]
    async fn test_render() {
        let (status, body) = send(post(
            "/render",
            json!({
                "template": "slices.role_playing",
                "variables": {"role": "Local Expert", "backstory": "...", "goal": "Provide insights"}
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["text"],
            "You are Local Expert.\n...\n\nYour personal goal is: Provide insights"
        );
    }

    #[tokio::test]
    async fn test_render_unknown_template_is_404() {
        let (status, body) = send(post("/render", json!({"template": "slices.nope"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown template: 'slices.nope'");
    }

    #[tokio::test]
    async fn test_render_missing_placeholder_is_422() {
        let (status, body) = send(post(
            "/render",
            json!({"template": "errors.wrong_tool_name", "variables": {"tool": "fly"}}),
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("'{tools}'"));
    }

    #[tokio::test]
    async fn test_render_bad_body_is_400() {
        let (status, _) = send(post("/render", json!({"variables": {}}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse() {
        let (status, body) = send(post("/parse", json!({"text": "Final Answer: Paris is the capital."}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"type": "final_answer", "content": "Paris is the capital."}));

        let (_, body) = send(post("/parse", json!({"text": "Use Tool: search, rust\nResult:"}))).await;
        assert_eq!(body["type"], "tool_invocation");
        assert_eq!(body["tool_name"], "search");
        assert_eq!(body["tool_input"], "rust");
    }

    #[tokio::test]
    async fn test_recover() {
        let (status, body) = send(post(
            "/recover",
            json!({"kind": "unknown_tool", "tool": "fly", "tools": "search"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "errors.wrong_tool_name");
        assert!(body["message"].as_str().unwrap().starts_with("You tried to use the tool fly"));
    }

    #[tokio::test]
    async fn test_recover_bad_kind_is_400() {
        let (status, _) = send(post("/recover", json!({"kind": "cosmic_ray"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
