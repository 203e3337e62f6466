//! Template listing handler.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{TemplateInfo, TemplatesResponse};
use crate::ServerState;

/// Lists every loaded template with its placeholders.
pub async fn list(State(state): State<Arc<ServerState>>) -> Json<TemplatesResponse> {
    let store = state.renderer.store();
    let templates = store
        .keys()
        .into_iter()
        .filter_map(|key| {
            let template = store.get(&key).ok()?;
            Some(TemplateInfo {
                key: key.to_string(),
                placeholders: template.placeholders().to_vec(),
            })
        })
        .collect();
    Json(TemplatesResponse { templates })
}
