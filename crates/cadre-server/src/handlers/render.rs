//! Template rendering handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::dto::{RenderRequest, RenderResponse};
use crate::error::AppError;
use crate::ServerState;

/// Renders one template with the supplied variables.
pub async fn render(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>, AppError> {
    let Json(req) = body?;
    let text = state.renderer.render_str(&req.template, &req.variables)?;
    info!("Rendered {} ({} chars)", req.template, text.len());
    Ok(Json(RenderResponse {
        template: req.template,
        text,
    }))
}
