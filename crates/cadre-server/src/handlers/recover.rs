//! Recovery message handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use cadre::{recovery_message, Failure};

use crate::dto::RecoverResponse;
use crate::error::AppError;
use crate::ServerState;

/// Renders the corrective message for a conversational failure.
pub async fn recover(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<Failure>, JsonRejection>,
) -> Result<Json<RecoverResponse>, AppError> {
    let Json(failure) = body?;
    let message = recovery_message(&state.renderer, &failure)?;
    Ok(Json(RecoverResponse {
        template: failure.template_key().to_string(),
        message,
    }))
}
