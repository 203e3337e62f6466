//! Response classification handler.

use axum::{extract::rejection::JsonRejection, Json};
use cadre::ParsedResponse;
use tracing::info;

use crate::dto::ParseRequest;
use crate::error::AppError;

/// Classifies raw LLM output.
pub async fn parse(
    body: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParsedResponse>, AppError> {
    let Json(req) = body?;
    let parsed = cadre::parse(&req.text);
    info!("Parsed {} chars as {}", req.text.len(), parsed.label());
    Ok(Json(parsed))
}
