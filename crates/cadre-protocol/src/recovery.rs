use cadre_core::{Failure, TemplateError};
use cadre_prompt::{Renderer, Variables};
use tracing::debug;

/// Renders the message that steers the LLM back after `failure`.
///
/// Every failure maps to exactly one template under `errors`; see
/// [`Failure::template_key`] and [`Failure::variables`].
pub fn recovery_message(renderer: &Renderer, failure: &Failure) -> Result<String, TemplateError> {
    let key = failure.template_key();
    let vars: Variables = failure.variables().into_iter().collect();
    debug!(template = %key, "selecting recovery message");
    renderer.render(&key, &vars)
}
