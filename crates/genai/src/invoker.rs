use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::FlowError;
use crate::schema::Schema;

/// One call to the generative service.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub flow: &'a str,
    pub prompt: &'a str,
    pub output: &'a Schema,
}

/// The external text-generation service.
///
/// `Ok(None)` means the service answered but produced nothing usable.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<Option<String>>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<Option<String>> {
        (**self).generate(request).await
    }
}

/// Make exactly one generation attempt and hold the reply to the output
/// schema.
pub async fn invoke<G>(
    generator: &G,
    request: GenerationRequest<'_>,
) -> Result<Map<String, Value>, FlowError>
where
    G: TextGenerator + ?Sized,
{
    let started = Instant::now();
    let reply = generator.generate(request).await.map_err(|err| {
        warn!(flow = request.flow, error = %err, "generative call failed");
        FlowError::Generation(format!("{err:#}"))
    })?;

    debug!(
        flow = request.flow,
        elapsed_ms = started.elapsed().as_millis() as u64,
        reply_chars = reply.as_deref().map(|r| r.chars().count()).unwrap_or(0),
        "generative call returned"
    );

    let reply = match reply {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            return Err(FlowError::Generation(
                "service returned no output".to_string(),
            ))
        }
    };

    let payload: Value = serde_json::from_str(strip_code_fence(&reply)).map_err(|err| {
        FlowError::mismatch(request.output.name, format!("reply is not valid JSON: {err}"))
    })?;

    request.output.validate_output(&payload)
}

/// Models sometimes wrap JSON in a Markdown fence even when asked not to.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body).trim();
    if body.starts_with(['{', '[']) {
        return body;
    }
    // Drop an info string such as `json`, on its own line or not.
    match body.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.trim(),
        None => body,
    }
}
