use crate::io_struct::ChatMessage;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on generated output, tokens.
pub const MAX_COMPLETION_TOKENS: u32 = 400;
/// Fixed sampling temperature for every upstream call.
pub const SAMPLING_TEMPERATURE: f32 = 0.7;

/// Closed set of upstream failures. The handler maps these to HTTP statuses
/// without ever inspecting provider-specific error shapes itself.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream rejected the configured credential")]
    AuthRejected,
    #[error("upstream rate limit hit")]
    RateLimited,
    #[error("upstream quota exhausted")]
    QuotaExhausted,
    #[error("upstream request failed: {0}")]
    Other(String),
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

/// Perform a single chat completion call. No retries; any failure is
/// classified and surfaced to the caller immediately.
///
/// Returns the primary generated text, which may be empty when the provider
/// produced nothing.
pub async fn complete(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
) -> Result<String, UpstreamError> {
    let request = CompletionRequest {
        model,
        messages,
        max_tokens: MAX_COMPLETION_TOKENS,
        temperature: SAMPLING_TEMPERATURE,
    };
    let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
    let resp = client
        .post(url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| UpstreamError::Other(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| UpstreamError::Other(e.to_string()))?;
    if !status.is_success() {
        return Err(classify_error(status, &body));
    }

    let completion: CompletionResponse = serde_json::from_slice(&body)
        .map_err(|e| UpstreamError::Other(format!("malformed completion body: {}", e)))?;
    Ok(completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}

/// Map a non-success upstream response to an `UpstreamError` variant.
///
/// `insufficient_quota` is checked before the plain 429 case: the provider
/// reports quota exhaustion with a 429 status, and it must map to 503 rather
/// than the retryable 429.
fn classify_error(status: StatusCode, body: &[u8]) -> UpstreamError {
    let detail: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let code = detail
        .as_ref()
        .and_then(|body| body.error.code.as_deref())
        .unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return UpstreamError::AuthRejected;
    }
    if code == "insufficient_quota" {
        return UpstreamError::QuotaExhausted;
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return UpstreamError::RateLimited;
    }
    let message = detail
        .and_then(|body| body.error.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
    UpstreamError::Other(format!("upstream returned {}: {}", status, message))
}
