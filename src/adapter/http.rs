//! Shared HTTP client and SSE helpers.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::AgentError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// No overall request timeout: streamed generations legitimately run for
/// minutes. Stalls are caught by the orchestrator's idle timeout instead.
pub(crate) fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .expect("failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub(crate) fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub(crate) fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map a non-200 HTTP status to an error.
pub(crate) fn status_to_error(status: u16, body: &str) -> AgentError {
    match status {
        429 => AgentError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => AgentError::Api {
            status,
            message: body.to_string(),
        },
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
