//! HTTP layer: the only place that interprets status codes.

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{ResolutionError, ResolutionResult};

/// Holds the reqwest client and the normalized backend base URL.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
}

impl HttpBackend {
    /// GET `url` and return the body; any non-2xx status is an upstream failure.
    ///
    /// No retries: a failed lookup is served as the fallback and cached.
    pub(crate) async fn get_text(&self, url: &str) -> ResolutionResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "rating backend unreachable");
            ResolutionError::UpstreamUnavailable {
                message: format!("request failed: {}", e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "rating backend returned error status");
            return Err(ResolutionError::UpstreamUnavailable {
                message: status_message(status, &body),
            });
        }

        debug!(status = status.as_u16(), "rating backend responded");
        response
            .text()
            .await
            .map_err(|e| ResolutionError::UpstreamUnavailable {
                message: format!("failed to read response body: {}", e),
            })
    }
}

/// `HTTP 500: Internal server error`, using the proxy's `{ error }` body when present.
fn status_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(|v| v.as_str()).map(String::from))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body.chars().take(200).collect()
            }
        });

    format!("HTTP {}: {}", status.as_u16(), detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_uses_error_field() {
        let msg = status_message(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Missing required parameters"}"#,
        );
        assert_eq!(msg, "HTTP 400: Missing required parameters");
    }

    #[test]
    fn test_status_message_plain_body_and_empty() {
        assert_eq!(
            status_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "HTTP 502: upstream down"
        );
        assert_eq!(
            status_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "HTTP 503: Service Unavailable"
        );
    }
}
