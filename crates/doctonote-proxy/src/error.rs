//! Proxy errors and their HTTP mapping.
//!
//! Every error is answered as `{ "error": "<public message>" }`. Details stay in
//! the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// `doctorName` or `address` missing or empty.
    #[error("missing required parameters")]
    ParameterMissing,

    /// No Places API key configured.
    #[error("places API key is not set")]
    MissingApiKey,

    /// The Places API answered with an `error_message`.
    #[error("places API error: {message}")]
    PlacesApi { message: String },

    /// Transport failure, non-success status or unreadable payload.
    #[error("upstream failure: {message}")]
    Upstream { message: String },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ParameterMissing => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::ParameterMissing => "Missing required parameters",
            Self::MissingApiKey => "Server configuration error",
            Self::PlacesApi { .. } => "Google Maps API error",
            Self::Upstream { .. } => "Internal server error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            Self::ParameterMissing => warn!("rating request without required parameters"),
            other => error!(error = %other, "rating request failed"),
        }

        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
