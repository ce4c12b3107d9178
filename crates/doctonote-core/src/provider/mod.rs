//! Rating providers.
//!
//! A provider turns an [`Identity`] into a [`RatingResult`] or a typed
//! [`ResolutionError`]. It never builds the fallback itself; that happens at the
//! pipeline boundary so the failure reason stays observable.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::debug;

use crate::config::RatingConfig;
use crate::error::{ResolutionError, ResolutionResult};
use crate::types::{Identity, RatingResult};

mod helpers;
mod http;

pub use helpers::{ensure_link_out, rating_url};
use http::HttpBackend;

/// User-Agent sent with every backend request.
pub const PROVIDER_USER_AGENT: &str = concat!("doctonote/", env!("CARGO_PKG_VERSION"));

/// Route of the rating backend.
pub const RATING_ROUTE: &str = "/api/doctor-rating";

/// Source of ratings for identities.
#[async_trait]
pub trait RatingProvider: Send + Sync {
    /// Resolve one identity. Called at most once per cache miss.
    async fn fetch(&self, identity: &Identity) -> ResolutionResult<RatingResult>;
}

/// Provider backed by the rating proxy over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRatingProvider {
    http: HttpBackend,
}

impl HttpRatingProvider {
    pub fn new(config: &RatingConfig) -> ResolutionResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(PROVIDER_USER_AGENT));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| ResolutionError::Config {
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            http: HttpBackend {
                client,
                base_url: config.backend_url.trim_end_matches('/').to_string(),
            },
        })
    }
}

#[async_trait]
impl RatingProvider for HttpRatingProvider {
    async fn fetch(&self, identity: &Identity) -> ResolutionResult<RatingResult> {
        let url = rating_url(&self.http.base_url, identity);
        debug!(url = %url, name = %identity.name, "fetching rating");

        let body = self.http.get_text(&url).await?;
        let result: RatingResult =
            serde_json::from_str(&body).map_err(|e| ResolutionError::MalformedResponse {
                message: format!("failed to parse rating response: {}", e),
            })?;

        Ok(ensure_link_out(result, identity))
    }
}
