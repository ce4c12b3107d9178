//! Rating proxy for the DoctoNote extension.
//!
//! Serves `GET /api/doctor-rating?doctorName=&address=`: one Places text
//! search for `doctor <name> <address>`, answered with the first result's
//! rating. Keeps the Places API key on the server side.
//!
//! | Status | Body |
//! |--------|------|
//! | 200 | `{ "rating": "4.3", "reviewsCount": 27 }` or `{ "rating": "N/A", "reviewsCount": 0 }` |
//! | 400 | `{ "error": "Missing required parameters" }` |
//! | 500 | `{ "error": "Server configuration error" \| "Google Maps API error" \| "Internal server error" }` |

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use doctonote_core::provider::RATING_ROUTE;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod error;
pub mod places;
mod routes;

pub use config::{ConfigError, ProxyConfig};
pub use error::ProxyError;
pub use places::PlacesClient;
pub use routes::{HealthResponse, RatingResponse};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ProxyConfig>,
    places: PlacesClient,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        let places = PlacesClient::new(config.places_url.clone()).map_err(|e| ConfigError {
            message: format!("failed to create HTTP client: {}", e),
        })?;
        Ok(Self {
            config: Arc::new(config),
            places,
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Build the proxy router. CORS allows any origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(RATING_ROUTE, get(routes::doctor_rating))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
