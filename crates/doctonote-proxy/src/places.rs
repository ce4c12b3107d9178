//! Places text search client.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProxyError;

/// Subset of a text search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub results: Vec<Place>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub user_ratings_total: Option<u64>,

    #[serde(default)]
    pub place_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// Search query for a doctor: `doctor <name> <address>`.
pub fn doctor_query(name: &str, address: &str) -> String {
    format!("doctor {} {}", name, address)
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: reqwest::Client,
    search_url: String,
}

impl PlacesClient {
    pub fn new(search_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("doctonote-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            search_url: search_url.into(),
        })
    }

    /// Run one text search. `error_message` in the payload is a Places API error.
    pub async fn text_search(
        &self,
        query: &str,
        api_key: &str,
    ) -> Result<TextSearchResponse, ProxyError> {
        let url = format!(
            "{}?query={}&key={}",
            self.search_url,
            urlencoding::encode(query),
            urlencoding::encode(api_key)
        );
        debug!(query = %query, "places text search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream {
                message: format!("places request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Upstream {
                message: format!("places API returned HTTP {}", status.as_u16()),
            });
        }

        let body: TextSearchResponse = response.json().await.map_err(|e| ProxyError::Upstream {
            message: format!("invalid places response: {}", e.without_url()),
        })?;

        if let Some(message) = &body.error_message {
            return Err(ProxyError::PlacesApi {
                message: format!(
                    "{} ({})",
                    message,
                    body.status.as_deref().unwrap_or("unknown status")
                ),
            });
        }

        Ok(body)
    }
}
