//! Proxy configuration from the environment.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `PORT` | Listen port (default: 3000) |
//! | `GOOGLE_MAPS_API_KEY` | Places API key; requests fail with 500 when unset |
//! | `PLACES_API_URL` | Text search endpoint (default: Google Places text search) |

/// Google Places text search endpoint.
pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
#[error("invalid proxy configuration: {message}")]
pub struct ConfigError {
    pub message: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub port: u16,
    pub api_key: Option<String>,
    pub places_url: String,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("places_url", &self.places_url)
            .finish()
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            places_url: DEFAULT_PLACES_URL.to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError {
                message: format!("PORT must be a port number, got {:?}", raw),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let places_url = std::env::var("PLACES_API_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_PLACES_URL.to_string());

        Ok(Self {
            port,
            api_key,
            places_url,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_places_url(mut self, url: impl Into<String>) -> Self {
        self.places_url = url.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_key, None);
        assert_eq!(config.places_url, DEFAULT_PLACES_URL);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProxyConfig::default().with_api_key("secret-key");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
