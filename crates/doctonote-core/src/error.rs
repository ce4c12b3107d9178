//! Error types for rating resolution.
//!
//! None of these escape [`RatingPipeline::resolve`](crate::RatingPipeline::resolve):
//! provider errors become the fallback result and store errors become cache
//! misses. They stay typed so callers and tests can see why a result degraded.

/// Errors raised while fetching a rating from the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Network failure or non-success status from the rating backend.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// The backend answered but the payload is not a rating.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Client could not be built from the configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ResolutionError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,
            Self::UpstreamUnavailable { .. } => 5,
            Self::MalformedResponse { .. } => 6,
        }
    }

    /// Short machine-readable label, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Config { .. } => "config",
        }
    }
}

/// Result type for provider operations.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while loading [`RatingConfig`](crate::RatingConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}
