//! Client configuration error types.

use thiserror::Error;

/// Result type for client configuration operations.
pub type Result<T> = std::result::Result<T, ReqError>;

/// Client configuration errors.
#[derive(Debug, Error)]
pub enum ReqError {
    /// The active client's transport is not a [`PooledTransport`](crate::PooledTransport),
    /// so TLS and proxy settings cannot be applied to it.
    #[error("Transport does not support TLS or proxy settings")]
    TransportUnavailable,

    /// The proxy URL could not be parsed.
    #[error("Invalid proxy URL {url:?}: {source}")]
    InvalidProxyUrl {
        /// The rejected input.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// An environment override could not be parsed.
    #[error("Invalid configuration value for {key}: {value:?}")]
    InvalidConfig {
        /// Environment variable name.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// The underlying reqwest client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReqError {
    /// Check if this error reports an incompatible transport.
    pub fn is_transport_unavailable(&self) -> bool {
        matches!(self, Self::TransportUnavailable)
    }

    /// Check if this error reports a malformed proxy URL.
    pub fn is_invalid_proxy_url(&self) -> bool {
        matches!(self, Self::InvalidProxyUrl { .. })
    }
}
