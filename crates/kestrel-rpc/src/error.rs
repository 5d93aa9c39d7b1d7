//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error calling {endpoint} at {url}: {source}")]
    Http {
        endpoint: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{endpoint} returned an undecodable body: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("no result in response ({context})")]
    NoResult { context: String },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },

    #[error("authentication failed for {url}")]
    AuthFailed { url: String },

    #[error("{0}")]
    Other(String),
}

impl RpcError {
    /// Convert a transport error, keeping timeouts and refused connections apart.
    pub(crate) fn from_reqwest(endpoint: &str, url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout { endpoint: endpoint.to_string() }
        } else if err.is_decode() {
            RpcError::Decode { endpoint: endpoint.to_string(), reason: err.to_string() }
        } else if err.is_connect() {
            RpcError::Connection { url: url.to_string(), reason: err.to_string() }
        } else {
            RpcError::Http { endpoint: endpoint.to_string(), url: url.to_string(), source: err }
        }
    }

    /// Whether the failure happened before the daemon produced an answer.
    pub fn is_transient(&self) -> bool {
        match self {
            RpcError::Timeout { .. } | RpcError::Connection { .. } | RpcError::Http { .. } => true,
            RpcError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcError::Timeout { .. })
    }
}
