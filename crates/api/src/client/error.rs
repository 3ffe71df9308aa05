//! Client error types

use crate::session::StoreError;
use thiserror::Error;

/// Errors surfaced by [`ApiClient`](super::ApiClient) to its callers
#[derive(Debug, Error)]
pub enum ClientError {
    /// A 2xx reply arrived without a JSON body
    #[error("Empty response from server")]
    EmptyResponse,

    /// Authorization failed and the session could not be renewed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session refresh call itself failed; the refresh error is the source
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] Box<ClientError>),

    /// The backend rejected the request with an `{error}` message
    #[error("{message}")]
    BackendMessage { status: u16, message: String },

    /// Network failure, or an error status without a readable message
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session storage could not be read or written
    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether this error ended the session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::RefreshFailed(_))
    }

    /// HTTP status attached to the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BackendMessage { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }
}
