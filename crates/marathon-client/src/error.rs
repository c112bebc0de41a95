//! Error types for the Marathon client.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the Marathon API.
///
/// `NotFound` is split out from `Api` because the rollout flow uses it
/// to choose between creating and updating an application.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("application not found: {app_id}")]
    NotFound { app_id: String },

    #[error("marathon returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),
}
