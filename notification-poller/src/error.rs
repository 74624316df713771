//! Error types for the session client and the polling worker.

use thiserror::Error;

/// Failures reported by the session client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad construction input (host, credentials, transport settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host answered "not found"
    #[error("Unable to establish connection to {0}, check the URL spelling")]
    HostUnreachable(String),

    /// The identity endpoint rejected the credentials
    #[error("Wrong username or password")]
    InvalidCredentials,

    /// Network or HTTP-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        ClientError::Config(message.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Reasons the polling loop stopped abnormally
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Notification fetch failed: {0}")]
    Fetch(#[from] ClientError),
}
