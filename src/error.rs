//! Error types for backend communication.

use thiserror::Error;

/// Failure of a request to the dtf backend.
///
/// Every variant is terminal for the operation that issued the request:
/// controllers report it through the toast notifier and return it, nothing
/// is retried.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with status {code}: {body}")]
    Status { url: String, code: u16, body: String },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("response from {url} is missing `{field}`")]
    MissingField { url: String, field: String },
}

impl ClientError {
    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::MissingField { url, .. } => url,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
