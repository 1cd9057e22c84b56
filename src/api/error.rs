//! Errors raised while talking to the summarization API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, etc.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The body could not be decoded as the expected JSON envelope.
    #[error("Malformed response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    /// The server answered and refused the operation.
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Message to display for this error. Rejections carry the server's
    /// own text; everything else collapses to `network_message`.
    pub fn user_message(&self, network_message: &str) -> String {
        match self {
            ApiError::Rejected(msg) => msg.clone(),
            _ => network_message.to_string(),
        }
    }
}
