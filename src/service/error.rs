//! Error type for the remote posting service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Credentials were refused (HTTP 401/403 on login).
    #[error("login rejected: {0}")]
    AuthRejected(String),

    /// Any other non-success response.
    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Transport failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reading the photo or writing the session cache failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl ServiceError {
    /// Whether repeating the same request later may succeed.
    ///
    /// Rate limits, server errors and transport failures are transient;
    /// rejected credentials, other 4xx responses and local IO are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::Network(_) => true,
            ServiceError::AuthRejected(_) | ServiceError::Io(_) | ServiceError::Protocol(_) => {
                false
            }
        }
    }
}
