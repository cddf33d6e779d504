//! Error types for the segmentation client.

use thiserror::Error;

pub type MlClientResult<T> = Result<T, MlClientError>;

#[derive(Debug, Error)]
pub enum MlClientError {
    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Segmentation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid mask for instance {index}: {message}")]
    InvalidMask { index: usize, message: String },
}

impl MlClientError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn invalid_mask(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidMask {
            index,
            message: message.into(),
        }
    }

    /// True when the service could not be reached or answered with a
    /// server-side failure.
    pub fn is_unavailable(&self) -> bool {
        match self {
            MlClientError::Http(e) => e.is_connect() || e.is_timeout(),
            MlClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
