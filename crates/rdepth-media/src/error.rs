//! Error types for mask operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mask operations.
pub type MaskResult<T> = Result<T, MaskError>;

/// Errors that can occur while resolving object masks.
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Mask inference failed for {}: {message}", image.display())]
    Inference { image: PathBuf, message: String },

    #[error("Segmentation model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid mask configuration: {0}")]
    InvalidConfig(String),

    #[error("Mask cache error at {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MaskError {
    /// Create an inference failure for one image.
    pub fn inference(image: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Inference {
            image: image.into(),
            message: message.into(),
        }
    }

    /// Create a model-unavailable error.
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a cache read/write error.
    pub fn cache(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Cache {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if the error is a configuration problem rather than a
    /// per-image failure.
    pub fn is_config_error(&self) -> bool {
        matches!(self, MaskError::InvalidConfig(_))
    }
}
