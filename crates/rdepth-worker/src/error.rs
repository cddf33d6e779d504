//! Worker error types.

use rdepth_media::MaskError;
use rdepth_ml_client::MlClientError;
use rdepth_models::{CameraId, TopologyError};
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Invalid filter options. Raised before any sample is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unknown camera channel in camera_channels: '{0}'")]
    UnknownCamera(String),

    #[error("camera_channels must name at least one camera")]
    NoCameraChannels,

    #[error("Invalid pass_filters: {0}")]
    InvalidFilterTag(String),

    #[error("Invalid speed_bound {values:?}: {reason}")]
    InvalidBound { values: Vec<f64>, reason: String },

    #[error("Invalid {field}: {value} (expected {expected})")]
    InvalidRatio {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Invalid mask configuration: {0}")]
    InvalidMaskConfig(String),

    #[error("Unknown nuscenes_version: '{0}'")]
    UnknownDatasetVersion(String),

    #[error("Sensor topology error: {0}")]
    Topology(#[from] TopologyError),
}

impl ConfigError {
    pub fn invalid_bound(values: &[f64], reason: impl Into<String>) -> Self {
        Self::InvalidBound {
            values: values.to_vec(),
            reason: reason.into(),
        }
    }

    pub fn invalid_mask_config(msg: impl Into<String>) -> Self {
        Self::InvalidMaskConfig(msg.into())
    }
}

/// Errors evaluating a sample that are not rejections.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Scene {scene} has no day/night tag")]
    MissingTimeOfDay { scene: String },

    #[error("Sensor topology error: {0}")]
    Topology(#[from] TopologyError),
}

/// Failure resolving one sample.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Mask inference failed for scene {scene}, sample {sample}, camera {camera}: {source}")]
    MaskInference {
        scene: String,
        sample: String,
        camera: CameraId,
        #[source]
        source: MaskError,
    },
}

impl SampleError {
    pub fn mask_inference(
        scene: impl Into<String>,
        sample: impl Into<String>,
        camera: CameraId,
        source: MaskError,
    ) -> Self {
        Self::MaskInference {
            scene: scene.into(),
            sample: sample.into(),
            camera,
            source,
        }
    }

    /// Check if the caller may skip this sample and continue.
    ///
    /// Topology and mask configuration problems affect every sample and are
    /// fatal; per-image inference failures and untagged scenes are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SampleError::Resolve(ResolveError::MissingTimeOfDay { .. }) => true,
            SampleError::Resolve(ResolveError::Topology(_)) => false,
            SampleError::MaskInference { source, .. } => !source.is_config_error(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid filter options: {0}")]
    Options(#[from] ConfigError),

    #[error("Sample failed: {0}")]
    Sample(#[from] SampleError),

    #[error("Mask error: {0}")]
    Mask(#[from] MaskError),

    #[error("Segmentation client error: {0}")]
    MlClient(#[from] MlClientError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if the run can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WorkerError::Sample(e) if e.is_recoverable())
    }
}
