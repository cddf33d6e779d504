//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Filter options JSON; defaults apply when unset
    pub options_path: Option<PathBuf>,
    /// Scene descriptors JSON
    pub scenes_path: PathBuf,
    /// JSON-lines output; stdout when unset
    pub output_path: Option<PathBuf>,
    /// Base seed for subset selection and per-scene removal draws
    pub seed: u64,
    /// Maximum scenes resolved in parallel
    pub max_scene_parallel: usize,
    /// Maximum segmentation model calls in flight
    pub max_mask_parallel: usize,
    /// Segmentation service URL; required for the maskrcnn policy
    pub segmentation_url: Option<String>,
    /// Segmentation request timeout
    pub request_timeout: Duration,
}

impl WorkerConfig {
    /// Create config for a scenes file with default settings.
    pub fn new(scenes_path: impl Into<PathBuf>) -> Self {
        Self {
            options_path: None,
            scenes_path: scenes_path.into(),
            output_path: None,
            seed: 0,
            max_scene_parallel: 4,
            max_mask_parallel: 2,
            segmentation_url: None,
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WorkerResult<Self> {
        let scenes_path = lookup("RDEPTH_SCENES")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WorkerError::config_error("RDEPTH_SCENES not set"))?;

        let config = Self {
            options_path: lookup("RDEPTH_OPTIONS").filter(|s| !s.is_empty()).map(PathBuf::from),
            scenes_path: PathBuf::from(scenes_path),
            output_path: lookup("RDEPTH_OUTPUT").filter(|s| !s.is_empty()).map(PathBuf::from),
            seed: lookup("RDEPTH_SEED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            max_scene_parallel: lookup("RDEPTH_MAX_SCENE_PARALLEL")
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            max_mask_parallel: lookup("RDEPTH_MAX_MASK_PARALLEL")
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            segmentation_url: lookup("RDEPTH_SEGMENTATION_URL").filter(|s| !s.is_empty()),
            request_timeout: Duration::from_secs(
                lookup("RDEPTH_REQUEST_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        };

        if config.max_scene_parallel == 0 {
            return Err(WorkerError::config_error(
                "RDEPTH_MAX_SCENE_PARALLEL must be at least 1",
            ));
        }
        if config.max_mask_parallel == 0 {
            return Err(WorkerError::config_error(
                "RDEPTH_MAX_MASK_PARALLEL must be at least 1",
            ));
        }
        Ok(config)
    }
}
