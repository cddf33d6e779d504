//! Flat filter option mapping.
//!
//! Field names and defaults follow the training option set, so an options
//! file written for the trainer can be fed to the worker unchanged. Values
//! are validated by [`FilterConfiguration::build`](crate::FilterConfiguration::build).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorkerResult;

/// Raw, unvalidated filter options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFilterOptions {
    /// Camera channels to load, e.g. `["CAM_FRONT", "CAM_BACK"]`
    pub camera_channels: Vec<String>,
    /// Scene tags to admit: any of `day`, `night`, `rain`
    pub pass_filters: Vec<String>,
    /// Keep only annotated keyframes
    pub use_keyframe: bool,
    /// Exclude stationary categories from masking and removal
    pub stationary_filter: bool,
    /// Ego speed bounds in m/s; one value is a lower bound only
    pub speed_bound: Vec<f64>,
    /// Mask policy: `maskrcnn`, `bbox` or `black`
    pub how_to_gen_masks: String,
    pub maskrcnn_batch_size: usize,
    /// Recompute masks even when cached
    pub regen_masks: bool,
    /// Probability of removing each candidate object
    pub prob_to_mask_objects: f64,
    /// Fraction of scenes to sample
    pub subset_ratio: f64,
    pub nuscenes_version: String,
    /// Mask encoding: `none`, `mono` or `color`
    pub seg_mask: String,
    /// Minimum object area in pixels; 0 disables screening
    pub min_object_area: u32,
    /// Use bounding rectangles instead of outlines for masks
    pub boxify: bool,
    pub use_radar: bool,
    pub use_lidar: bool,
}

impl Default for RawFilterOptions {
    fn default() -> Self {
        Self {
            camera_channels: vec!["CAM_FRONT".to_string()],
            pass_filters: vec!["day".to_string(), "night".to_string(), "rain".to_string()],
            use_keyframe: false,
            stationary_filter: false,
            speed_bound: vec![0.0],
            how_to_gen_masks: "black".to_string(),
            maskrcnn_batch_size: 4,
            regen_masks: false,
            prob_to_mask_objects: 0.0,
            subset_ratio: 1.0,
            nuscenes_version: "v1.0-mini".to_string(),
            seg_mask: "none".to_string(),
            min_object_area: 20,
            boxify: false,
            use_radar: false,
            use_lidar: false,
        }
    }
}

impl RawFilterOptions {
    /// Parse options from a JSON string. Missing keys take their defaults.
    pub fn from_json(json: &str) -> WorkerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub async fn from_file(path: &Path) -> WorkerResult<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}
