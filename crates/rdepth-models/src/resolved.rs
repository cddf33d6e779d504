//! Resolver output types.

use std::fmt;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::MaskRegion;
use crate::scene::AnnotatedObject;
use crate::sensor::{CameraId, RadarId};

/// Why a sample was not admitted.
///
/// Rejections are ordinary, high-frequency outcomes and are recorded on the
/// sample rather than raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    WeatherMismatch,
    NotKeyframe,
    SpeedOutOfBound,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::WeatherMismatch => "weather_mismatch",
            RejectionReason::NotKeyframe => "not_keyframe",
            RejectionReason::SpeedOutOfBound => "speed_out_of_bound",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a mask came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaskSource {
    ModelInference,
    BoundingBox,
    Empty,
}

impl MaskSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskSource::ModelInference => "model_inference",
            MaskSource::BoundingBox => "bounding_box",
            MaskSource::Empty => "empty",
        }
    }
}

impl fmt::Display for MaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to the mask attached to one camera image of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MaskHandle {
    pub camera: CameraId,
    pub source: MaskSource,
    pub width: u32,
    pub height: u32,
    /// On-disk mask file (model masks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
    /// Number of non-zero mask pixels
    pub foreground_pixels: u64,
    /// True when the mask was loaded from the cache instead of computed
    #[serde(default)]
    pub cache_hit: bool,
}

/// Mask geometry for one camera view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CameraMaskRegions {
    pub camera: CameraId,
    pub regions: Vec<MaskRegion>,
}

/// Extra sensor modalities the loader should read for a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SensorModalities {
    pub radar: bool,
    pub lidar: bool,
}

/// Filtering decision and derived data for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedSample {
    pub scene_token: String,
    pub sample_token: String,
    pub timestamp: u64,
    pub admitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionReason>,
    #[serde(default)]
    pub cameras: Vec<CameraId>,
    #[serde(default)]
    pub radars: Vec<RadarId>,
    #[serde(default)]
    pub modalities: SensorModalities,
    /// Objects kept after probabilistic removal
    #[serde(default)]
    pub objects: Vec<AnnotatedObject>,
    /// Objects dropped by probabilistic removal
    #[serde(default)]
    pub removed: Vec<AnnotatedObject>,
    #[serde(default)]
    pub mask_regions: Vec<CameraMaskRegions>,
    #[serde(default)]
    pub masks: Vec<MaskHandle>,
}

impl ResolvedSample {
    /// A rejected sample carrying only its identity and the reason.
    pub fn rejected(
        scene_token: impl Into<String>,
        sample_token: impl Into<String>,
        timestamp: u64,
        reason: RejectionReason,
    ) -> Self {
        Self {
            scene_token: scene_token.into(),
            sample_token: sample_token.into(),
            timestamp,
            admitted: false,
            rejection: Some(reason),
            cameras: Vec::new(),
            radars: Vec::new(),
            modalities: SensorModalities::default(),
            objects: Vec::new(),
            removed: Vec::new(),
            mask_regions: Vec::new(),
            masks: Vec::new(),
        }
    }

    /// Mask geometry for a camera, if any was produced.
    pub fn regions_for(&self, camera: CameraId) -> &[MaskRegion] {
        self.mask_regions
            .iter()
            .find(|entry| entry.camera == camera)
            .map(|entry| entry.regions.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_sample() {
        let sample = ResolvedSample::rejected("scene", "sample", 42, RejectionReason::NotKeyframe);
        assert!(!sample.admitted);
        assert_eq!(sample.rejection, Some(RejectionReason::NotKeyframe));
        assert!(sample.radars.is_empty());
        assert!(sample.regions_for(CameraId::CamFront).is_empty());
    }

    #[test]
    fn test_rejection_serializes_snake_case() {
        let sample =
            ResolvedSample::rejected("scene", "sample", 1, RejectionReason::SpeedOutOfBound);
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["rejection"], "speed_out_of_bound");
        assert_eq!(json["admitted"], false);
    }
}
