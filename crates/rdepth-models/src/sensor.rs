//! Sensor identifiers for the nuScenes rig.
//!
//! The rig carries six cameras and five radars. Identifiers parse from and
//! display as the upper-snake channel names used by the dataset
//! (`CAM_FRONT`, `RADAR_BACK_LEFT`, ...).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Camera viewpoint on the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraId {
    CamFront,
    CamFrontLeft,
    CamFrontRight,
    CamBack,
    CamBackLeft,
    CamBackRight,
}

impl CameraId {
    /// All camera viewpoints, front first.
    pub const ALL: &'static [CameraId] = &[
        CameraId::CamFront,
        CameraId::CamFrontLeft,
        CameraId::CamFrontRight,
        CameraId::CamBack,
        CameraId::CamBackLeft,
        CameraId::CamBackRight,
    ];

    /// Returns the dataset channel name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraId::CamFront => "CAM_FRONT",
            CameraId::CamFrontLeft => "CAM_FRONT_LEFT",
            CameraId::CamFrontRight => "CAM_FRONT_RIGHT",
            CameraId::CamBack => "CAM_BACK",
            CameraId::CamBackLeft => "CAM_BACK_LEFT",
            CameraId::CamBackRight => "CAM_BACK_RIGHT",
        }
    }

    /// Returns true for the three forward-facing cameras.
    pub fn is_front(&self) -> bool {
        matches!(
            self,
            CameraId::CamFront | CameraId::CamFrontLeft | CameraId::CamFrontRight
        )
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CameraId {
    type Err = SensorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraId::ALL
            .iter()
            .copied()
            .find(|camera| camera.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SensorParseError::camera(s))
    }
}

/// Radar viewpoint on the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RadarId {
    RadarFront,
    RadarFrontLeft,
    RadarFrontRight,
    RadarBackLeft,
    RadarBackRight,
}

impl RadarId {
    /// All radar viewpoints.
    pub const ALL: &'static [RadarId] = &[
        RadarId::RadarFront,
        RadarId::RadarFrontLeft,
        RadarId::RadarFrontRight,
        RadarId::RadarBackLeft,
        RadarId::RadarBackRight,
    ];

    /// Returns the dataset channel name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RadarId::RadarFront => "RADAR_FRONT",
            RadarId::RadarFrontLeft => "RADAR_FRONT_LEFT",
            RadarId::RadarFrontRight => "RADAR_FRONT_RIGHT",
            RadarId::RadarBackLeft => "RADAR_BACK_LEFT",
            RadarId::RadarBackRight => "RADAR_BACK_RIGHT",
        }
    }
}

impl fmt::Display for RadarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RadarId {
    type Err = SensorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RadarId::ALL
            .iter()
            .copied()
            .find(|radar| radar.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SensorParseError::radar(s))
    }
}

/// Error returned when a channel name is not a known sensor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} channel: {value}")]
pub struct SensorParseError {
    kind: &'static str,
    value: String,
}

impl SensorParseError {
    fn camera(value: &str) -> Self {
        Self {
            kind: "camera",
            value: value.to_string(),
        }
    }

    fn radar(value: &str) -> Self {
        Self {
            kind: "radar",
            value: value.to_string(),
        }
    }

    /// The rejected channel name.
    pub fn value(&self) -> &str {
        &self.value
    }
}
