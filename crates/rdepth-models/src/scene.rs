//! Scene and sample descriptors produced by the dataset reader.
//!
//! These are read-only inputs to the resolver. A scene carries one
//! weather/time classification and an ordered list of samples; each sample
//! is one timestamped multi-sensor frame.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Box3d, MaskRegion, Point};
use crate::sensor::CameraId;

/// Day/night base state of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Day,
    Night,
}

/// Weather/time classification of a scene.
///
/// Rain is an overlay on top of the day/night base state. The base state is
/// optional here only because readers may not know it; the resolver refuses
/// scenes whose base state is neither set nor derivable from the description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SceneConditions {
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub rain: bool,
}

impl SceneConditions {
    pub fn new(time_of_day: TimeOfDay, rain: bool) -> Self {
        Self {
            time_of_day: Some(time_of_day),
            rain,
        }
    }

    pub fn day() -> Self {
        Self::new(TimeOfDay::Day, false)
    }

    pub fn night() -> Self {
        Self::new(TimeOfDay::Night, false)
    }

    /// Derive conditions from a free-text scene description.
    ///
    /// nuScenes descriptions mention "night" and "rain" explicitly; scenes
    /// that do not mention night were recorded in daylight.
    pub fn from_description(description: &str) -> Self {
        let lower = description.to_lowercase();
        let time_of_day = if lower.contains("night") {
            TimeOfDay::Night
        } else {
            TimeOfDay::Day
        };
        Self::new(time_of_day, lower.contains("rain"))
    }
}

/// A recorded driving sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneDescriptor {
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: SceneConditions,
    #[serde(default)]
    pub samples: Vec<SampleDescriptor>,
}

impl SceneDescriptor {
    /// Conditions used for admission.
    ///
    /// Explicit conditions win. Without a day/night base state the
    /// description is parsed instead; an empty description leaves the base
    /// state unknown.
    pub fn effective_conditions(&self) -> SceneConditions {
        if self.conditions.time_of_day.is_some() || self.description.trim().is_empty() {
            return self.conditions;
        }
        let derived = SceneConditions::from_description(&self.description);
        SceneConditions {
            time_of_day: derived.time_of_day,
            rain: self.conditions.rain || derived.rain,
        }
    }
}

/// Camera image belonging to a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CameraImage {
    pub camera: CameraId,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// One timestamped multi-sensor frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SampleDescriptor {
    pub token: String,
    /// Capture time in microseconds
    pub timestamp: u64,
    pub is_key_frame: bool,
    /// Ego speed in m/s
    pub ego_speed: f64,
    #[serde(default)]
    pub images: Vec<CameraImage>,
    #[serde(default)]
    pub objects: Vec<AnnotatedObject>,
}

impl SampleDescriptor {
    /// Image captured by a given camera, if any.
    pub fn image_for(&self, camera: CameraId) -> Option<&CameraImage> {
        self.images.iter().find(|image| image.camera == camera)
    }
}

/// Annotated object projected into one camera view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotatedObject {
    pub token: String,
    pub category: String,
    /// Camera whose image plane the 2D geometry lives in
    pub camera: CameraId,
    pub bbox: BoundingBox,
    /// Projected outline in pixels, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_3d: Option<Box3d>,
    /// Projected area in pixels
    pub area: f64,
}

impl AnnotatedObject {
    /// Mask geometry of this object: its outline when known, else its box.
    pub fn mask_region(&self) -> MaskRegion {
        match &self.polygon {
            Some(points) if points.len() >= 3 => MaskRegion::Polygon {
                points: points.clone(),
            },
            _ => MaskRegion::Rect { rect: self.bbox },
        }
    }
}
