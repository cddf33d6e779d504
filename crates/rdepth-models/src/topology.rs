//! Camera-to-radar association table.
//!
//! Each camera is associated with the radars whose field of view overlaps
//! its image plane. The table is built once at startup, validated, and never
//! mutated afterwards, so it can be shared freely across worker tasks.

use std::collections::HashMap;

use thiserror::Error;

use crate::sensor::{CameraId, RadarId};

/// Result type for topology lookups.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors raised while building or querying a [`SensorTopologyTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("Unknown sensor: camera '{0}' has no radar association")]
    UnknownSensor(String),

    #[error("Invalid topology: camera '{0}' maps to an empty radar list")]
    InvalidTopology(CameraId),
}

/// Frozen mapping from camera viewpoint to its overlapping radars.
#[derive(Debug, Clone)]
pub struct SensorTopologyTable {
    entries: HashMap<CameraId, Vec<RadarId>>,
}

impl SensorTopologyTable {
    /// Build a table from explicit entries.
    ///
    /// Fails if any camera maps to an empty radar list. A camera listed twice
    /// keeps its last entry.
    pub fn new(entries: impl IntoIterator<Item = (CameraId, Vec<RadarId>)>) -> TopologyResult<Self> {
        let mut table = HashMap::new();
        for (camera, radars) in entries {
            if radars.is_empty() {
                return Err(TopologyError::InvalidTopology(camera));
            }
            table.insert(camera, radars);
        }
        Ok(Self { entries: table })
    }

    /// The nuScenes rig association.
    pub fn nuscenes() -> TopologyResult<Self> {
        use CameraId::*;
        use RadarId::*;

        Self::new([
            (CamFront, vec![RadarFront, RadarFrontLeft, RadarFrontRight]),
            (CamFrontLeft, vec![RadarFront, RadarFrontLeft, RadarFrontRight]),
            (CamFrontRight, vec![RadarFront, RadarFrontLeft, RadarFrontRight]),
            (CamBackLeft, vec![RadarFrontLeft, RadarBackLeft]),
            (CamBackRight, vec![RadarFrontRight, RadarBackRight]),
            (CamBack, vec![RadarBackLeft, RadarBackRight]),
        ])
    }

    /// Radars associated with a camera, in association order.
    pub fn radars_for(&self, camera: CameraId) -> TopologyResult<&[RadarId]> {
        self.entries
            .get(&camera)
            .map(Vec::as_slice)
            .ok_or_else(|| TopologyError::UnknownSensor(camera.to_string()))
    }

    /// Radars associated with a raw camera channel name.
    pub fn radars_for_name(&self, channel: &str) -> TopologyResult<&[RadarId]> {
        let camera: CameraId = channel
            .parse()
            .map_err(|_| TopologyError::UnknownSensor(channel.to_string()))?;
        self.radars_for(camera)
    }

    /// Ordered union of the radars of several cameras.
    ///
    /// Duplicates keep their first position; cameras are visited in the
    /// given order.
    pub fn radar_union(&self, cameras: &[CameraId]) -> TopologyResult<Vec<RadarId>> {
        let mut union: Vec<RadarId> = Vec::new();
        for camera in cameras {
            for radar in self.radars_for(*camera)? {
                if !union.contains(radar) {
                    union.push(*radar);
                }
            }
        }
        Ok(union)
    }

    /// Number of cameras in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_camera_has_radars() {
        let table = SensorTopologyTable::nuscenes().unwrap();
        assert_eq!(table.len(), CameraId::ALL.len());
        for camera in CameraId::ALL {
            let first = table.radars_for(*camera).unwrap().to_vec();
            assert!(!first.is_empty(), "{} has no radars", camera);
            let second = table.radars_for(*camera).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_front_camera_radars() {
        let table = SensorTopologyTable::nuscenes().unwrap();
        assert_eq!(
            table.radars_for(CameraId::CamFront).unwrap(),
            &[
                RadarId::RadarFront,
                RadarId::RadarFrontLeft,
                RadarId::RadarFrontRight
            ]
        );
        assert_eq!(
            table.radars_for(CameraId::CamBack).unwrap(),
            &[RadarId::RadarBackLeft, RadarId::RadarBackRight]
        );
    }

    #[test]
    fn test_empty_radar_list_is_rejected() {
        let err = SensorTopologyTable::new([(CameraId::CamBack, vec![])]).unwrap_err();
        assert_eq!(err, TopologyError::InvalidTopology(CameraId::CamBack));
    }

    #[test]
    fn test_unknown_camera() {
        let table =
            SensorTopologyTable::new([(CameraId::CamFront, vec![RadarId::RadarFront])]).unwrap();
        assert!(matches!(
            table.radars_for(CameraId::CamBack),
            Err(TopologyError::UnknownSensor(name)) if name == "CAM_BACK"
        ));
        assert!(matches!(
            table.radars_for_name("CAM_ROOF"),
            Err(TopologyError::UnknownSensor(name)) if name == "CAM_ROOF"
        ));
    }

    #[test]
    fn test_radar_union_dedupes_in_order() {
        let table = SensorTopologyTable::nuscenes().unwrap();
        let union = table
            .radar_union(&[CameraId::CamBackLeft, CameraId::CamFront, CameraId::CamBack])
            .unwrap();
        assert_eq!(
            union,
            vec![
                RadarId::RadarFrontLeft,
                RadarId::RadarBackLeft,
                RadarId::RadarFront,
                RadarId::RadarFrontRight,
                RadarId::RadarBackRight,
            ]
        );
    }
}
