//! Shared data models for the radar-depth sample resolver.
//!
//! This crate provides Serde-serializable types for:
//! - Camera and radar identifiers and their association table
//! - Object mobility classification
//! - Scene, sample and annotated-object descriptors
//! - Enumerated filter options (pass filters, mask policy, dataset version)
//! - Resolver output (resolved samples, rejection reasons, mask handles)

pub mod category;
pub mod filter;
pub mod geometry;
pub mod resolved;
pub mod scene;
pub mod sensor;
pub mod topology;

// Re-export common types
pub use category::{CategoryClassifier, Mobility, STATIONARY_CATEGORIES};
pub use filter::{
    MaskPolicy, NuscenesVersion, OptionParseError, PassFilter, PassFilterSet, SegMaskMode,
};
pub use geometry::{BoundingBox, Box3d, MaskRegion, Point};
pub use resolved::{
    CameraMaskRegions, MaskHandle, MaskSource, RejectionReason, ResolvedSample, SensorModalities,
};
pub use scene::{AnnotatedObject, CameraImage, SampleDescriptor, SceneConditions, SceneDescriptor, TimeOfDay};
pub use sensor::{CameraId, RadarId, SensorParseError};
pub use topology::{SensorTopologyTable, TopologyError, TopologyResult};
