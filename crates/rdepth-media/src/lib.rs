#![deny(unreachable_patterns)]
//! Object mask resolution for camera images.
//!
//! This crate provides:
//! - Mask strategies selected once per run from the mask policy
//! - Batched segmentation model calls with bounded concurrency
//! - An on-disk mask cache keyed by the source image name
//! - Rasterization of object geometry into single-channel masks

pub mod cache;
pub mod error;
pub mod masks;
pub mod metrics;
pub mod raster;
pub mod segmentation;

pub use cache::{has_cached_mask, mask_cache_path};
pub use error::{MaskError, MaskResult};
pub use masks::{
    BoundingBoxStrategy, EmptyStrategy, MaskRequest, MaskSettings, MaskStrategy,
    MaskStrategyBuilder, ModelInferenceStrategy, ObjectMask,
};
pub use raster::{compose_instances, covers_rect, rasterize_regions, ComposeOptions};
pub use segmentation::{InstanceMask, SegmentationModel};
