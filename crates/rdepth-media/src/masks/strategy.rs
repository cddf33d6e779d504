//! Core mask strategy trait and request/result types.

use std::path::PathBuf;

use async_trait::async_trait;
use image::GrayImage;
use rdepth_models::{BoundingBox, CameraId, MaskHandle, MaskRegion, MaskSource, SegMaskMode};

use crate::error::MaskResult;
use crate::raster::{covers_rect, foreground_pixels, ComposeOptions};

/// Default number of images per model call.
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// Default number of model calls in flight.
pub const DEFAULT_MAX_PARALLEL: usize = 2;

/// Settings shared by all strategies.
#[derive(Debug, Clone, Copy)]
pub struct MaskSettings {
    pub mode: SegMaskMode,
    /// Instance masks smaller than this are discarded; 0 disables screening
    pub min_object_area: u32,
    /// Replace model instance masks by their bounding rectangles
    pub boxify: bool,
    /// Recompute masks even when a cached file exists
    pub regen_masks: bool,
    /// Images per model call
    pub batch_size: usize,
    /// Model calls in flight across all scenes
    pub max_parallel: usize,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            mode: SegMaskMode::Mono,
            min_object_area: 20,
            boxify: false,
            regen_masks: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

impl MaskSettings {
    pub(crate) fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            mode: self.mode,
            min_object_area: self.min_object_area,
            boxify: self.boxify,
        }
    }
}

/// Mask request for one camera image of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskRequest {
    pub scene_token: String,
    pub sample_token: String,
    pub camera: CameraId,
    pub image_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Geometry of the sample's removal candidates in this camera
    pub regions: Vec<MaskRegion>,
}

/// A resolved mask: the raster plus the handle recorded on the sample.
#[derive(Debug, Clone)]
pub struct ObjectMask {
    pub handle: MaskHandle,
    pub raster: GrayImage,
}

impl ObjectMask {
    pub(crate) fn new(
        request: &MaskRequest,
        source: MaskSource,
        raster: GrayImage,
        cache_path: Option<PathBuf>,
        cache_hit: bool,
    ) -> Self {
        let (width, height) = raster.dimensions();
        let handle = MaskHandle {
            camera: request.camera,
            source,
            width,
            height,
            cache_path,
            foreground_pixels: foreground_pixels(&raster),
            cache_hit,
        };
        Self { handle, raster }
    }

    /// Returns true if the mask has foreground inside `rect`.
    pub fn overlaps(&self, rect: &BoundingBox) -> bool {
        covers_rect(&self.raster, rect)
    }
}

/// Strategy producing object masks for camera images.
#[async_trait]
pub trait MaskStrategy: Send + Sync {
    /// Resolve the mask for a single image.
    async fn resolve(&self, request: &MaskRequest) -> MaskResult<ObjectMask>;

    /// Resolve masks for several images.
    ///
    /// Results are returned in request order. Strategies that batch work
    /// override this.
    async fn resolve_batch(&self, requests: &[MaskRequest]) -> Vec<MaskResult<ObjectMask>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.resolve(request).await);
        }
        results
    }

    /// Source recorded on produced handles.
    fn source(&self) -> MaskSource;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
