//! Bounding-box strategy - masks rasterized from annotated geometry.

use async_trait::async_trait;
use rdepth_models::MaskSource;
use tracing::debug;

use crate::error::MaskResult;
use crate::masks::strategy::{MaskRequest, MaskSettings, MaskStrategy, ObjectMask};
use crate::raster::rasterize_regions;

/// Strategy for the `bbox` policy.
///
/// Fills the retained object geometry of the request (rectangles and
/// outlines) into an image-sized raster. Never touches the disk.
pub struct BoundingBoxStrategy {
    settings: MaskSettings,
}

impl BoundingBoxStrategy {
    pub fn new(settings: MaskSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl MaskStrategy for BoundingBoxStrategy {
    async fn resolve(&self, request: &MaskRequest) -> MaskResult<ObjectMask> {
        let raster = rasterize_regions(
            request.width,
            request.height,
            &request.regions,
            self.settings.mode,
        );

        debug!(
            sample = %request.sample_token,
            camera = %request.camera,
            regions = request.regions.len(),
            "Rasterized box mask"
        );

        Ok(ObjectMask::new(request, MaskSource::BoundingBox, raster, None, false))
    }

    fn source(&self) -> MaskSource {
        MaskSource::BoundingBox
    }

    fn name(&self) -> &'static str {
        "bounding_box"
    }
}
