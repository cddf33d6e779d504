//! Empty strategy - all-zero masks.

use async_trait::async_trait;
use image::GrayImage;
use rdepth_models::MaskSource;

use crate::error::MaskResult;
use crate::masks::strategy::{MaskRequest, MaskStrategy, ObjectMask};

/// Strategy for the `black` policy: every mask is empty.
pub struct EmptyStrategy;

#[async_trait]
impl MaskStrategy for EmptyStrategy {
    async fn resolve(&self, request: &MaskRequest) -> MaskResult<ObjectMask> {
        let raster = GrayImage::new(request.width, request.height);
        Ok(ObjectMask::new(request, MaskSource::Empty, raster, None, false))
    }

    fn source(&self) -> MaskSource {
        MaskSource::Empty
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}
