//! Segmentation model provider trait.
//!
//! The model itself runs outside this process (for example a Mask R-CNN
//! service pretrained on COCO). Implementations hand it a batch of image
//! paths and return the instance masks found in each image.

use std::path::PathBuf;

use async_trait::async_trait;
use image::GrayImage;

use crate::error::MaskResult;

/// One detected instance in an image.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceMask {
    /// Class label reported by the model (e.g. "car")
    pub label: String,
    /// Detection confidence in [0, 1]
    pub score: f32,
    /// Binary mask; non-zero pixels belong to the instance
    pub mask: GrayImage,
}

/// Batched instance segmentation.
#[async_trait]
pub trait SegmentationModel: Send + Sync {
    /// Segment a batch of images.
    ///
    /// # Returns
    /// One instance list per input image, in input order.
    async fn segment(&self, images: &[PathBuf]) -> MaskResult<Vec<Vec<InstanceMask>>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
