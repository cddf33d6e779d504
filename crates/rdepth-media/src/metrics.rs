//! Mask metrics.
//!
//! Recorded through the `metrics` facade; the binary decides whether a
//! recorder is installed.

use metrics::{counter, histogram};
use rdepth_models::MaskSource;

/// Metric names as constants for consistency.
pub mod names {
    pub const MASK_CACHE_HITS_TOTAL: &str = "rdepth_mask_cache_hits_total";
    pub const MASK_MODEL_BATCHES_TOTAL: &str = "rdepth_mask_model_batches_total";
    pub const MASK_MODEL_DURATION_SECONDS: &str = "rdepth_mask_model_duration_seconds";
    pub const MASKS_GENERATED_TOTAL: &str = "rdepth_masks_generated_total";
    pub const MASK_FAILURES_TOTAL: &str = "rdepth_mask_failures_total";
}

/// Record a mask served from the on-disk cache.
pub fn record_cache_hit() {
    counter!(names::MASK_CACHE_HITS_TOTAL).increment(1);
}

/// Record one segmentation model call.
pub fn record_model_batch(model: &str, duration_secs: f64) {
    let labels = [("model", model.to_string())];
    counter!(names::MASK_MODEL_BATCHES_TOTAL, &labels).increment(1);
    histogram!(names::MASK_MODEL_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a freshly generated mask.
pub fn record_mask_generated(source: MaskSource) {
    let labels = [("source", source.as_str().to_string())];
    counter!(names::MASKS_GENERATED_TOTAL, &labels).increment(1);
}

/// Record a failed mask.
pub fn record_mask_failure(source: MaskSource) {
    let labels = [("source", source.as_str().to_string())];
    counter!(names::MASK_FAILURES_TOTAL, &labels).increment(1);
}
