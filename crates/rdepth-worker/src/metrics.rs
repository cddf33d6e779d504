//! Sample filtering metrics.

use metrics::counter;
use rdepth_models::RejectionReason;

/// Metric names as constants for consistency.
pub mod names {
    pub const SAMPLES_ADMITTED_TOTAL: &str = "rdepth_samples_admitted_total";
    pub const SAMPLES_REJECTED_TOTAL: &str = "rdepth_samples_rejected_total";
    pub const OBJECTS_REMOVED_TOTAL: &str = "rdepth_objects_removed_total";
    pub const SAMPLES_FAILED_TOTAL: &str = "rdepth_samples_failed_total";
    pub const SCENES_PROCESSED_TOTAL: &str = "rdepth_scenes_processed_total";
}

pub fn record_sample_admitted() {
    counter!(names::SAMPLES_ADMITTED_TOTAL).increment(1);
}

pub fn record_sample_rejected(reason: RejectionReason) {
    let labels = [("reason", reason.as_str().to_string())];
    counter!(names::SAMPLES_REJECTED_TOTAL, &labels).increment(1);
}

pub fn record_objects_removed(count: usize) {
    if count > 0 {
        counter!(names::OBJECTS_REMOVED_TOTAL).increment(count as u64);
    }
}

pub fn record_sample_failed(recoverable: bool) {
    let labels = [("recoverable", recoverable.to_string())];
    counter!(names::SAMPLES_FAILED_TOTAL, &labels).increment(1);
}

pub fn record_scene_processed() {
    counter!(names::SCENES_PROCESSED_TOTAL).increment(1);
}
