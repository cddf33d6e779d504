//! Per-sample filtering pipeline.
//!
//! Evaluation order:
//! 1. Weather/time-of-day admission
//! 2. Keyframe admission
//! 3. Ego speed admission
//! 4. Radar association for the selected cameras
//! 5. Stationary filtering of removal candidates
//! 6. Area screening of candidates
//! 7. Probabilistic removal of candidates under a generated mask
//! 8. Mask geometry per camera
//!
//! Steps 1-3 short-circuit with a rejection. [`SampleFilterPipeline::screen`]
//! runs every step except removal; removal needs to know which candidates a
//! mask covers and runs in [`SampleFilterPipeline::remove_masked`].

pub mod predicates;
pub mod rng;
pub mod subset;

pub use rng::{scene_rng, subset_rng};
pub use subset::{select_scene_subset, subset_size};

use std::sync::Arc;

use rand::Rng;
use rdepth_models::{
    AnnotatedObject, CameraMaskRegions, CategoryClassifier, MaskPolicy, ResolvedSample,
    SampleDescriptor, SceneDescriptor, SensorTopologyTable,
};
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::filter_config::FilterConfiguration;
use crate::metrics;

/// A sample after admission and candidate screening, before removal.
#[derive(Debug, Clone)]
pub struct ScreenedSample {
    resolved: ResolvedSample,
    /// Removal candidacy of each entry of `resolved.objects`
    candidates: Vec<bool>,
}

impl ScreenedSample {
    pub fn resolved(&self) -> &ResolvedSample {
        &self.resolved
    }

    pub fn is_admitted(&self) -> bool {
        self.resolved.admitted
    }

    /// Objects eligible for masking and removal, in input order.
    pub fn candidates(&self) -> impl Iterator<Item = &AnnotatedObject> + '_ {
        self.resolved
            .objects
            .iter()
            .zip(&self.candidates)
            .filter_map(|(object, &candidate)| candidate.then_some(object))
    }
}

/// Admission and object filtering for samples.
#[derive(Debug, Clone)]
pub struct SampleFilterPipeline {
    config: Arc<FilterConfiguration>,
    topology: Arc<SensorTopologyTable>,
    classifier: CategoryClassifier,
}

impl SampleFilterPipeline {
    pub fn new(config: Arc<FilterConfiguration>, topology: Arc<SensorTopologyTable>) -> Self {
        Self {
            config,
            topology,
            classifier: CategoryClassifier::new(),
        }
    }

    pub fn config(&self) -> &FilterConfiguration {
        &self.config
    }

    pub fn topology(&self) -> &SensorTopologyTable {
        &self.topology
    }

    /// Decide whether `sample` is admitted and derive its resolved form.
    ///
    /// Rejections are returned as values. Errors are reserved for data and
    /// topology problems.
    ///
    /// Only masks derivable from annotations are known here: under the
    /// `bbox` policy a candidate with a camera image is covered by its own
    /// region. Model masks do not exist yet, so nothing is removed under
    /// `maskrcnn`; `SceneResolver::resolve_with_masks` removes objects after
    /// inference instead.
    pub fn evaluate<R>(
        &self,
        scene: &SceneDescriptor,
        sample: &SampleDescriptor,
        rng: &mut R,
    ) -> Result<ResolvedSample, ResolveError>
    where
        R: Rng + ?Sized,
    {
        let screened = self.screen(scene, sample)?;
        let annotation_masks = self.config.seg_mask().is_enabled()
            && self.config.mask_policy() == MaskPolicy::BoundingBox;
        Ok(self.remove_masked(
            screened,
            |object| annotation_masks && sample.image_for(object.camera).is_some(),
            rng,
        ))
    }

    /// Run admission and candidate screening.
    ///
    /// Every input object is kept on the result; mask regions cover all
    /// candidates of the selected cameras. No random draws are taken.
    pub fn screen(
        &self,
        scene: &SceneDescriptor,
        sample: &SampleDescriptor,
    ) -> Result<ScreenedSample, ResolveError> {
        let conditions = scene.effective_conditions();
        let time_of_day = conditions
            .time_of_day
            .ok_or_else(|| ResolveError::MissingTimeOfDay {
                scene: scene.token.clone(),
            })?;

        if let Some(reason) =
            predicates::first_rejection(&self.config, time_of_day, conditions.rain, sample)
        {
            debug!(
                scene = %scene.token,
                sample = %sample.token,
                reason = %reason,
                "Sample rejected"
            );
            metrics::record_sample_rejected(reason);
            return Ok(ScreenedSample {
                resolved: ResolvedSample::rejected(
                    &scene.token,
                    &sample.token,
                    sample.timestamp,
                    reason,
                ),
                candidates: Vec::new(),
            });
        }

        let cameras = self.config.camera_channels().to_vec();
        let radars = self.topology.radar_union(&cameras)?;

        let candidates: Vec<bool> = sample
            .objects
            .iter()
            .map(|object| self.is_candidate(object))
            .collect();

        let mask_regions = cameras
            .iter()
            .map(|&camera| CameraMaskRegions {
                camera,
                regions: sample
                    .objects
                    .iter()
                    .zip(&candidates)
                    .filter(|(object, candidate)| **candidate && object.camera == camera)
                    .map(|(object, _)| {
                        if self.config.boxify() {
                            object.mask_region().boxified()
                        } else {
                            object.mask_region()
                        }
                    })
                    .collect(),
            })
            .collect();

        metrics::record_sample_admitted();

        Ok(ScreenedSample {
            resolved: ResolvedSample {
                scene_token: scene.token.clone(),
                sample_token: sample.token.clone(),
                timestamp: sample.timestamp,
                admitted: true,
                rejection: None,
                cameras,
                radars,
                modalities: self.config.modalities(),
                objects: sample.objects.clone(),
                removed: Vec::new(),
                mask_regions,
                masks: Vec::new(),
            },
            candidates,
        })
    }

    /// Probabilistically remove candidates covered by a generated mask.
    ///
    /// One draw is taken from `rng` per covered candidate, in input order;
    /// the object is removed when the draw is below the removal
    /// probability. Objects that are not candidates, or that `is_masked`
    /// rejects, never consume a draw.
    pub fn remove_masked<R, F>(
        &self,
        screened: ScreenedSample,
        is_masked: F,
        rng: &mut R,
    ) -> ResolvedSample
    where
        R: Rng + ?Sized,
        F: Fn(&AnnotatedObject) -> bool,
    {
        let ScreenedSample {
            mut resolved,
            candidates,
        } = screened;
        if !resolved.admitted {
            return resolved;
        }

        let probability = self.config.object_removal_probability();
        let objects = std::mem::take(&mut resolved.objects);
        for (object, candidate) in objects.into_iter().zip(candidates) {
            if candidate && is_masked(&object) {
                let draw: f64 = rng.random();
                if draw < probability {
                    resolved.removed.push(object);
                    continue;
                }
            }
            resolved.objects.push(object);
        }

        metrics::record_objects_removed(resolved.removed.len());
        trace!(
            scene = %resolved.scene_token,
            sample = %resolved.sample_token,
            retained = resolved.objects.len(),
            removed = resolved.removed.len(),
            "Sample admitted"
        );
        resolved
    }

    /// Objects outside the selected cameras, stationary objects under the
    /// stationary filter and objects below the minimum area stay as
    /// annotations only.
    fn is_candidate(&self, object: &AnnotatedObject) -> bool {
        if !self.config.camera_channels().contains(&object.camera) {
            return false;
        }
        if self.config.stationary_filter()
            && !self.classifier.classify(&object.category).is_movable()
        {
            return false;
        }
        let min_area = self.config.min_object_area();
        min_area == 0 || object.area >= min_area as f64
    }
}
