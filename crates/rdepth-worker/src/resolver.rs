//! Scene resolution: filtering plus mask attachment.
//!
//! `SceneResolver` is built once per run. Scenes are resolved with bounded
//! parallelism and yielded in input order as a lazy stream; dropping the
//! stream abandons the remaining work at its next await point.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use rand::Rng;
use rdepth_media::{MaskRequest, MaskStrategy, ObjectMask};
use rdepth_models::{ResolvedSample, SampleDescriptor, SceneDescriptor};
use tracing::{debug, Instrument};

use crate::error::SampleError;
use crate::logging::SceneLogger;
use crate::metrics;
use crate::pipeline::{scene_rng, select_scene_subset, subset_rng, SampleFilterPipeline};

/// Result of resolving one sample.
pub type SampleResult = Result<ResolvedSample, SampleError>;

/// Resolves scenes into filtered samples with masks attached.
#[derive(Clone)]
pub struct SceneResolver {
    pipeline: SampleFilterPipeline,
    strategy: Arc<dyn MaskStrategy>,
    max_scene_parallel: usize,
}

impl SceneResolver {
    pub fn new(
        pipeline: SampleFilterPipeline,
        strategy: Arc<dyn MaskStrategy>,
        max_scene_parallel: usize,
    ) -> Self {
        Self {
            pipeline,
            strategy,
            max_scene_parallel: max_scene_parallel.max(1),
        }
    }

    pub fn pipeline(&self) -> &SampleFilterPipeline {
        &self.pipeline
    }

    /// Apply the configured subset ratio to `scenes`.
    pub fn select_scenes(&self, scenes: Vec<SceneDescriptor>, seed: u64) -> Vec<SceneDescriptor> {
        let ratio = self.pipeline.config().subset_ratio();
        let total = scenes.len();
        let selected = select_scene_subset(scenes, ratio, &mut subset_rng(seed));
        debug!(total, selected = selected.len(), ratio, "Selected scene subset");
        selected
    }

    /// Evaluate a sample and, when admitted with masks enabled, resolve one
    /// mask per selected camera image.
    ///
    /// Probabilistic removal runs after the masks are known: a candidate is
    /// eligible when the mask of its camera has foreground inside its box.
    pub async fn resolve_with_masks<R>(
        &self,
        scene: &SceneDescriptor,
        sample: &SampleDescriptor,
        rng: &mut R,
    ) -> SampleResult
    where
        R: Rng + Send + ?Sized,
    {
        if !self.pipeline.config().seg_mask().is_enabled() {
            return Ok(self.pipeline.evaluate(scene, sample, rng)?);
        }

        let screened = self.pipeline.screen(scene, sample)?;
        let masks = if screened.is_admitted() {
            self.resolve_masks(scene, sample, screened.resolved()).await?
        } else {
            Vec::new()
        };

        let mut resolved = self.pipeline.remove_masked(
            screened,
            |object| {
                masks
                    .iter()
                    .any(|mask| mask.handle.camera == object.camera && mask.overlaps(&object.bbox))
            },
            rng,
        );
        resolved.masks = masks.into_iter().map(|mask| mask.handle).collect();
        Ok(resolved)
    }

    async fn resolve_masks(
        &self,
        scene: &SceneDescriptor,
        sample: &SampleDescriptor,
        resolved: &ResolvedSample,
    ) -> Result<Vec<ObjectMask>, SampleError> {
        let requests: Vec<MaskRequest> = resolved
            .cameras
            .iter()
            .filter_map(|&camera| {
                sample.image_for(camera).map(|image| MaskRequest {
                    scene_token: scene.token.clone(),
                    sample_token: sample.token.clone(),
                    camera,
                    image_path: image.path.clone(),
                    width: image.width,
                    height: image.height,
                    regions: resolved.regions_for(camera).to_vec(),
                })
            })
            .collect();

        let results = self.strategy.resolve_batch(&requests).await;
        requests
            .iter()
            .zip(results)
            .map(|(request, result)| {
                result.map_err(|e| {
                    SampleError::mask_inference(&scene.token, &sample.token, request.camera, e)
                })
            })
            .collect()
    }

    /// Resolve every sample of `scenes`.
    ///
    /// Up to `max_scene_parallel` scenes are in flight; results are yielded
    /// scene by scene in input order. Scene `i` draws from
    /// `scene_rng(seed, i)`, so output does not depend on parallelism.
    pub fn resolve_scenes(
        &self,
        scenes: Vec<SceneDescriptor>,
        seed: u64,
    ) -> impl Stream<Item = SampleResult> + '_ {
        stream::iter(scenes.into_iter().enumerate())
            .map(move |(index, scene)| self.resolve_scene(index, scene, seed))
            .buffered(self.max_scene_parallel)
            .flat_map(stream::iter)
    }

    fn resolve_scene(
        &self,
        index: usize,
        scene: SceneDescriptor,
        seed: u64,
    ) -> impl Future<Output = Vec<SampleResult>> + '_ {
        let logger = SceneLogger::new(&scene.token, index);
        let span = logger.create_span();

        async move {
            logger.log_start(scene.samples.len());
            let mut rng = scene_rng(seed, index);
            let mut results = Vec::with_capacity(scene.samples.len());
            let (mut admitted, mut rejected, mut failed) = (0, 0, 0);

            for sample in &scene.samples {
                let result = self.resolve_with_masks(&scene, sample, &mut rng).await;
                match &result {
                    Ok(resolved) if resolved.admitted => admitted += 1,
                    Ok(_) => rejected += 1,
                    Err(e) if e.is_recoverable() => {
                        failed += 1;
                        logger.log_warning(&e.to_string());
                    }
                    Err(e) => {
                        failed += 1;
                        logger.log_error(&e.to_string());
                    }
                }
                results.push(result);
            }

            metrics::record_scene_processed();
            logger.log_completion(admitted, rejected, failed);
            results
        }
        .instrument(span)
    }
}
