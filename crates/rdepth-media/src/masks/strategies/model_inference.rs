//! Model inference strategy - masks from an instance segmentation model.
//!
//! Pending images are grouped into batches of `batch_size` and sent to the
//! model. A semaphore shared by every clone of the strategy bounds the
//! number of model calls in flight, so scenes resolved concurrently never
//! exceed `max_parallel`. Results are cached next to the source image and
//! reused unless `regen_masks` is set.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use image::GrayImage;
use rdepth_models::MaskSource;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::{has_cached_mask, load_cached_mask, mask_cache_path, store_mask};
use crate::error::{MaskError, MaskResult};
use crate::masks::strategy::{MaskRequest, MaskSettings, MaskStrategy, ObjectMask};
use crate::metrics;
use crate::raster::compose_instances;
use crate::segmentation::{InstanceMask, SegmentationModel};

/// Strategy for the `maskrcnn` policy.
#[derive(Clone)]
pub struct ModelInferenceStrategy {
    model: Arc<dyn SegmentationModel>,
    settings: MaskSettings,
    permits: Arc<Semaphore>,
}

impl ModelInferenceStrategy {
    pub fn new(model: Arc<dyn SegmentationModel>, settings: MaskSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_parallel.max(1)));
        Self {
            model,
            settings,
            permits,
        }
    }

    /// Model calls that may still start without waiting.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    async fn from_cache(&self, request: &MaskRequest) -> Option<ObjectMask> {
        if self.settings.regen_masks || !has_cached_mask(&request.image_path).await {
            debug!(image = %request.image_path.display(), "Mask cache MISS");
            return None;
        }

        let cache_path = mask_cache_path(&request.image_path);
        match load_cached_mask(&cache_path).await {
            Ok(raster) => {
                debug!(path = %cache_path.display(), "Mask cache HIT");
                metrics::record_cache_hit();
                Some(ObjectMask::new(
                    request,
                    MaskSource::ModelInference,
                    raster,
                    Some(cache_path),
                    true,
                ))
            }
            Err(e) => {
                warn!(
                    path = %cache_path.display(),
                    error = %e,
                    "Cached mask unreadable, regenerating"
                );
                None
            }
        }
    }

    async fn run_batch(
        &self,
        requests: &[MaskRequest],
        indices: Vec<usize>,
    ) -> Vec<(usize, MaskResult<ObjectMask>)> {
        let paths: Vec<PathBuf> = indices
            .iter()
            .map(|&i| requests[i].image_path.clone())
            .collect();

        let outcome = {
            let _permit = match self.permits.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    return indices
                        .into_iter()
                        .map(|i| (i, Err(MaskError::internal("Model semaphore closed"))))
                        .collect();
                }
            };

            let started = Instant::now();
            let outcome = self.model.segment(&paths).await;
            let elapsed = started.elapsed().as_secs_f64();
            metrics::record_model_batch(self.model.name(), elapsed);
            debug!(
                model = self.model.name(),
                images = paths.len(),
                elapsed_secs = elapsed,
                "Segmentation batch finished"
            );
            outcome
        };

        let instances = match outcome {
            Ok(instances) if instances.len() == paths.len() => instances,
            Ok(instances) => {
                let message = format!(
                    "model returned {} results for {} images",
                    instances.len(),
                    paths.len()
                );
                return self.fail_all(indices, paths, &message);
            }
            Err(e) => {
                let message = e.to_string();
                return self.fail_all(indices, paths, &message);
            }
        };

        let mut results = Vec::with_capacity(indices.len());
        for (index, found) in indices.into_iter().zip(instances) {
            results.push((index, self.finish(&requests[index], found).await));
        }
        results
    }

    fn fail_all(
        &self,
        indices: Vec<usize>,
        paths: Vec<PathBuf>,
        message: &str,
    ) -> Vec<(usize, MaskResult<ObjectMask>)> {
        warn!(
            model = self.model.name(),
            images = paths.len(),
            error = %message,
            "Segmentation batch failed"
        );
        indices
            .into_iter()
            .zip(paths)
            .map(|(index, path)| {
                metrics::record_mask_failure(MaskSource::ModelInference);
                (index, Err(MaskError::inference(path, message)))
            })
            .collect()
    }

    async fn finish(
        &self,
        request: &MaskRequest,
        instances: Vec<InstanceMask>,
    ) -> MaskResult<ObjectMask> {
        let masks: Vec<GrayImage> = instances.into_iter().map(|i| i.mask).collect();
        let raster = compose_instances(
            request.width,
            request.height,
            &masks,
            self.settings.compose_options(),
        );

        let cache_path = mask_cache_path(&request.image_path);
        store_mask(&cache_path, raster.clone()).await?;
        metrics::record_mask_generated(MaskSource::ModelInference);

        Ok(ObjectMask::new(
            request,
            MaskSource::ModelInference,
            raster,
            Some(cache_path),
            false,
        ))
    }
}

#[async_trait]
impl MaskStrategy for ModelInferenceStrategy {
    async fn resolve(&self, request: &MaskRequest) -> MaskResult<ObjectMask> {
        self.resolve_batch(std::slice::from_ref(request))
            .await
            .pop()
            .unwrap_or_else(|| Err(MaskError::internal("Mask result missing")))
    }

    async fn resolve_batch(&self, requests: &[MaskRequest]) -> Vec<MaskResult<ObjectMask>> {
        let mut slots: Vec<Option<MaskResult<ObjectMask>>> =
            (0..requests.len()).map(|_| None).collect();
        let mut pending = Vec::new();

        for (index, request) in requests.iter().enumerate() {
            match self.from_cache(request).await {
                Some(mask) => slots[index] = Some(Ok(mask)),
                None => pending.push(index),
            }
        }

        if !pending.is_empty() {
            let batch_size = self.settings.batch_size.max(1);
            let batches: Vec<Vec<usize>> =
                pending.chunks(batch_size).map(|c| c.to_vec()).collect();

            info!(
                model = self.model.name(),
                images = pending.len(),
                batches = batches.len(),
                cached = requests.len() - pending.len(),
                "Running segmentation"
            );

            let finished: Vec<Vec<(usize, MaskResult<ObjectMask>)>> = stream::iter(batches)
                .map(|batch| self.run_batch(requests, batch))
                .buffered(self.settings.max_parallel.max(1))
                .collect()
                .await;

            for (index, result) in finished.into_iter().flatten() {
                slots[index] = Some(result);
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(MaskError::internal("Mask result missing"))))
            .collect()
    }

    fn source(&self) -> MaskSource {
        MaskSource::ModelInference
    }

    fn name(&self) -> &'static str {
        "model_inference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::fill_rect;
    use rdepth_models::{BoundingBox, CameraId, SegMaskMode};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Model that reports one 5x5 instance per image and counts its calls.
    #[derive(Default)]
    struct CountingModel {
        calls: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
        fail: bool,
        short: bool,
    }

    #[async_trait]
    impl SegmentationModel for CountingModel {
        async fn segment(&self, images: &[PathBuf]) -> MaskResult<Vec<Vec<InstanceMask>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batch_sizes.lock().unwrap().push(images.len());
            if self.fail {
                return Err(MaskError::model_unavailable("connection refused"));
            }

            let mut mask = GrayImage::new(8, 8);
            fill_rect(&mut mask, &BoundingBox::new(1.0, 1.0, 5.0, 5.0), 1);
            let per_image = vec![InstanceMask {
                label: "car".into(),
                score: 0.9,
                mask,
            }];
            let count = if self.short { images.len() - 1 } else { images.len() };
            Ok(vec![per_image; count])
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn request(dir: &Path, name: &str) -> MaskRequest {
        MaskRequest {
            scene_token: "scene-1".into(),
            sample_token: format!("sample-{}", name),
            camera: CameraId::CamFront,
            image_path: dir.join(format!("{}.jpg", name)),
            width: 8,
            height: 8,
            regions: vec![],
        }
    }

    fn settings() -> MaskSettings {
        MaskSettings {
            mode: SegMaskMode::Mono,
            min_object_area: 20,
            batch_size: 2,
            max_parallel: 2,
            ..MaskSettings::default()
        }
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel::default());
        let strategy = ModelInferenceStrategy::new(model.clone(), settings());
        let req = request(dir.path(), "frame");

        let first = strategy.resolve(&req).await.unwrap();
        assert!(!first.handle.cache_hit);
        assert_eq!(first.handle.foreground_pixels, 25);
        assert_eq!(
            first.handle.cache_path.as_deref(),
            Some(dir.path().join("frame-fseg.png").as_path())
        );

        let second = strategy.resolve(&req).await.unwrap();
        assert!(second.handle.cache_hit);
        assert_eq!(second.raster, first.raster);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_regen_ignores_cache() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel::default());
        let strategy = ModelInferenceStrategy::new(
            model.clone(),
            MaskSettings {
                regen_masks: true,
                ..settings()
            },
        );
        let req = request(dir.path(), "frame");

        strategy.resolve(&req).await.unwrap();
        let again = strategy.resolve(&req).await.unwrap();
        assert!(!again.handle.cache_hit);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel::default());
        let strategy = ModelInferenceStrategy::new(model.clone(), settings());
        let requests: Vec<MaskRequest> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| request(dir.path(), name))
            .collect();

        let results = strategy.resolve_batch(&requests).await;
        assert_eq!(results.len(), 5);
        for (req, result) in requests.iter().zip(&results) {
            let mask = result.as_ref().unwrap();
            assert_eq!(mask.handle.cache_path, Some(mask_cache_path(&req.image_path)));
        }

        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
        let mut sizes = model.batch_sizes.lock().unwrap().clone();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 2, 2]);
        assert_eq!(strategy.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_cached_images_skip_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel::default());
        let strategy = ModelInferenceStrategy::new(model.clone(), settings());

        strategy.resolve(&request(dir.path(), "a")).await.unwrap();
        let results = strategy
            .resolve_batch(&[request(dir.path(), "a"), request(dir.path(), "b")])
            .await;

        assert!(results[0].as_ref().unwrap().handle.cache_hit);
        assert!(!results[1].as_ref().unwrap().handle.cache_hit);
        assert_eq!(model.batch_sizes.lock().unwrap().clone(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_model_failure_is_per_image_inference_error() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel {
            fail: true,
            ..CountingModel::default()
        });
        let strategy = ModelInferenceStrategy::new(model, settings());

        let results = strategy
            .resolve_batch(&[request(dir.path(), "a"), request(dir.path(), "b")])
            .await;
        assert_eq!(results.len(), 2);
        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, MaskError::Inference { .. }));
            assert!(!err.is_config_error());
        }
        assert!(!has_cached_mask(&dir.path().join("a.jpg")).await);
    }

    #[tokio::test]
    async fn test_short_model_response_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel {
            short: true,
            ..CountingModel::default()
        });
        let strategy = ModelInferenceStrategy::new(model, settings());

        let results = strategy
            .resolve_batch(&[request(dir.path(), "a"), request(dir.path(), "b")])
            .await;
        let err = results[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("1 results for 2 images"));
    }

    #[tokio::test]
    async fn test_small_instances_are_screened() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(CountingModel::default());
        let strategy = ModelInferenceStrategy::new(
            model,
            MaskSettings {
                min_object_area: 30,
                ..settings()
            },
        );

        let mask = strategy.resolve(&request(dir.path(), "frame")).await.unwrap();
        assert_eq!(mask.handle.foreground_pixels, 0);
    }
}
