//! End-to-end resolution tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rdepth_media::{InstanceMask, MaskResult, MaskStrategyBuilder, SegmentationModel};
use rdepth_models::{
    AnnotatedObject, BoundingBox, CameraId, CameraImage, MaskSource, RadarId, RejectionReason,
    ResolvedSample, SampleDescriptor, SceneConditions, SceneDescriptor, SensorTopologyTable,
    TimeOfDay,
};
use rdepth_worker::{
    ConfigError, FilterConfiguration, RawFilterOptions, SampleFilterPipeline, SceneResolver,
    WorkerConfig,
};

/// Model reporting a single 6x6 instance per image.
#[derive(Default)]
struct CountingModel {
    calls: AtomicUsize,
}

#[async_trait]
impl SegmentationModel for CountingModel {
    async fn segment(&self, images: &[PathBuf]) -> MaskResult<Vec<Vec<InstanceMask>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut mask = GrayImage::new(32, 16);
        for y in 2..8 {
            for x in 2..8 {
                mask.put_pixel(x, y, Luma([1]));
            }
        }
        Ok(images
            .iter()
            .map(|_| {
                vec![InstanceMask {
                    label: "car".into(),
                    score: 0.95,
                    mask: mask.clone(),
                }]
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn sample(dir: &Path, token: &str, key_frame: bool) -> SampleDescriptor {
    SampleDescriptor {
        token: token.into(),
        timestamp: 1_000,
        is_key_frame: key_frame,
        ego_speed: 4.0,
        images: vec![CameraImage {
            camera: CameraId::CamFront,
            path: dir.join(format!("{}__CAM_FRONT.jpg", token)),
            width: 32,
            height: 16,
        }],
        objects: vec![
            AnnotatedObject {
                token: format!("{}-car", token),
                category: "vehicle.car".into(),
                camera: CameraId::CamFront,
                bbox: BoundingBox::new(0.0, 0.0, 8.0, 4.0),
                polygon: None,
                box_3d: None,
                area: 32.0,
            },
            AnnotatedObject {
                token: format!("{}-cone", token),
                category: "movable_object.trafficcone".into(),
                camera: CameraId::CamFront,
                bbox: BoundingBox::new(20.0, 8.0, 4.0, 4.0),
                polygon: None,
                box_3d: None,
                area: 16.0,
            },
        ],
    }
}

fn scene(dir: &Path, token: &str, conditions: SceneConditions) -> SceneDescriptor {
    SceneDescriptor {
        token: token.into(),
        name: token.into(),
        description: String::new(),
        conditions,
        samples: vec![
            sample(dir, &format!("{}-a", token), true),
            sample(dir, &format!("{}-b", token), false),
        ],
    }
}

fn resolver(raw: RawFilterOptions, model: Option<Arc<dyn SegmentationModel>>) -> SceneResolver {
    let config = FilterConfiguration::build(raw).unwrap();
    let mut builder = MaskStrategyBuilder::for_policy(config.mask_policy())
        .with_settings(config.mask_settings(2));
    if let Some(model) = model {
        builder = builder.with_model(model);
    }
    let strategy = builder.build().ok().unwrap();
    let pipeline = SampleFilterPipeline::new(
        Arc::new(config),
        Arc::new(SensorTopologyTable::nuscenes().unwrap()),
    );
    SceneResolver::new(pipeline, strategy, 2)
}

#[tokio::test]
async fn test_run_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let scenes = vec![
        scene(dir.path(), "day-scene", SceneConditions::day()),
        scene(dir.path(), "night-scene", SceneConditions::night()),
    ];

    let scenes_path = dir.path().join("scenes.json");
    tokio::fs::write(&scenes_path, serde_json::to_vec(&scenes).unwrap())
        .await
        .unwrap();

    let options_path = dir.path().join("options.json");
    tokio::fs::write(
        &options_path,
        r#"{
            "pass_filters": ["day"],
            "use_keyframe": true,
            "how_to_gen_masks": "bbox",
            "seg_mask": "mono"
        }"#,
    )
    .await
    .unwrap();

    let output_path = dir.path().join("resolved.jsonl");
    let mut config = WorkerConfig::new(&scenes_path);
    config.options_path = Some(options_path);
    config.output_path = Some(output_path.clone());

    let summary = rdepth_worker::run(&config).await.unwrap();
    assert_eq!(summary.scenes, 2);
    assert_eq!(summary.samples, 4);
    assert_eq!(summary.admitted, 1);
    assert_eq!(summary.rejected, 3);
    assert_eq!(summary.skipped, 0);

    let output = tokio::fs::read_to_string(&output_path).await.unwrap();
    let resolved: Vec<ResolvedSample> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(resolved.len(), 4);

    let admitted = &resolved[0];
    assert_eq!(admitted.sample_token, "day-scene-a");
    assert!(admitted.admitted);
    assert_eq!(
        admitted.radars,
        vec![RadarId::RadarFront, RadarId::RadarFrontLeft, RadarId::RadarFrontRight]
    );
    assert_eq!(admitted.masks.len(), 1);
    assert_eq!(admitted.masks[0].source, MaskSource::BoundingBox);
    // Car box only; the cone is below the default minimum area
    assert_eq!(admitted.masks[0].foreground_pixels, 32);

    assert_eq!(resolved[1].rejection, Some(RejectionReason::NotKeyframe));
    assert_eq!(resolved[2].rejection, Some(RejectionReason::WeatherMismatch));
    assert_eq!(resolved[3].rejection, Some(RejectionReason::WeatherMismatch));
}

#[tokio::test]
async fn test_cached_masks_skip_second_model_call() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(CountingModel::default());
    let raw = RawFilterOptions {
        how_to_gen_masks: "maskrcnn".into(),
        seg_mask: "mono".into(),
        ..RawFilterOptions::default()
    };
    let resolver = resolver(raw, Some(model.clone() as Arc<dyn SegmentationModel>));
    let scene = scene(dir.path(), "scene", SceneConditions::day());

    let first = resolver
        .resolve_with_masks(&scene, &scene.samples[0], &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();
    let second = resolver
        .resolve_with_masks(&scene, &scene.samples[0], &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();

    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    assert!(!first.masks[0].cache_hit);
    assert!(second.masks[0].cache_hit);
    assert_eq!(first.masks[0].foreground_pixels, 36);
    assert_eq!(second.masks[0].foreground_pixels, 36);
    assert_eq!(
        first.masks[0].cache_path.as_deref(),
        Some(dir.path().join("scene-a__CAM_FRONT-fseg.png").as_path())
    );
}

#[tokio::test]
async fn test_removal_is_reproducible_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let scenes: Vec<SceneDescriptor> = (0..5)
        .map(|i| scene(dir.path(), &format!("s{}", i), SceneConditions::new(TimeOfDay::Day, true)))
        .collect();
    let raw = RawFilterOptions {
        how_to_gen_masks: "bbox".into(),
        seg_mask: "mono".into(),
        prob_to_mask_objects: 0.5,
        min_object_area: 0,
        ..RawFilterOptions::default()
    };

    let first = resolver(raw.clone(), None);
    let second = resolver(raw, None);

    let mut out_a = Vec::new();
    let mut out_b = Vec::new();
    rdepth_worker::resolve_to_writer(&first, scenes.clone(), 21, &mut out_a)
        .await
        .unwrap();
    rdepth_worker::resolve_to_writer(&second, scenes, 21, &mut out_b)
        .await
        .unwrap();

    assert!(!out_a.is_empty());
    assert_eq!(out_a, out_b);
}

#[tokio::test]
async fn test_removal_requires_a_generated_mask() {
    let dir = tempfile::tempdir().unwrap();
    let scene = scene(dir.path(), "scene", SceneConditions::day());
    let raw = RawFilterOptions {
        prob_to_mask_objects: 1.0,
        ..RawFilterOptions::default()
    };

    // Default black policy without masks: nothing is removed
    let resolved = resolver(raw.clone(), None)
        .resolve_with_masks(&scene, &scene.samples[0], &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();
    assert!(resolved.removed.is_empty());
    assert_eq!(resolved.objects.len(), 2);

    // Model instance covers the car box only
    let model = Arc::new(CountingModel::default());
    let resolved = resolver(
        RawFilterOptions {
            how_to_gen_masks: "maskrcnn".into(),
            seg_mask: "mono".into(),
            ..raw
        },
        Some(model as Arc<dyn SegmentationModel>),
    )
    .resolve_with_masks(&scene, &scene.samples[0], &mut StdRng::seed_from_u64(0))
    .await
    .unwrap();
    let removed: Vec<&str> = resolved.removed.iter().map(|o| o.token.as_str()).collect();
    assert_eq!(removed, vec!["scene-a-car"]);
    assert_eq!(resolved.objects.len(), 1);
}

#[test]
fn test_invalid_options_rejected_before_processing() {
    let err = FilterConfiguration::build(RawFilterOptions {
        speed_bound: vec![5.0, 1.0],
        ..RawFilterOptions::default()
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBound { .. }));

    let err = FilterConfiguration::build(RawFilterOptions {
        prob_to_mask_objects: 1.5,
        ..RawFilterOptions::default()
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRatio { .. }));
}
