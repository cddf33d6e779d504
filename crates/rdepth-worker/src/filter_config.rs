//! Validated filter configuration.
//!
//! `FilterConfiguration::build` is the single place option strings are
//! parsed and checked. The result is immutable and shared across scene
//! tasks behind an `Arc`.

use std::str::FromStr;

use rdepth_media::MaskSettings;
use rdepth_models::{
    CameraId, MaskPolicy, NuscenesVersion, PassFilter, PassFilterSet, SegMaskMode,
    SensorModalities,
};
use tracing::debug;

use crate::error::ConfigError;
use crate::options::RawFilterOptions;

/// Inclusive ego speed interval in m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBound {
    pub low: f64,
    /// `f64::INFINITY` disables upper screening
    pub high: f64,
}

impl SpeedBound {
    pub fn contains(&self, speed: f64) -> bool {
        speed >= self.low && speed <= self.high
    }

    fn parse(values: &[f64]) -> Result<Self, ConfigError> {
        let (low, high) = match values {
            [low] => (*low, f64::INFINITY),
            [low, high] => (*low, *high),
            _ => {
                return Err(ConfigError::invalid_bound(
                    values,
                    format!("expected 1 or 2 values, got {}", values.len()),
                ))
            }
        };

        if low.is_nan() || high.is_nan() {
            return Err(ConfigError::invalid_bound(values, "bounds must be numbers"));
        }
        if low < 0.0 {
            return Err(ConfigError::invalid_bound(values, "lower bound must be >= 0"));
        }
        if low > high {
            return Err(ConfigError::invalid_bound(
                values,
                "lower bound exceeds upper bound",
            ));
        }
        Ok(Self { low, high })
    }
}

/// Immutable, validated filter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfiguration {
    camera_channels: Vec<CameraId>,
    pass_filters: PassFilterSet,
    stationary_filter: bool,
    speed_bound: SpeedBound,
    use_keyframe: bool,
    mask_policy: MaskPolicy,
    regen_masks: bool,
    object_removal_probability: f64,
    subset_ratio: f64,
    nuscenes_version: NuscenesVersion,
    mask_batch_size: usize,
    min_object_area: u32,
    boxify: bool,
    seg_mask: SegMaskMode,
    modalities: SensorModalities,
}

impl FilterConfiguration {
    /// Validate raw options.
    pub fn build(raw: RawFilterOptions) -> Result<Self, ConfigError> {
        let camera_channels = parse_cameras(&raw.camera_channels)?;
        let pass_filters = parse_pass_filters(&raw.pass_filters)?;
        let speed_bound = SpeedBound::parse(&raw.speed_bound)?;

        check_ratio(
            "prob_to_mask_objects",
            raw.prob_to_mask_objects,
            |p| (0.0..=1.0).contains(&p),
            "a value in [0, 1]",
        )?;
        check_ratio(
            "subset_ratio",
            raw.subset_ratio,
            |r| r > 0.0 && r <= 1.0,
            "a value in (0, 1]",
        )?;

        let mask_policy = MaskPolicy::from_str(&raw.how_to_gen_masks).map_err(|_| {
            ConfigError::invalid_mask_config(format!(
                "how_to_gen_masks '{}' is not one of maskrcnn, bbox, black",
                raw.how_to_gen_masks
            ))
        })?;
        if mask_policy.requires_model() && raw.maskrcnn_batch_size == 0 {
            return Err(ConfigError::invalid_mask_config(
                "maskrcnn_batch_size must be at least 1",
            ));
        }

        let seg_mask = SegMaskMode::from_str(&raw.seg_mask).map_err(|_| {
            ConfigError::invalid_mask_config(format!(
                "seg_mask '{}' is not one of none, mono, color",
                raw.seg_mask
            ))
        })?;

        let nuscenes_version = NuscenesVersion::from_str(&raw.nuscenes_version)
            .map_err(|_| ConfigError::UnknownDatasetVersion(raw.nuscenes_version.clone()))?;

        let config = Self {
            camera_channels,
            pass_filters,
            stationary_filter: raw.stationary_filter,
            speed_bound,
            use_keyframe: raw.use_keyframe,
            mask_policy,
            regen_masks: raw.regen_masks,
            object_removal_probability: raw.prob_to_mask_objects,
            subset_ratio: raw.subset_ratio,
            nuscenes_version,
            mask_batch_size: raw.maskrcnn_batch_size,
            min_object_area: raw.min_object_area,
            boxify: raw.boxify,
            seg_mask,
            modalities: SensorModalities {
                radar: raw.use_radar,
                lidar: raw.use_lidar,
            },
        };

        debug!(
            cameras = ?config.camera_channels,
            pass_filters = %config.pass_filters,
            mask_policy = %config.mask_policy,
            seg_mask = %config.seg_mask,
            "Filter configuration built"
        );
        Ok(config)
    }

    pub fn camera_channels(&self) -> &[CameraId] {
        &self.camera_channels
    }

    pub fn pass_filters(&self) -> PassFilterSet {
        self.pass_filters
    }

    pub fn stationary_filter(&self) -> bool {
        self.stationary_filter
    }

    pub fn speed_bound(&self) -> SpeedBound {
        self.speed_bound
    }

    pub fn use_keyframe(&self) -> bool {
        self.use_keyframe
    }

    pub fn mask_policy(&self) -> MaskPolicy {
        self.mask_policy
    }

    pub fn regen_masks(&self) -> bool {
        self.regen_masks
    }

    pub fn object_removal_probability(&self) -> f64 {
        self.object_removal_probability
    }

    pub fn subset_ratio(&self) -> f64 {
        self.subset_ratio
    }

    pub fn nuscenes_version(&self) -> NuscenesVersion {
        self.nuscenes_version
    }

    pub fn mask_batch_size(&self) -> usize {
        self.mask_batch_size
    }

    pub fn min_object_area(&self) -> u32 {
        self.min_object_area
    }

    pub fn boxify(&self) -> bool {
        self.boxify
    }

    pub fn seg_mask(&self) -> SegMaskMode {
        self.seg_mask
    }

    pub fn modalities(&self) -> SensorModalities {
        self.modalities
    }

    /// Settings for the mask strategy of this configuration.
    pub fn mask_settings(&self, max_parallel: usize) -> MaskSettings {
        MaskSettings {
            mode: self.seg_mask,
            min_object_area: self.min_object_area,
            boxify: self.boxify,
            regen_masks: self.regen_masks,
            batch_size: self.mask_batch_size,
            max_parallel,
        }
    }
}

fn parse_cameras(names: &[String]) -> Result<Vec<CameraId>, ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::NoCameraChannels);
    }

    let mut cameras = Vec::with_capacity(names.len());
    for name in names {
        let camera =
            CameraId::from_str(name).map_err(|_| ConfigError::UnknownCamera(name.clone()))?;
        if !cameras.contains(&camera) {
            cameras.push(camera);
        }
    }
    Ok(cameras)
}

fn parse_pass_filters(tags: &[String]) -> Result<PassFilterSet, ConfigError> {
    let filters = tags
        .iter()
        .map(|tag| {
            PassFilter::from_str(tag).map_err(|_| {
                ConfigError::InvalidFilterTag(format!(
                    "'{}' is not one of day, night, rain",
                    tag
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    PassFilterSet::from_filters(&filters)
        .ok_or_else(|| ConfigError::InvalidFilterTag("at least one tag is required".to_string()))
}

fn check_ratio(
    field: &'static str,
    value: f64,
    valid: impl Fn(f64) -> bool,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if value.is_nan() || !valid(value) {
        return Err(ConfigError::InvalidRatio {
            field,
            value,
            expected,
        });
    }
    Ok(())
}
