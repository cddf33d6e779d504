//! Enumerated filter options.
//!
//! String-valued options from the flat option mapping are parsed into these
//! closed sets once, at configuration time:
//!
//! - `PassFilter`: `day`, `night`, `rain`
//! - `MaskPolicy`: `maskrcnn`, `bbox`, `black`
//! - `SegMaskMode`: `none`, `mono`, `color`
//! - `NuscenesVersion`: `v1.0-mini`, `v1.0-trainval`, `v1.0-test`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an option string is outside its enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {option} value: {value}")]
pub struct OptionParseError {
    pub option: &'static str,
    pub value: String,
}

impl OptionParseError {
    fn new(option: &'static str, value: &str) -> Self {
        Self {
            option,
            value: value.to_string(),
        }
    }
}

/// Weather/time-of-day tag used to admit scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PassFilter {
    Day,
    Night,
    Rain,
}

impl PassFilter {
    pub const ALL: &'static [PassFilter] = &[PassFilter::Day, PassFilter::Night, PassFilter::Rain];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassFilter::Day => "day",
            PassFilter::Night => "night",
            PassFilter::Rain => "rain",
        }
    }
}

impl fmt::Display for PassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PassFilter {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(PassFilter::Day),
            "night" => Ok(PassFilter::Night),
            "rain" => Ok(PassFilter::Rain),
            _ => Err(OptionParseError::new("pass filter", s)),
        }
    }
}

/// Non-empty subset of {day, night, rain}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PassFilterSet {
    pub day: bool,
    pub night: bool,
    pub rain: bool,
}

impl PassFilterSet {
    /// Set admitting every scene.
    pub fn all() -> Self {
        Self {
            day: true,
            night: true,
            rain: true,
        }
    }

    /// Collect tags into a set. Returns `None` for an empty input.
    pub fn from_filters(filters: &[PassFilter]) -> Option<Self> {
        if filters.is_empty() {
            return None;
        }
        Some(Self {
            day: filters.contains(&PassFilter::Day),
            night: filters.contains(&PassFilter::Night),
            rain: filters.contains(&PassFilter::Rain),
        })
    }

    pub fn contains(&self, filter: PassFilter) -> bool {
        match filter {
            PassFilter::Day => self.day,
            PassFilter::Night => self.night,
            PassFilter::Rain => self.rain,
        }
    }

    /// Tags in canonical order.
    pub fn filters(&self) -> Vec<PassFilter> {
        PassFilter::ALL
            .iter()
            .copied()
            .filter(|f| self.contains(*f))
            .collect()
    }
}

impl fmt::Display for PassFilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.filters().iter().map(PassFilter::as_str).collect();
        write!(f, "{{{}}}", names.join(","))
    }
}

/// How per-object masks are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaskPolicy {
    /// Segmentation model inference, cached on disk next to the images.
    #[serde(rename = "maskrcnn")]
    ModelInference,
    /// Masks rasterized from annotated geometry.
    #[serde(rename = "bbox")]
    BoundingBox,
    /// All-zero masks.
    #[default]
    #[serde(rename = "black")]
    Empty,
}

impl MaskPolicy {
    pub const ALL: &'static [MaskPolicy] = &[
        MaskPolicy::ModelInference,
        MaskPolicy::BoundingBox,
        MaskPolicy::Empty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaskPolicy::ModelInference => "maskrcnn",
            MaskPolicy::BoundingBox => "bbox",
            MaskPolicy::Empty => "black",
        }
    }

    /// Returns true if this policy needs an external segmentation model.
    pub fn requires_model(&self) -> bool {
        matches!(self, MaskPolicy::ModelInference)
    }
}

impl fmt::Display for MaskPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MaskPolicy {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maskrcnn" => Ok(MaskPolicy::ModelInference),
            "bbox" => Ok(MaskPolicy::BoundingBox),
            "black" => Ok(MaskPolicy::Empty),
            _ => Err(OptionParseError::new("mask policy", s)),
        }
    }
}

/// Encoding of segmentation masks handed to training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegMaskMode {
    /// No masks are produced.
    #[default]
    None,
    /// Binary mask, 255 on any instance.
    Mono,
    /// One gray level per instance (1, 2, ...).
    Color,
}

impl SegMaskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegMaskMode::None => "none",
            SegMaskMode::Mono => "mono",
            SegMaskMode::Color => "color",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, SegMaskMode::None)
    }
}

impl fmt::Display for SegMaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SegMaskMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SegMaskMode::None),
            "mono" => Ok(SegMaskMode::Mono),
            "color" => Ok(SegMaskMode::Color),
            _ => Err(OptionParseError::new("seg mask mode", s)),
        }
    }
}

/// nuScenes release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum NuscenesVersion {
    #[default]
    #[serde(rename = "v1.0-mini")]
    Mini,
    #[serde(rename = "v1.0-trainval")]
    TrainVal,
    #[serde(rename = "v1.0-test")]
    Test,
}

impl NuscenesVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            NuscenesVersion::Mini => "v1.0-mini",
            NuscenesVersion::TrainVal => "v1.0-trainval",
            NuscenesVersion::Test => "v1.0-test",
        }
    }
}

impl fmt::Display for NuscenesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NuscenesVersion {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "v1.0-mini" => Ok(NuscenesVersion::Mini),
            "v1.0-trainval" => Ok(NuscenesVersion::TrainVal),
            "v1.0-test" => Ok(NuscenesVersion::Test),
            _ => Err(OptionParseError::new("nuscenes version", s)),
        }
    }
}
