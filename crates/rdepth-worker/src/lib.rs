//! Sensor association and sample filtering worker.
//!
//! This crate provides:
//! - Flat filter options and their validated configuration
//! - The per-sample filtering pipeline (weather, keyframe, speed, radar
//!   association, stationary filtering, probabilistic object removal)
//! - Scene subset selection with seeded random sources
//! - A scene resolver that attaches object masks and streams results
//! - The `rdepth-worker` binary entry points

pub mod config;
pub mod error;
pub mod filter_config;
pub mod logging;
pub mod metrics;
pub mod options;
pub mod pipeline;
pub mod resolver;
pub mod runner;

pub use config::WorkerConfig;
pub use error::{ConfigError, ResolveError, SampleError, WorkerError, WorkerResult};
pub use filter_config::{FilterConfiguration, SpeedBound};
pub use logging::SceneLogger;
pub use options::RawFilterOptions;
pub use pipeline::{scene_rng, select_scene_subset, SampleFilterPipeline, ScreenedSample};
pub use resolver::{SampleResult, SceneResolver};
pub use runner::{build_resolver, load_scenes, resolve_to_writer, run, RunSummary};
