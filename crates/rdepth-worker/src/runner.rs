//! End-to-end run: load inputs, resolve scenes, write JSON lines.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use rdepth_media::MaskStrategyBuilder;
use rdepth_ml_client::SegmentationClient;
use rdepth_models::{SceneDescriptor, SensorTopologyTable};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::config::WorkerConfig;
use crate::error::{ConfigError, WorkerError, WorkerResult};
use crate::filter_config::FilterConfiguration;
use crate::metrics;
use crate::options::RawFilterOptions;
use crate::pipeline::SampleFilterPipeline;
use crate::resolver::SceneResolver;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scenes: usize,
    pub samples: usize,
    pub admitted: usize,
    pub rejected: usize,
    pub skipped: usize,
}

/// Build the resolver for validated options.
///
/// The maskrcnn policy needs `segmentation_url`. An unhealthy service is
/// logged but does not stop the run; failed batches surface per sample.
pub async fn build_resolver(
    config: &WorkerConfig,
    options: RawFilterOptions,
) -> WorkerResult<SceneResolver> {
    let filter = FilterConfiguration::build(options)?;
    let topology = SensorTopologyTable::nuscenes().map_err(ConfigError::from)?;

    let mut builder = MaskStrategyBuilder::for_policy(filter.mask_policy())
        .with_settings(filter.mask_settings(config.max_mask_parallel));

    if filter.mask_policy().requires_model() {
        let url = config.segmentation_url.as_deref().ok_or_else(|| {
            WorkerError::config_error("RDEPTH_SEGMENTATION_URL is required for the maskrcnn policy")
        })?;
        let client = SegmentationClient::new(url, config.request_timeout)?;
        match client.health().await {
            Ok(true) => info!(url = %client.base_url(), "Using segmentation service"),
            Ok(false) => warn!(url = %client.base_url(), "Segmentation service reports unhealthy"),
            Err(e) => warn!(url = %client.base_url(), error = %e, "Segmentation service health check failed"),
        }
        builder = builder.with_model(Arc::new(client));
    }

    let strategy = builder.build()?;
    info!(
        policy = %filter.mask_policy(),
        strategy = strategy.name(),
        cameras = ?filter.camera_channels(),
        pass_filters = %filter.pass_filters(),
        version = %filter.nuscenes_version(),
        topology_cameras = topology.len(),
        "Resolver ready"
    );

    let pipeline = SampleFilterPipeline::new(Arc::new(filter), Arc::new(topology));
    Ok(SceneResolver::new(pipeline, strategy, config.max_scene_parallel))
}

/// Load scene descriptors from a JSON array.
pub async fn load_scenes(path: &Path) -> WorkerResult<Vec<SceneDescriptor>> {
    let json = tokio::fs::read_to_string(path).await?;
    let scenes: Vec<SceneDescriptor> = serde_json::from_str(&json)?;
    Ok(scenes)
}

/// Resolve `scenes` and write one JSON line per resolved sample.
///
/// Recoverable sample failures are logged and skipped; anything else stops
/// the run.
pub async fn resolve_to_writer<W>(
    resolver: &SceneResolver,
    scenes: Vec<SceneDescriptor>,
    seed: u64,
    out: &mut W,
) -> WorkerResult<RunSummary>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = RunSummary {
        scenes: scenes.len(),
        ..RunSummary::default()
    };

    let stream = resolver.resolve_scenes(scenes, seed);
    futures::pin_mut!(stream);

    while let Some(result) = stream.next().await {
        summary.samples += 1;
        match result {
            Ok(sample) => {
                if sample.admitted {
                    summary.admitted += 1;
                } else {
                    summary.rejected += 1;
                }
                let mut line = serde_json::to_vec(&sample)?;
                line.push(b'\n');
                out.write_all(&line).await?;
            }
            Err(e) if e.is_recoverable() => {
                metrics::record_sample_failed(true);
                warn!(error = %e, "Skipping sample");
                summary.skipped += 1;
            }
            Err(e) => {
                metrics::record_sample_failed(false);
                return Err(e.into());
            }
        }
    }

    out.flush().await?;
    Ok(summary)
}

/// Run the worker for `config`.
pub async fn run(config: &WorkerConfig) -> WorkerResult<RunSummary> {
    let options = match &config.options_path {
        Some(path) => RawFilterOptions::from_file(path).await?,
        None => RawFilterOptions::default(),
    };
    let resolver = build_resolver(config, options).await?;

    let scenes = load_scenes(&config.scenes_path).await?;
    let scenes = resolver.select_scenes(scenes, config.seed);
    info!(scenes = scenes.len(), seed = config.seed, "Resolving scenes");

    let summary = match &config.output_path {
        Some(path) => {
            let file = tokio::fs::File::create(path).await?;
            let mut out = BufWriter::new(file);
            resolve_to_writer(&resolver, scenes, config.seed, &mut out).await?
        }
        None => {
            let mut out = BufWriter::new(tokio::io::stdout());
            resolve_to_writer(&resolver, scenes, config.seed, &mut out).await?
        }
    };

    info!(
        scenes = summary.scenes,
        samples = summary.samples,
        admitted = summary.admitted,
        rejected = summary.rejected,
        skipped = summary.skipped,
        "Run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_maskrcnn_requires_url() {
        let config = WorkerConfig::new("scenes.json");
        let options = RawFilterOptions {
            how_to_gen_masks: "maskrcnn".into(),
            ..RawFilterOptions::default()
        };
        let err = build_resolver(&config, options).await.err().unwrap();
        assert!(matches!(err, WorkerError::ConfigError(ref msg) if msg.contains("RDEPTH_SEGMENTATION_URL")));
    }

    #[tokio::test]
    async fn test_invalid_options_surface_as_config_error() {
        let config = WorkerConfig::new("scenes.json");
        let options = RawFilterOptions {
            speed_bound: vec![5.0, 1.0],
            ..RawFilterOptions::default()
        };
        let err = build_resolver(&config, options).await.err().unwrap();
        assert!(matches!(err, WorkerError::Options(ConfigError::InvalidBound { .. })));
    }

    #[tokio::test]
    async fn test_load_scenes_missing_file() {
        let err = load_scenes(Path::new("/nonexistent/scenes.json")).await.unwrap_err();
        assert!(matches!(err, WorkerError::Io(_)));
    }
}
