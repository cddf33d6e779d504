//! Builder selecting the mask strategy for a policy.
//!
//! The policy is resolved once per run; per-sample code only ever sees the
//! resulting `MaskStrategy`.
//!
//! - `EmptyStrategy` - all-zero masks (`black`)
//! - `BoundingBoxStrategy` - rasterized object geometry (`bbox`)
//! - `ModelInferenceStrategy` - segmentation model with disk cache (`maskrcnn`)

use std::sync::Arc;

use rdepth_models::MaskPolicy;
use tracing::info;

use super::strategies::{BoundingBoxStrategy, EmptyStrategy, ModelInferenceStrategy};
use super::strategy::{MaskSettings, MaskStrategy};
use crate::error::{MaskError, MaskResult};
use crate::segmentation::SegmentationModel;

/// Builder for creating mask strategies based on policy.
///
/// # Example
///
/// ```ignore
/// let strategy = MaskStrategyBuilder::for_policy(MaskPolicy::ModelInference)
///     .with_settings(settings)
///     .with_model(Arc::new(client))
///     .build()?;
/// let masks = strategy.resolve_batch(&requests).await;
/// ```
pub struct MaskStrategyBuilder {
    policy: MaskPolicy,
    settings: MaskSettings,
    model: Option<Arc<dyn SegmentationModel>>,
}

impl MaskStrategyBuilder {
    /// Create a builder for the specified policy.
    pub fn for_policy(policy: MaskPolicy) -> Self {
        Self {
            policy,
            settings: MaskSettings::default(),
            model: None,
        }
    }

    pub fn with_settings(mut self, settings: MaskSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Segmentation backend; required by `maskrcnn`, ignored otherwise.
    pub fn with_model(mut self, model: Arc<dyn SegmentationModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the mask strategy.
    pub fn build(self) -> MaskResult<Arc<dyn MaskStrategy>> {
        match self.policy {
            MaskPolicy::Empty => {
                info!("Building empty mask strategy");
                Ok(Arc::new(EmptyStrategy))
            }
            MaskPolicy::BoundingBox => {
                info!(mode = %self.settings.mode, "Building bounding-box mask strategy");
                Ok(Arc::new(BoundingBoxStrategy::new(self.settings)))
            }
            MaskPolicy::ModelInference => {
                if self.settings.batch_size == 0 {
                    return Err(MaskError::invalid_config("batch size must be at least 1"));
                }
                if self.settings.max_parallel == 0 {
                    return Err(MaskError::invalid_config(
                        "max parallel model calls must be at least 1",
                    ));
                }
                let model = self.model.ok_or_else(|| {
                    MaskError::invalid_config("maskrcnn policy requires a segmentation model")
                })?;

                info!(
                    model = model.name(),
                    batch_size = self.settings.batch_size,
                    max_parallel = self.settings.max_parallel,
                    regen = self.settings.regen_masks,
                    "Building model-inference mask strategy"
                );
                Ok(Arc::new(ModelInferenceStrategy::new(model, self.settings)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::InstanceMask;
    use async_trait::async_trait;
    use rdepth_models::MaskSource;
    use std::path::PathBuf;

    struct NullModel;

    #[async_trait]
    impl SegmentationModel for NullModel {
        async fn segment(&self, images: &[PathBuf]) -> MaskResult<Vec<Vec<InstanceMask>>> {
            Ok(vec![Vec::new(); images.len()])
        }

        fn name(&self) -> &'static str {
            "null"
        }
    }

    #[test]
    fn test_builder_empty() {
        let strategy = MaskStrategyBuilder::for_policy(MaskPolicy::Empty)
            .build()
            .unwrap();
        assert_eq!(strategy.source(), MaskSource::Empty);
        assert_eq!(strategy.name(), "empty");
    }

    #[test]
    fn test_builder_bounding_box() {
        let strategy = MaskStrategyBuilder::for_policy(MaskPolicy::BoundingBox)
            .build()
            .unwrap();
        assert_eq!(strategy.source(), MaskSource::BoundingBox);
        assert_eq!(strategy.name(), "bounding_box");
    }

    #[test]
    fn test_builder_model_inference() {
        let strategy = MaskStrategyBuilder::for_policy(MaskPolicy::ModelInference)
            .with_model(Arc::new(NullModel))
            .build()
            .unwrap();
        assert_eq!(strategy.source(), MaskSource::ModelInference);
        assert_eq!(strategy.name(), "model_inference");
    }

    #[test]
    fn test_model_inference_requires_model() {
        let err = MaskStrategyBuilder::for_policy(MaskPolicy::ModelInference)
            .build()
            .err()
            .unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_model_inference_rejects_zero_batch() {
        let err = MaskStrategyBuilder::for_policy(MaskPolicy::ModelInference)
            .with_settings(MaskSettings {
                batch_size: 0,
                ..MaskSettings::default()
            })
            .with_model(Arc::new(NullModel))
            .build()
            .err()
            .unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_all_policies_can_build_with_model() {
        for policy in MaskPolicy::ALL {
            let result = MaskStrategyBuilder::for_policy(*policy)
                .with_model(Arc::new(NullModel))
                .build();
            assert!(result.is_ok(), "Failed to build strategy for {:?}", policy);
        }
    }
}
