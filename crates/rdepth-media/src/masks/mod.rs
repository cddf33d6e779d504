//! Mask resolution strategies.
//!
//! The mask policy is resolved to one strategy at configuration time:
//!
//! | Policy | Strategy | Source |
//! |--------|----------|--------|
//! | `maskrcnn` | `ModelInferenceStrategy` | Segmentation model, cached on disk |
//! | `bbox` | `BoundingBoxStrategy` | Annotated geometry |
//! | `black` | `EmptyStrategy` | All-zero mask |
//!
//! Use `MaskStrategyBuilder` to create the strategy for a policy.

pub mod strategies;
pub mod strategy;
pub mod strategy_builder;

pub use strategies::{BoundingBoxStrategy, EmptyStrategy, ModelInferenceStrategy};
pub use strategy::{MaskRequest, MaskSettings, MaskStrategy, ObjectMask};
pub use strategy_builder::MaskStrategyBuilder;
