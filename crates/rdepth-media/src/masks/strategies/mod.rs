//! Mask strategy implementations.
//!
//! Each strategy corresponds to one mask policy and is selected once by
//! `MaskStrategyBuilder`.

mod bounding_box;
mod empty;
mod model_inference;

pub use bounding_box::BoundingBoxStrategy;
pub use empty::EmptyStrategy;
pub use model_inference::ModelInferenceStrategy;
