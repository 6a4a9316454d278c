//! Covariate column transforms.
//!
//! Transforms are small, pure functions so that the pipeline can apply any
//! number of them to one assigned column.

pub mod transform;

pub use transform::*;
