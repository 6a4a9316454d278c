//! Covariate data held in memory for one assignment pass.

pub mod dataset;

pub use dataset::*;
