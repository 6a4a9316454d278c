//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`CovariateRecord`, `MeasurementRecord`, `Sex`)
//! - caller-supplied metadata and run configuration (`CovariateMeta`, `AssignConfig`)
//! - assignment outputs (`Assignment`, `RunSummary`, etc.)

pub mod types;

pub use types::*;
