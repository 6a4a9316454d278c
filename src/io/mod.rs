//! Input/output helpers.
//!
//! - CSV ingest of covariate and measurement tables (`ingest`)
//! - CSV export with the assigned columns appended (`export`)
//! - run summary JSON (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
