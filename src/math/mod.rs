//! Mathematical utilities: piecewise-linear interpolation and nearest-point search.

pub mod grid;
pub mod kdtree;
pub mod linear;

pub use grid::*;
pub use kdtree::*;
pub use linear::*;
