//! Covariate value assignment.
//!
//! Responsibilities:
//!
//! - nearest-neighbour lookup in (age, time, sex) space (`nearest`)
//! - per-sex linear interpolation over the (age, time) grid (`interpolator`, `sex`)
//! - the missing/extrapolate decision per row (`range`)
//! - building once and evaluating every row (`orchestrator`)

pub mod interpolator;
pub mod nearest;
pub mod orchestrator;
pub mod range;
pub mod sex;

pub use interpolator::*;
pub use nearest::*;
pub use orchestrator::*;
pub use range::*;
pub use sex::*;
