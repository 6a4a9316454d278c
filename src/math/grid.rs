//! Bilinear interpolation over a rectilinear grid.
//!
//! The grid is the cartesian product of two strictly increasing axes; spacing
//! need not be regular. Values are stored row-per-age, column-per-time.
//! Queries outside the grid use the bilinear form of the nearest edge cell.

use nalgebra::DMatrix;

use crate::math::linear::{is_valid_axis, segment_index, segment_weight};

#[derive(Debug, Clone, PartialEq)]
pub struct RectilinearGrid {
    ages: Vec<f64>,
    times: Vec<f64>,
    values: DMatrix<f64>,
}

impl RectilinearGrid {
    /// Returns `None` unless both axes are valid and `values` is `ages x times`.
    pub fn new(ages: Vec<f64>, times: Vec<f64>, values: DMatrix<f64>) -> Option<Self> {
        if !is_valid_axis(&ages) || !is_valid_axis(&times) {
            return None;
        }
        if values.nrows() != ages.len() || values.ncols() != times.len() {
            return None;
        }
        Some(Self { ages, times, values })
    }

    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn eval(&self, age: f64, time: f64) -> f64 {
        let i = segment_index(&self.ages, age);
        let j = segment_index(&self.times, time);
        let u = segment_weight(&self.ages, i, age);
        let v = segment_weight(&self.times, j, time);

        let v00 = self.values[(i, j)];
        let v10 = self.values[(i + 1, j)];
        let v01 = self.values[(i, j + 1)];
        let v11 = self.values[(i + 1, j + 1)];

        (1.0 - u) * (1.0 - v) * v00 + u * (1.0 - v) * v10 + (1.0 - u) * v * v01 + u * v * v11
    }
}
