//! Normalized in-memory covariate data for one location and one covariate.
//!
//! No interpolation happens here. The dataset validates records against the
//! caller's metadata once, then exposes the sorted distinct axes, the grid
//! extent and the age coverage that every later stage reads.

use log::debug;

use crate::domain::{AgeBucket, CovariateMeta, CovariateRecord, Sex};
use crate::error::ConfigurationError;

/// Midpoints closer than this are treated as the same grid line.
pub const AXIS_EPS: f64 = 1e-9;

/// One `(age, time, value)` point fed to an interpolator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// `None` for a covariate that is not age-specific.
    pub age: Option<f64>,
    pub time: f64,
    pub value: f64,
}

/// Ages covered by the covariate, as a union of half-open buckets.
///
/// Gaps between buckets are kept: `[5, 15) ∪ [30, 80)` does not cover 20.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgeCoverage {
    intervals: Vec<AgeBucket>,
}

impl AgeCoverage {
    /// Merge buckets into disjoint, sorted intervals. Touching buckets join.
    pub fn from_buckets(mut buckets: Vec<AgeBucket>) -> Self {
        buckets.sort_by(|a, b| a.lower.total_cmp(&b.lower).then(a.upper.total_cmp(&b.upper)));
        let mut intervals: Vec<AgeBucket> = Vec::with_capacity(buckets.len());
        for b in buckets {
            match intervals.last_mut() {
                Some(last) if b.lower <= last.upper => last.upper = last.upper.max(b.upper),
                _ => intervals.push(b),
            }
        }
        Self { intervals }
    }

    /// Buckets implied by sorted distinct midpoints: edges sit half-way between
    /// neighbours and the outer edges mirror the nearest inner half-width.
    ///
    /// A single midpoint has no neighbour to size its bucket, so the coverage
    /// is left unknown (empty).
    pub fn from_midpoints(midpoints: &[f64]) -> Self {
        match midpoints {
            [] | [_] => Self::default(),
            _ => {
                let n = midpoints.len();
                let mut edges = Vec::with_capacity(n + 1);
                edges.push(midpoints[0] - 0.5 * (midpoints[1] - midpoints[0]));
                for w in midpoints.windows(2) {
                    edges.push(0.5 * (w[0] + w[1]));
                }
                edges.push(midpoints[n - 1] + 0.5 * (midpoints[n - 1] - midpoints[n - 2]));
                let buckets = edges.windows(2).map(|e| AgeBucket::new(e[0], e[1])).collect();
                Self::from_buckets(buckets)
            }
        }
    }

    pub fn intervals(&self) -> &[AgeBucket] {
        &self.intervals
    }

    /// No bucket is known, so no age can be ruled out.
    pub fn is_unknown(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether the measurement ages `[lower, upper)` touch any covered bucket.
    pub fn overlaps(&self, lower: f64, upper: f64) -> bool {
        self.intervals
            .iter()
            .any(|b| half_open_overlap(b.lower, b.upper, lower, upper))
    }
}

/// Overlap of `[a_lo, a_hi)` and `[b_lo, b_hi)`; a zero-width interval is a point.
fn half_open_overlap(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> bool {
    let a_point = a_lo >= a_hi;
    let b_point = b_lo >= b_hi;
    match (a_point, b_point) {
        (false, false) => a_lo < b_hi && b_lo < a_hi,
        (true, false) => b_lo <= a_lo && a_lo < b_hi,
        (false, true) => a_lo <= b_lo && b_lo < a_hi,
        (true, true) => a_lo == b_lo,
    }
}

/// Summary of the covariate's grid, built once and shared by all interpolators.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    /// Distinct sorted age midpoints; empty when the covariate is not by age.
    pub ages: Vec<f64>,
    /// Distinct sorted time midpoints.
    pub times: Vec<f64>,
    pub by_age: bool,
    pub by_sex: bool,
    pub age_coverage: AgeCoverage,
}

impl GridDescriptor {
    /// Number of distinct age midpoints; a non-age-specific covariate counts as one bucket.
    pub fn n_ages(&self) -> usize {
        self.ages.len().max(1)
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    /// `(min, max)` age midpoint, `None` when the covariate is not by age.
    pub fn age_extent(&self) -> Option<(f64, f64)> {
        Some((*self.ages.first()?, *self.ages.last()?))
    }

    pub fn time_extent(&self) -> (f64, f64) {
        match (self.times.first(), self.times.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (f64::NAN, f64::NAN),
        }
    }
}

/// Sort and collapse values into distinct grid lines.
pub fn distinct_sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup_by(|a, b| (*a - *b).abs() <= AXIS_EPS);
    out
}

#[derive(Debug, Clone)]
pub struct CovariateDataset {
    records: Vec<CovariateRecord>,
    meta: CovariateMeta,
    grid: GridDescriptor,
}

impl CovariateDataset {
    pub fn new(records: Vec<CovariateRecord>, meta: CovariateMeta) -> Result<Self, ConfigurationError> {
        if records.is_empty() {
            return Err(ConfigurationError::EmptyDataset);
        }

        for (index, r) in records.iter().enumerate() {
            let age_ok = r.age_midpoint.is_none_or(f64::is_finite);
            if !(age_ok && r.time_midpoint.is_finite() && r.value.is_finite()) {
                return Err(ConfigurationError::NonFiniteRecord { index });
            }
            if meta.by_age && r.age_midpoint.is_none() {
                return Err(ConfigurationError::MissingAge { index });
            }
            if meta.by_sex && r.sex == Sex::Both {
                return Err(ConfigurationError::BothSexInBySexCovariate { index });
            }
        }

        if meta.by_sex {
            for sex in [Sex::Female, Sex::Male] {
                if !records.iter().any(|r| r.sex == sex) {
                    return Err(ConfigurationError::MissingSex(sex));
                }
            }
        }

        let grid = describe(&records, meta);
        debug!(
            "covariate grid: {} age(s), {} time(s), by_age={}, by_sex={}",
            grid.n_ages(),
            grid.n_times(),
            grid.by_age,
            grid.by_sex
        );

        Ok(Self { records, meta, grid })
    }

    pub fn records(&self) -> &[CovariateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn meta(&self) -> CovariateMeta {
        self.meta
    }

    pub fn grid(&self) -> &GridDescriptor {
        &self.grid
    }

    pub fn by_age(&self) -> bool {
        self.meta.by_age
    }

    pub fn by_sex(&self) -> bool {
        self.meta.by_sex
    }

    /// Points an interpolator for `sex` is fit on.
    ///
    /// A covariate that is not by sex returns every record for any `sex`.
    /// A by-sex covariate has no `Both` records, so `Both` yields nothing.
    pub fn values_for(&self, sex: Sex) -> impl Iterator<Item = GridPoint> + '_ {
        let by_sex = self.meta.by_sex;
        let by_age = self.meta.by_age;
        self.records
            .iter()
            .filter(move |r| !by_sex || r.sex == sex)
            .map(move |r| GridPoint {
                age: if by_age { r.age_midpoint } else { None },
                time: r.time_midpoint,
                value: r.value,
            })
    }
}

fn describe(records: &[CovariateRecord], meta: CovariateMeta) -> GridDescriptor {
    let ages = if meta.by_age {
        distinct_sorted(records.iter().filter_map(|r| r.age_midpoint))
    } else {
        Vec::new()
    };
    let times = distinct_sorted(records.iter().map(|r| r.time_midpoint));

    let age_coverage = if !meta.by_age {
        AgeCoverage::default()
    } else if records.iter().all(|r| r.age_bucket.is_some()) {
        AgeCoverage::from_buckets(records.iter().filter_map(|r| r.age_bucket).collect())
    } else {
        debug!("covariate has no age bucket bounds; deriving buckets from midpoints");
        AgeCoverage::from_midpoints(&ages)
    };

    GridDescriptor {
        ages,
        times,
        by_age: meta.by_age,
        by_sex: meta.by_sex,
        age_coverage,
    }
}
