use serde::Serialize;

use crate::error::{DistrictingError, Result};

/// Population band `[lower, upper]` every district must fall within.
///
/// With total population `P`, `k` districts and deviation `d`:
///
/// ```text
/// lower = ceil((1 - d/2) * P / k)
/// upper = floor((1 + d/2) * P / k)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PopulationBounds {
    pub lower: u64,
    pub upper: u64,
    pub total: u64,
    pub districts: usize,
    pub deviation: f64,
}

impl PopulationBounds {
    pub fn new(total: u64, districts: usize, deviation: f64) -> Result<Self> {
        if districts == 0 { return Err(DistrictingError::InvalidDistrictCount(districts)) }
        if !deviation.is_finite() || !(0.0..2.0).contains(&deviation) {
            return Err(DistrictingError::InvalidDeviation(deviation));
        }

        let k = districts as f64;
        let p = total as f64;
        let lower = ((1.0 - deviation / 2.0) * p / k).ceil() as u64;
        let upper = ((1.0 + deviation / 2.0) * p / k).floor() as u64;

        if lower > upper { return Err(DistrictingError::InfeasibleThresholds { lower, upper }) }

        Ok(Self { lower, upper, total, districts, deviation })
    }

    /// Ideal (unrounded) district population `P / k`.
    #[inline] pub fn ideal(&self) -> f64 { self.total as f64 / self.districts as f64 }

    /// True if `population` lies within `[lower, upper]`.
    #[inline] pub fn contains(&self, population: u64) -> bool { (self.lower..=self.upper).contains(&population) }
}
