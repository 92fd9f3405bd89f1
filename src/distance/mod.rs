//! Pairwise centroid distances.
//!
//! All distances are statute miles.

mod matrix;
mod metric;

pub use matrix::DistanceMatrix;
pub use metric::{DistanceMetric, Metric, METERS_PER_MILE};
