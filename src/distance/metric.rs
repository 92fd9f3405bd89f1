use geo::{Distance, Geodesic, Haversine};
use serde::{Deserialize, Serialize};

use crate::graph::Centroid;

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// A distance function between two centroids, in statute miles.
///
/// Implementations must be non-negative, symmetric, and zero for identical
/// points. `Sync` is required because matrix rows are computed in parallel.
pub trait DistanceMetric: Sync {
    fn distance(&self, a: &Centroid, b: &Centroid) -> f64;
}

/// Built-in great-circle metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Ellipsoidal (WGS-84) geodesic distance.
    #[default]
    Geodesic,
    /// Spherical great-circle distance on the mean earth radius.
    Haversine,
}

impl DistanceMetric for Metric {
    fn distance(&self, a: &Centroid, b: &Centroid) -> f64 {
        let meters = match self {
            Metric::Geodesic => Geodesic.distance(a.to_point(), b.to_point()),
            Metric::Haversine => Haversine.distance(a.to_point(), b.to_point()),
        };
        meters / METERS_PER_MILE
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geodesic" => Ok(Metric::Geodesic),
            "haversine" => Ok(Metric::Haversine),
            other => Err(format!("unknown distance metric '{other}'")),
        }
    }
}
