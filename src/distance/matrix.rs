use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    distance::DistanceMetric,
    error::{DistrictingError, Result},
    graph::RegionGraph,
};

/// A dense, symmetric n×n matrix of centroid distances in miles.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    data: Array2<f64>,
}

impl DistanceMatrix {
    /// Compute pairwise distances between all region centroids.
    ///
    /// Only the upper triangle is evaluated and then mirrored, so the result
    /// is symmetric with a zero diagonal regardless of the metric's rounding.
    pub fn build<M: DistanceMetric + ?Sized>(graph: &RegionGraph, metric: &M) -> Result<Self> {
        if let Some(region) = graph.regions().iter().find(|r| !r.centroid.is_valid()) {
            return Err(DistrictingError::InvalidCoordinate {
                region: region.id.clone(),
                lat: region.centroid.lat,
                lon: region.centroid.lon,
            });
        }

        let n = graph.node_count();
        let regions = graph.regions();
        let rows = (0..n).into_par_iter()
            .map(|i| {
                (i + 1..n)
                    .map(|j| metric.distance(&regions[i].centroid, &regions[j].centroid))
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<_>>();

        let mut data = Array2::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, d) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                if !d.is_finite() || d < 0.0 {
                    return Err(DistrictingError::InvalidDistance {
                        from: regions[i].id.clone(),
                        to: regions[j].id.clone(),
                        value: d,
                    });
                }
                data[[i, j]] = d;
                data[[j, i]] = d;
            }
        }

        debug!(regions = n, "built distance matrix");
        Ok(Self { data })
    }

    /// Wrap an explicit matrix, which must be square, symmetric, non-negative
    /// and zero on the diagonal.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(DistrictingError::InvalidGraph(format!("distance matrix is {rows}x{cols}, not square")));
        }
        for ((i, j), &d) in data.indexed_iter() {
            let valid = d.is_finite() && d >= 0.0 && (i != j || d == 0.0) && d == data[[j, i]];
            if !valid {
                return Err(DistrictingError::InvalidDistance { from: i.to_string(), to: j.to_string(), value: d });
            }
        }
        Ok(Self { data })
    }

    /// Distance between regions `i` and `j`.
    #[inline] pub fn get(&self, i: usize, j: usize) -> f64 { self.data[[i, j]] }

    /// Squared distance between regions `i` and `j`.
    #[inline]
    pub fn squared(&self, i: usize, j: usize) -> f64 {
        let d = self.get(i, j);
        d * d
    }

    /// Number of regions covered by this matrix.
    #[inline] pub fn size(&self) -> usize { self.data.nrows() }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.data.indexed_iter().all(|((i, j), &d)| (d - self.data[[j, i]]).abs() <= tol)
    }
}
