use std::path::PathBuf;

/// Result type for districting operations.
pub type Result<T> = std::result::Result<T, DistrictingError>;

/// Errors raised while validating input, building the model, or solving it.
#[derive(Debug, thiserror::Error)]
pub enum DistrictingError {
    #[error("region '{region}' has an invalid centroid (lat={lat}, lon={lon})")]
    InvalidCoordinate { region: String, lat: f64, lon: f64 },

    #[error("region '{region}' has an invalid population: {reason}")]
    InvalidPopulation { region: String, reason: String },

    #[error("distance metric returned {value} between '{from}' and '{to}'")]
    InvalidDistance { from: String, to: String, value: f64 },

    #[error("invalid region graph: {0}")]
    InvalidGraph(String),

    #[error("region graph is disconnected ({components} components)")]
    DisconnectedGraph { components: usize },

    #[error("district count must be at least 1, got {0}")]
    InvalidDistrictCount(usize),

    #[error("deviation must lie in [0, 2), got {0}")]
    InvalidDeviation(f64),

    #[error("population bounds collapsed: lower {lower} exceeds upper {upper}")]
    InfeasibleThresholds { lower: u64, upper: u64 },

    #[error("no feasible districting exists: {0}")]
    Infeasible(String),

    #[error("solver reported an unbounded model")]
    Unbounded,

    #[error("solver stopped at its limit without a feasible districting")]
    NoSolutionWithinLimit,

    #[error("solver failure: {0}")]
    SolverError(String),

    #[error("plan failed validation: {0}")]
    InvalidPlan(String),

    #[error("failed to access {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DistrictingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = DistrictingError::InvalidCoordinate { region: "01001".into(), lat: 91.0, lon: 0.0 };
        assert_eq!(err.to_string(), "region '01001' has an invalid centroid (lat=91, lon=0)");

        let err = DistrictingError::InfeasibleThresholds { lower: 334, upper: 333 };
        assert!(err.to_string().contains("334"));
    }
}
