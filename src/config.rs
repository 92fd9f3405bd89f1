use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    distance::Metric,
    error::{DistrictingError, Result},
    graph::AttributeKeys,
    solver::SolverConfig,
};

/// Everything a solve needs besides the graph itself.
///
/// ```toml
/// districts = 7
/// deviation = 0.01
/// metric = "haversine"
///
/// [solver]
/// time_limit = 600.0
///
/// [keys]
/// population = "TOTPOP"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistrictingConfig {
    pub districts: usize,
    pub deviation: f64,
    /// Drop assignment pairs that cannot fit under the upper bound.
    pub prune: bool,
    pub metric: Metric,
    pub solver: SolverConfig,
    pub keys: AttributeKeys,
}

impl Default for DistrictingConfig {
    fn default() -> Self {
        Self {
            districts: 1,
            deviation: 0.0,
            prune: true,
            metric: Metric::default(),
            solver: SolverConfig::default(),
            keys: AttributeKeys::default(),
        }
    }
}

impl DistrictingConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DistrictingError::Config(e.to_string()))
    }

    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DistrictingError::io(path, e))?;
        Self::from_toml_str(&text)
    }
}
