//! Adapters to external mixed-integer solvers.

#[cfg(feature = "highs")]
mod highs;

#[cfg(feature = "highs")]
pub use self::highs::HighsSolver;

use serde::{Deserialize, Serialize};

use crate::{error::Result, model::MixedIntegerProgram};

/// Settings passed through to the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative and absolute optimality gap; `0.0` certifies global optimality.
    pub mip_gap: f64,
    /// Wall-clock limit in seconds.
    pub time_limit: Option<f64>,
    /// Number of solver threads.
    pub threads: Option<u32>,
    /// Let the solver print its own log.
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { mip_gap: 0.0, time_limit: None, threads: None, verbose: false }
    }
}

/// Terminal state reported by a solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverStatus {
    /// Certified optimal within the configured gap.
    Optimal,
    Infeasible,
    Unbounded,
    /// Stopped by a time or iteration limit; values hold the incumbent, if any.
    Limit,
    /// Anything else, with the solver's own description.
    Error(String),
}

/// Values returned by a solver, indexed like the program's variables.
#[derive(Clone, Debug)]
pub struct SolverOutcome {
    pub status: SolverStatus,
    pub values: Vec<f64>,
    pub objective: f64,
}

/// A black-box MIP solver: binary and continuous columns, ranged linear
/// rows, a linear objective to minimize.
pub trait MipSolver {
    fn solve(&self, program: &MixedIntegerProgram, config: &SolverConfig) -> Result<SolverOutcome>;
}
