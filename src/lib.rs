#![doc = "Districtor public API"]
mod balance;
mod config;
mod distance;
mod districting;
mod error;
mod graph;
mod model;
mod plan;
mod solver;

#[doc(inline)]
pub use balance::PopulationBounds;

#[doc(inline)]
pub use config::DistrictingConfig;

#[doc(inline)]
pub use distance::{DistanceMatrix, DistanceMetric, Metric, METERS_PER_MILE};

#[doc(inline)]
pub use districting::Districting;

#[cfg(feature = "highs")]
#[doc(inline)]
pub use districting::solve;

#[doc(inline)]
pub use error::{DistrictingError, Result};

#[doc(inline)]
pub use graph::{AttributeKeys, Centroid, Region, RegionGraph};

#[doc(inline)]
pub use model::{AssignmentVars, DistrictingModel, FlowStats, MixedIntegerProgram, Row, RowTag, VarId, VarKind, Variable};

#[doc(inline)]
pub use plan::{District, DistrictPlan, DistrictReport, PlanReport, SolutionStatus, ASSIGNMENT_THRESHOLD};

#[doc(inline)]
pub use solver::{MipSolver, SolverConfig, SolverOutcome, SolverStatus};

#[cfg(feature = "highs")]
#[doc(inline)]
pub use solver::HighsSolver;
