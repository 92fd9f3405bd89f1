//! The districting MIP: assignment variables, balance constraints, and
//! flow-based contiguity, assembled into one [`MixedIntegerProgram`].

mod assignment;
mod contiguity;
mod program;

pub use assignment::AssignmentVars;
pub use contiguity::FlowStats;
pub use program::{MixedIntegerProgram, Row, RowTag, VarId, VarKind, Variable};

use tracing::info;

use crate::{
    balance::PopulationBounds,
    distance::DistanceMatrix,
    error::{DistrictingError, Result},
    graph::RegionGraph,
};

/// A fully built districting model for a single solve.
///
/// Owned by the caller of one solve; nothing survives between solves.
#[derive(Clone, Debug)]
pub struct DistrictingModel {
    program: MixedIntegerProgram,
    assignment: AssignmentVars,
    bounds: PopulationBounds,
    flows: FlowStats,
}

impl DistrictingModel {
    /// Validate inputs and build the complete model.
    ///
    /// Input problems (size mismatch, disconnected graph, more districts than
    /// regions, a region that fits no district) are reported before or
    /// instead of handing a doomed model to a solver.
    pub fn build(graph: &RegionGraph, distances: &DistanceMatrix, bounds: PopulationBounds, prune: bool) -> Result<Self> {
        let n = graph.node_count();
        let k = bounds.districts;

        if distances.size() != n {
            return Err(DistrictingError::InvalidGraph(format!(
                "distance matrix covers {} regions but the graph has {n}", distances.size()
            )));
        }
        if bounds.total != graph.total_population() {
            return Err(DistrictingError::InvalidGraph(format!(
                "bounds were computed for population {} but the graph totals {}", bounds.total, graph.total_population()
            )));
        }
        let components = graph.components().len();
        if components > 1 { return Err(DistrictingError::DisconnectedGraph { components }) }
        if k > n {
            return Err(DistrictingError::Infeasible(format!("{k} districts requested from only {n} regions")));
        }

        let eligible = assignment::eligible_pairs(graph, &bounds, prune);
        let mut program = MixedIntegerProgram::new();
        let assignment = assignment::build_assignment(&mut program, graph, distances, &bounds, &eligible)?;
        let flows = contiguity::build_contiguity(&mut program, graph, &assignment);

        info!(
            regions = n,
            districts = k,
            lower = bounds.lower,
            upper = bounds.upper,
            variables = program.num_variables(),
            rows = program.num_rows(),
            "built districting model"
        );
        Ok(Self { program, assignment, bounds, flows })
    }

    #[inline] pub fn program(&self) -> &MixedIntegerProgram { &self.program }

    #[inline] pub fn assignment(&self) -> &AssignmentVars { &self.assignment }

    #[inline] pub fn bounds(&self) -> &PopulationBounds { &self.bounds }

    #[inline] pub fn flows(&self) -> &FlowStats { &self.flows }
}
