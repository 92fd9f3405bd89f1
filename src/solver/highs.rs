use ::highs::{Col, HighsModelStatus, RowProblem, Sense};
use tracing::{debug, info, warn};

use crate::{
    error::{DistrictingError, Result},
    model::{MixedIntegerProgram, VarKind},
    solver::{MipSolver, SolverConfig, SolverOutcome, SolverStatus},
};

/// Solves programs with the HiGHS branch-and-cut MIP solver.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighsSolver;

impl MipSolver for HighsSolver {
    fn solve(&self, program: &MixedIntegerProgram, config: &SolverConfig) -> Result<SolverOutcome> {
        if !config.mip_gap.is_finite() || config.mip_gap < 0.0 {
            return Err(DistrictingError::Config(format!("mip_gap must be non-negative, got {}", config.mip_gap)));
        }

        let mut problem = RowProblem::new();
        let cols = program.variables().iter()
            .map(|v| match v.kind {
                VarKind::Binary => problem.add_integer_column(v.cost, v.lower..=v.upper),
                VarKind::Continuous => problem.add_column(v.cost, v.lower..=v.upper),
            })
            .collect::<Vec<Col>>();

        for row in program.rows() {
            problem.add_row(row.lower..=row.upper, row.terms.iter().map(|&(v, coef)| (cols[v.index()], coef)));
        }

        let mut model = problem.optimise(Sense::Minimise);
        model.set_option("output_flag", config.verbose);
        model.set_option("mip_rel_gap", config.mip_gap);
        model.set_option("mip_abs_gap", config.mip_gap);
        if let Some(limit) = config.time_limit { model.set_option("time_limit", limit) }
        if let Some(threads) = config.threads { model.set_option("threads", threads as i32) }

        debug!(columns = cols.len(), rows = program.num_rows(), "invoking HiGHS");
        let solved = model.try_solve()
            .map_err(|status| DistrictingError::SolverError(format!("HiGHS run failed: {status:?}")))?;

        let status = match solved.status() {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => SolverStatus::Optimal,
            // Every column is bounded, so "unbounded or infeasible" can only mean infeasible.
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => SolverStatus::Infeasible,
            HighsModelStatus::Unbounded => SolverStatus::Unbounded,
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => SolverStatus::Limit,
            other => SolverStatus::Error(format!("{other:?}")),
        };

        let values = solved.get_solution().columns().to_vec();
        let objective = solved.objective_value();
        match &status {
            SolverStatus::Optimal => info!(objective, "HiGHS found an optimal solution"),
            SolverStatus::Limit => warn!(objective, "HiGHS stopped at its limit"),
            other => warn!(status = ?other, "HiGHS finished without a solution"),
        }

        Ok(SolverOutcome { status, values, objective })
    }
}
