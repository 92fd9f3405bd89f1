use tracing::{debug, info, instrument};

use crate::{
    balance::PopulationBounds,
    config::DistrictingConfig,
    distance::{DistanceMatrix, DistanceMetric, Metric},
    error::Result,
    graph::RegionGraph,
    model::DistrictingModel,
    plan::DistrictPlan,
    solver::{MipSolver, SolverConfig},
};

/// One districting run over a borrowed region graph.
///
/// Holds options and, if supplied with [`Districting::with_distances`], a
/// precomputed distance matrix. Bounds and the model are built fresh inside
/// [`Districting::solve_with`] and dropped when it returns.
pub struct Districting<'a> {
    graph: &'a RegionGraph,
    districts: usize,
    deviation: f64,
    metric: Box<dyn DistanceMetric + 'a>,
    distances: Option<DistanceMatrix>,
    prune: bool,
    solver: SolverConfig,
}

impl<'a> Districting<'a> {
    /// Split `graph` into `districts` districts whose populations differ from
    /// the ideal by at most `deviation / 2` in either direction.
    pub fn new(graph: &'a RegionGraph, districts: usize, deviation: f64) -> Self {
        Self {
            graph,
            districts,
            deviation,
            metric: Box::new(Metric::default()),
            distances: None,
            prune: true,
            solver: SolverConfig::default(),
        }
    }

    pub fn from_config(graph: &'a RegionGraph, config: &DistrictingConfig) -> Self {
        Self::new(graph, config.districts, config.deviation)
            .with_metric(config.metric)
            .with_prune(config.prune)
            .with_solver_config(config.solver.clone())
    }

    pub fn with_metric(mut self, metric: impl DistanceMetric + 'a) -> Self {
        self.metric = Box::new(metric);
        self
    }

    /// Use a precomputed distance matrix instead of the metric.
    pub fn with_distances(mut self, distances: DistanceMatrix) -> Self {
        self.distances = Some(distances);
        self
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Population bounds implied by the graph total and the options.
    pub fn bounds(&self) -> Result<PopulationBounds> {
        PopulationBounds::new(self.graph.total_population(), self.districts, self.deviation)
    }

    /// Solve with HiGHS.
    #[cfg(feature = "highs")]
    pub fn solve(self) -> Result<DistrictPlan> {
        self.solve_with(&crate::solver::HighsSolver)
    }

    /// Build the model, hand it to `solver`, and decode a validated plan.
    #[instrument(skip_all, fields(regions = self.graph.node_count(), districts = self.districts))]
    pub fn solve_with<S: MipSolver + ?Sized>(self, solver: &S) -> Result<DistrictPlan> {
        let bounds = self.bounds()?;
        let distances = match self.distances {
            Some(distances) => distances,
            None => DistanceMatrix::build(self.graph, self.metric.as_ref())?,
        };

        let model = DistrictingModel::build(self.graph, &distances, bounds, self.prune)?;
        debug!(
            roots = model.flows().roots,
            flow_vars = model.flows().flow_vars,
            assignment_vars = model.assignment().count(),
            "handing model to solver"
        );
        let outcome = solver.solve(model.program(), &self.solver)?;
        let plan = DistrictPlan::from_outcome(self.graph, &distances, &model, &outcome)?;

        info!(objective = plan.objective, status = ?plan.status, "districting solved");
        Ok(plan)
    }
}

impl std::fmt::Debug for Districting<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Districting")
            .field("regions", &self.graph.node_count())
            .field("districts", &self.districts)
            .field("deviation", &self.deviation)
            .field("prune", &self.prune)
            .field("solver", &self.solver)
            .finish_non_exhaustive()
    }
}

/// Convenience for `Districting::new(graph, districts, deviation).solve()`.
#[cfg(feature = "highs")]
pub fn solve(graph: &RegionGraph, districts: usize, deviation: f64) -> Result<DistrictPlan> {
    Districting::new(graph, districts, deviation).solve()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        error::DistrictingError,
        graph::Region,
        model::MixedIntegerProgram,
        solver::{SolverOutcome, SolverStatus},
    };

    fn path(populations: &[u64]) -> RegionGraph {
        let regions = populations.iter().enumerate()
            .map(|(i, &p)| Region::new((i + 1).to_string(), p, 33.0, -86.0 + 0.1 * i as f64))
            .collect();
        RegionGraph::new(regions, (1..populations.len()).map(|i| (i - 1, i))).unwrap()
    }

    /// Records the program it receives and reports a fixed status.
    struct Scripted {
        status: SolverStatus,
        calls: Cell<usize>,
        gap: Cell<f64>,
    }

    impl MipSolver for Scripted {
        fn solve(&self, program: &MixedIntegerProgram, config: &SolverConfig) -> Result<SolverOutcome> {
            self.calls.set(self.calls.get() + 1);
            self.gap.set(config.mip_gap);
            Ok(SolverOutcome { status: self.status.clone(), values: vec![0.0; program.num_variables()], objective: 0.0 })
        }
    }

    fn scripted(status: SolverStatus) -> Scripted {
        Scripted { status, calls: Cell::new(0), gap: Cell::new(f64::NAN) }
    }

    #[test]
    fn invalid_options_fail_before_solver() {
        let graph = path(&[100, 100, 100, 100]);
        let solver = scripted(SolverStatus::Optimal);

        let err = Districting::new(&graph, 0, 0.0).solve_with(&solver).unwrap_err();
        assert!(matches!(err, DistrictingError::InvalidDistrictCount(0)));

        let err = Districting::new(&graph, 2, 2.5).solve_with(&solver).unwrap_err();
        assert!(matches!(err, DistrictingError::InvalidDeviation(_)));

        let err = Districting::new(&graph, 5, 1.0).solve_with(&solver).unwrap_err();
        assert!(matches!(err, DistrictingError::Infeasible(_)));

        assert_eq!(solver.calls.get(), 0);
    }

    #[test]
    fn invalid_centroid_is_rejected() {
        let regions = vec![Region::new("a", 1, 95.0, 0.0), Region::new("b", 1, 0.0, 0.0)];
        let graph = RegionGraph::new(regions, [(0, 1)]).unwrap();
        let err = Districting::new(&graph, 1, 0.0).solve_with(&scripted(SolverStatus::Optimal)).unwrap_err();
        assert!(matches!(err, DistrictingError::InvalidCoordinate { .. }));
    }

    #[test]
    fn solver_statuses_surface_as_errors() {
        let graph = path(&[100, 100, 100, 100]);
        let run = |status| Districting::new(&graph, 2, 0.0).solve_with(&scripted(status));

        assert!(matches!(run(SolverStatus::Infeasible), Err(DistrictingError::Infeasible(_))));
        assert!(matches!(run(SolverStatus::Unbounded), Err(DistrictingError::Unbounded)));
        assert!(matches!(run(SolverStatus::Limit), Err(DistrictingError::NoSolutionWithinLimit)));
        assert!(matches!(run(SolverStatus::Error("Notset".into())), Err(DistrictingError::SolverError(_))));
    }

    #[test]
    fn config_is_forwarded_to_solver() {
        let graph = path(&[100, 100]);
        let config = DistrictingConfig {
            districts: 2,
            solver: SolverConfig { mip_gap: 0.25, ..SolverConfig::default() },
            ..DistrictingConfig::default()
        };
        let solver = scripted(SolverStatus::Infeasible);
        let _ = Districting::from_config(&graph, &config).solve_with(&solver);

        assert_eq!(solver.calls.get(), 1);
        assert_eq!(solver.gap.get(), 0.25);
    }
}
