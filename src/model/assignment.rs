use tracing::debug;

use crate::{
    balance::PopulationBounds,
    distance::DistanceMatrix,
    error::{DistrictingError, Result},
    graph::RegionGraph,
    model::program::{MixedIntegerProgram, RowTag, VarId},
};

/// The `x[i, j]` variables: region `i` belongs to the district anchored at `j`.
///
/// Stored densely in row-major order; `None` marks a pair that was pruned
/// because it can never appear in a feasible districting.
#[derive(Clone, Debug)]
pub struct AssignmentVars {
    size: usize,
    vars: Vec<Option<VarId>>,
}

impl AssignmentVars {
    /// Number of regions.
    #[inline] pub fn size(&self) -> usize { self.size }

    /// The variable for "region `i` is assigned to anchor `j`", if materialized.
    #[inline] pub fn get(&self, i: usize, j: usize) -> Option<VarId> { self.vars[i * self.size + j] }

    /// The anchor indicator `x[j, j]`, if `j` can be an anchor.
    #[inline] pub fn anchor(&self, j: usize) -> Option<VarId> { self.get(j, j) }

    /// Regions that may act as anchors.
    pub fn candidate_anchors(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(|&j| self.anchor(j).is_some())
    }

    /// Regions that may join the district anchored at `j` (including `j`).
    pub fn members_of(&self, j: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&i| self.get(i, j).is_some())
    }

    /// Number of materialized assignment variables.
    pub fn count(&self) -> usize { self.vars.iter().flatten().count() }
}

/// Decide which `(i, j)` pairs to materialize.
///
/// Without pruning every pair is kept. With pruning, `j` is dropped as an
/// anchor when its own population exceeds the upper bound, and `i` is dropped
/// from `j` when every adjacency path between them carries more than the
/// upper bound in population.
pub(crate) fn eligible_pairs(graph: &RegionGraph, bounds: &PopulationBounds, prune: bool) -> Vec<bool> {
    let n = graph.node_count();
    if !prune { return vec![true; n * n] }

    let mut eligible = vec![false; n * n];
    for j in 0..n {
        for (i, reach) in graph.population_reach(j, bounds.upper).into_iter().enumerate() {
            eligible[i * n + j] = reach.is_some();
        }
    }
    eligible
}

/// Create the assignment variables, the objective, and constraints C1 to C5.
pub(crate) fn build_assignment(
    program: &mut MixedIntegerProgram,
    graph: &RegionGraph,
    distances: &DistanceMatrix,
    bounds: &PopulationBounds,
    eligible: &[bool],
) -> Result<AssignmentVars> {
    let n = graph.node_count();
    let k = bounds.districts;
    assert_eq!(distances.size(), n, "distance matrix must cover every region");
    assert_eq!(eligible.len(), n * n, "eligibility must cover every region pair");

    // A pair is only usable if its anchor is usable.
    let usable = |i: usize, j: usize| eligible[i * n + j] && eligible[j * n + j];

    // Objective: population-weighted squared distance to the anchor.
    let mut vars = vec![None; n * n];
    for i in 0..n {
        for j in (0..n).filter(|&j| usable(i, j)) {
            let cost = distances.squared(i, j) * graph.population(i) as f64;
            vars[i * n + j] = Some(program.add_binary(cost));
        }
    }
    let x = AssignmentVars { size: n, vars };

    let anchors = x.candidate_anchors().count();
    if anchors < k {
        return Err(DistrictingError::Infeasible(format!(
            "only {anchors} regions can anchor a district but {k} districts are required"
        )));
    }
    if let Some(i) = (0..n).find(|&i| (0..n).all(|j| x.get(i, j).is_none())) {
        return Err(DistrictingError::Infeasible(format!(
            "region '{}' cannot join any district within the population bound {}",
            graph.region(i).id, bounds.upper
        )));
    }

    // C1: each region is assigned exactly once.
    for i in 0..n {
        let terms = (0..n).filter_map(|j| x.get(i, j)).map(|v| (v, 1.0)).collect();
        program.add_eq(RowTag::SingleAssignment, terms, 1.0);
    }

    // C2: exactly k anchors.
    let terms = x.candidate_anchors().filter_map(|j| x.anchor(j)).map(|v| (v, 1.0)).collect();
    program.add_eq(RowTag::DistrictCount, terms, k as f64);

    for j in x.candidate_anchors() {
        let Some(anchor) = x.anchor(j) else { continue };

        // C3/C4: population bounds switched on by the anchor indicator. The
        // anchor's own population folds into its coefficient.
        let population_terms = |bound: u64| {
            x.members_of(j)
                .filter_map(|i| x.get(i, j).map(|v| (i, v)))
                .map(|(i, v)| {
                    let coef = graph.population(i) as f64;
                    if v == anchor { (v, coef - bound as f64) } else { (v, coef) }
                })
                .collect::<Vec<_>>()
        };
        program.add_ge(RowTag::PopulationLower, population_terms(bounds.lower), 0.0);
        program.add_le(RowTag::PopulationUpper, population_terms(bounds.upper), 0.0);

        // C5: a region may only join an active anchor.
        for i in x.members_of(j).filter(|&i| i != j) {
            if let Some(v) = x.get(i, j) {
                program.add_le(RowTag::Coupling, vec![(v, 1.0), (anchor, -1.0)], 0.0);
            }
        }
    }

    debug!(
        variables = x.count(),
        pruned = n * n - x.count(),
        anchors,
        "built assignment model"
    );
    Ok(x)
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::graph::Region;

    /// Path 0-1-2-3 with the given populations and unit spacing.
    fn path(populations: &[u64]) -> (RegionGraph, DistanceMatrix) {
        let n = populations.len();
        let regions = populations.iter().enumerate()
            .map(|(i, &p)| Region::new(i.to_string(), p, 0.0, i as f64))
            .collect();
        let graph = RegionGraph::new(regions, (1..n).map(|i| (i - 1, i))).unwrap();
        let distances = DistanceMatrix::from_array(
            Array2::from_shape_fn((n, n), |(i, j)| (i as f64 - j as f64).abs())
        ).unwrap();
        (graph, distances)
    }

    #[test]
    fn unpruned_model_has_every_pair() {
        let (graph, distances) = path(&[100, 100, 100, 100]);
        let bounds = PopulationBounds::new(400, 2, 0.0).unwrap();
        let eligible = eligible_pairs(&graph, &bounds, false);

        let mut program = MixedIntegerProgram::new();
        let x = build_assignment(&mut program, &graph, &distances, &bounds, &eligible).unwrap();

        assert_eq!(x.count(), 16);
        assert_eq!(program.num_variables(), 16);
        assert_eq!(program.count_rows(RowTag::SingleAssignment), 4);
        assert_eq!(program.count_rows(RowTag::DistrictCount), 1);
        assert_eq!(program.count_rows(RowTag::PopulationLower), 4);
        assert_eq!(program.count_rows(RowTag::PopulationUpper), 4);
        assert_eq!(program.count_rows(RowTag::Coupling), 12);
    }

    #[test]
    fn objective_weights_squared_distance_by_population() {
        let (graph, distances) = path(&[10, 20, 30, 40]);
        let bounds = PopulationBounds::new(100, 1, 0.0).unwrap();
        let eligible = eligible_pairs(&graph, &bounds, false);

        let mut program = MixedIntegerProgram::new();
        let x = build_assignment(&mut program, &graph, &distances, &bounds, &eligible).unwrap();

        // Region 3 (pop 40) to anchor 0 at distance 3.
        assert_eq!(program.variable(x.get(3, 0).unwrap()).cost, 9.0 * 40.0);
        assert_eq!(program.variable(x.anchor(2).unwrap()).cost, 0.0);
    }

    #[test]
    fn population_rows_fold_bound_into_anchor() {
        let (graph, distances) = path(&[100, 100, 100, 100]);
        let bounds = PopulationBounds::new(400, 2, 0.1).unwrap();
        let eligible = eligible_pairs(&graph, &bounds, false);

        let mut program = MixedIntegerProgram::new();
        let x = build_assignment(&mut program, &graph, &distances, &bounds, &eligible).unwrap();

        let lower = program.rows().iter().find(|r| r.tag == RowTag::PopulationLower).unwrap();
        let anchor = x.anchor(0).unwrap();
        let coef = lower.terms.iter().find(|&&(v, _)| v == anchor).unwrap().1;
        assert_eq!(coef, 100.0 - bounds.lower as f64);
    }

    #[test]
    fn pruning_drops_unreachable_pairs() {
        // Bounds [190, 210]: region 0 can pair with 1 but never reach 2 or 3.
        let (graph, distances) = path(&[100, 100, 100, 100]);
        let bounds = PopulationBounds::new(400, 2, 0.1).unwrap();
        let eligible = eligible_pairs(&graph, &bounds, true);

        let mut program = MixedIntegerProgram::new();
        let x = build_assignment(&mut program, &graph, &distances, &bounds, &eligible).unwrap();

        assert!(x.get(1, 0).is_some());
        assert!(x.get(2, 0).is_none());
        assert!(x.get(3, 0).is_none());
        assert_eq!(x.members_of(1).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(x.count(), 4 + 6);
    }

    #[test]
    fn pruning_drops_overweight_anchor_and_detects_stranded_region() {
        // Region 3 alone exceeds the bound and can join nothing.
        let (graph, distances) = path(&[10, 10, 10, 35]);
        let bounds = PopulationBounds::new(65, 2, 0.05).unwrap();
        assert_eq!((bounds.lower, bounds.upper), (32, 33));

        let eligible = eligible_pairs(&graph, &bounds, true);
        let mut program = MixedIntegerProgram::new();
        let err = build_assignment(&mut program, &graph, &distances, &bounds, &eligible).unwrap_err();
        assert!(matches!(err, DistrictingError::Infeasible(_)));
    }

    #[test]
    fn too_few_anchors_is_infeasible() {
        let (graph, distances) = path(&[100, 100]);
        let bounds = PopulationBounds::new(200, 3, 1.5).unwrap();
        let eligible = eligible_pairs(&graph, &bounds, false);

        let mut program = MixedIntegerProgram::new();
        let err = build_assignment(&mut program, &graph, &distances, &bounds, &eligible).unwrap_err();
        assert!(matches!(err, DistrictingError::Infeasible(_)));
    }
}
