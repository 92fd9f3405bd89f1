// End-to-end solves through HiGHS, checked against independent BFS and
// partition checks rather than the model's own constraints.
#![cfg(feature = "highs")]

use std::collections::{HashSet, VecDeque};

use districtor::{
    AttributeKeys, DistanceMatrix, DistrictPlan, Districting, DistrictingError, PlanReport, Region, RegionGraph,
    SolutionStatus,
};
use ndarray::Array2;

fn path(populations: &[u64]) -> RegionGraph {
    let regions = populations.iter().enumerate()
        .map(|(i, &p)| Region::new((i + 1).to_string(), p, 32.0, -86.0 + 0.2 * i as f64))
        .collect();
    RegionGraph::new(regions, (1..populations.len()).map(|i| (i - 1, i))).unwrap()
}

/// `|i - j|` along a path.
fn linear_distances(n: usize) -> DistanceMatrix {
    DistanceMatrix::from_array(Array2::from_shape_fn((n, n), |(i, j)| i.abs_diff(j) as f64)).unwrap()
}

fn member_ids(graph: &RegionGraph, plan: &DistrictPlan) -> Vec<Vec<String>> {
    plan.districts.iter()
        .map(|d| d.members.iter().map(|&i| graph.region(i).id.clone()).collect())
        .collect()
}

/// Checks every plan property without going through `DistrictPlan::validate`.
fn assert_valid(graph: &RegionGraph, plan: &DistrictPlan, k: usize) {
    assert_eq!(plan.districts.len(), k);

    let mut seen = HashSet::new();
    for district in &plan.districts {
        assert!(district.members.contains(&district.anchor));
        assert!(plan.bounds.lower <= district.population && district.population <= plan.bounds.upper);
        assert_eq!(district.population, district.members.iter().map(|&i| graph.region(i).population).sum::<u64>());
        for &i in &district.members { assert!(seen.insert(i), "region {i} assigned twice") }

        let members = district.members.iter().copied().collect::<HashSet<_>>();
        let mut reached = HashSet::from([district.anchor]);
        let mut queue = VecDeque::from([district.anchor]);
        while let Some(u) = queue.pop_front() {
            for v in graph.edges(u).filter(|v| members.contains(v)) {
                if reached.insert(v) { queue.push_back(v) }
            }
        }
        assert_eq!(reached, members, "district anchored at {} is not connected", district.anchor);
    }
    assert_eq!(seen.len(), graph.node_count());
}

#[test]
fn path_of_four_splits_into_adjacent_pairs() {
    let graph = path(&[100, 100, 100, 100]);
    let plan = Districting::new(&graph, 2, 0.0).with_distances(linear_distances(4)).solve().unwrap();

    assert_valid(&graph, &plan, 2);
    assert_eq!(plan.status, SolutionStatus::Optimal);
    assert_eq!(member_ids(&graph, &plan), vec![vec!["1", "2"], vec!["3", "4"]]);
    assert!((plan.objective - 200.0).abs() < 1e-6);
}

#[test]
fn contiguity_overrides_a_cheaper_disconnected_split() {
    // Regions 1 & 3 share a location, as do 2 & 4, so {1,3} / {2,4} would
    // cost nothing if contiguity were not enforced.
    let graph = path(&[100, 100, 100, 100]);
    let distances = DistanceMatrix::from_array(Array2::from_shape_fn((4, 4), |(i, j)| {
        if i % 2 == j % 2 { 0.0 } else { 1.0 }
    })).unwrap();

    for prune in [true, false] {
        let plan = Districting::new(&graph, 2, 0.0)
            .with_distances(distances.clone())
            .with_prune(prune)
            .solve()
            .unwrap();

        assert_valid(&graph, &plan, 2);
        assert_eq!(member_ids(&graph, &plan), vec![vec!["1", "2"], vec!["3", "4"]]);
        assert!((plan.objective - 200.0).abs() < 1e-6);
    }
}

#[test]
fn more_districts_than_regions_is_infeasible() {
    let graph = path(&[100, 100, 100]);
    let err = Districting::new(&graph, 4, 1.0).solve().unwrap_err();
    assert!(matches!(err, DistrictingError::Infeasible(_)), "{err}");
}

#[test]
fn unreachable_balance_is_infeasible_with_and_without_pruning() {
    // K4 with total 65: bounds [32, 33], and no subset sums into that band.
    let regions = [10, 10, 10, 35].iter().enumerate()
        .map(|(i, &p)| Region::new(i.to_string(), p, 32.0 + 0.1 * i as f64, -86.0))
        .collect();
    let graph = RegionGraph::new(regions, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap();

    for prune in [true, false] {
        let err = Districting::new(&graph, 2, 0.05).with_prune(prune).solve().unwrap_err();
        assert!(matches!(err, DistrictingError::Infeasible(_)), "prune={prune}: {err}");
    }
}

#[test]
fn balance_reachable_only_by_disconnected_split_is_infeasible() {
    // Bounds [50, 50]; only {10, 40} / {20, 30} balances, and neither is connected.
    let graph = path(&[10, 20, 30, 40]);
    let err = Districting::new(&graph, 2, 0.02).solve().unwrap_err();
    assert!(matches!(err, DistrictingError::Infeasible(_)), "{err}");
}

#[test]
fn resolving_gives_the_same_objective() {
    let graph = path(&[30, 50, 20, 40, 60, 10]);
    let first = Districting::new(&graph, 3, 0.5).solve().unwrap();
    let second = Districting::new(&graph, 3, 0.5).solve().unwrap();

    assert_valid(&graph, &first, 3);
    assert!((first.objective - second.objective).abs() <= 1e-6 * first.objective.max(1.0));
}

#[test]
fn grid_plan_is_balanced_and_contiguous() {
    // 3x3 grid, rows sum to 300 each.
    let populations = [120, 80, 100, 90, 110, 100, 100, 100, 100];
    let regions = populations.iter().enumerate()
        .map(|(i, &p)| Region::new(format!("g{i}"), p, 32.0 + 0.1 * (i / 3) as f64, -86.0 + 0.1 * (i % 3) as f64))
        .collect();
    let edges = (0..9).flat_map(|i| {
        let right = (i % 3 < 2).then_some((i, i + 1));
        let down = (i < 6).then_some((i, i + 3));
        right.into_iter().chain(down)
    });
    let graph = RegionGraph::new(regions, edges).unwrap();

    let plan = Districting::new(&graph, 3, 0.2).solve().unwrap();

    assert_valid(&graph, &plan, 3);
    assert_eq!((plan.bounds.lower, plan.bounds.upper), (270, 330));
    assert!(plan.validate(&graph).is_ok());
}

#[test]
fn json_graph_to_json_plan() {
    let json = r#"{
        "nodes": [
            {"id": 0, "GEOID20": "A", "NAME20": "Alpha", "P0010001": 100, "INTPTLAT20": "+32.0", "INTPTLON20": "-086.0"},
            {"id": 1, "GEOID20": "B", "NAME20": "Bravo", "P0010001": 100, "INTPTLAT20": "+32.0", "INTPTLON20": "-085.8"},
            {"id": 2, "GEOID20": "C", "NAME20": "Charlie", "P0010001": 100, "INTPTLAT20": "+32.2", "INTPTLON20": "-086.0"},
            {"id": 3, "GEOID20": "D", "NAME20": "Delta", "P0010001": 100, "INTPTLAT20": "+32.2", "INTPTLON20": "-085.8"}
        ],
        "adjacency": [[{"id": 1}, {"id": 2}], [{"id": 0}, {"id": 3}], [{"id": 0}, {"id": 3}], [{"id": 1}, {"id": 2}]]
    }"#;
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("graph.json");
    let plan_path = dir.path().join("plan.json");
    std::fs::write(&graph_path, json).unwrap();

    let graph = RegionGraph::from_json_path(&graph_path, &AttributeKeys::default()).unwrap();
    let plan = Districting::new(&graph, 2, 0.0).solve().unwrap();
    plan.write_json(&graph, &plan_path).unwrap();

    let report: PlanReport = serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
    assert_eq!(report.status, SolutionStatus::Optimal);
    assert_eq!(report.districts.len(), 2);
    assert_eq!(report.assignment.len(), 4);
    assert!(report.districts.iter().all(|d| d.population == 200));
    assert_ne!(report.assignment["A"], report.assignment["D"]);
    assert_ne!(report.assignment["B"], report.assignment["C"]);
}
