use std::{collections::BTreeMap, fmt::Write as _, fs::File, io::{BufWriter, Write}, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    balance::PopulationBounds,
    distance::DistanceMatrix,
    error::{DistrictingError, Result},
    graph::RegionGraph,
    model::DistrictingModel,
    solver::{SolverOutcome, SolverStatus},
};

/// Binary variables are read as true when their value exceeds this threshold.
///
/// Solvers return 0/1 variables with floating-point noise (e.g. `0.9999999`
/// or `1e-10`), so values are never compared against exact integers.
pub const ASSIGNMENT_THRESHOLD: f64 = 0.5;

/// How the returned plan was certified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionStatus {
    /// Proven optimal within the configured gap.
    Optimal,
    /// Valid, but the solver stopped at a limit before proving optimality.
    Feasible,
}

/// A district: its anchor region, member regions, and total population.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct District {
    pub anchor: usize,
    /// Member region indices in ascending order, including the anchor.
    pub members: Vec<usize>,
    pub population: u64,
}

/// A complete districting produced by one solve.
#[derive(Clone, Debug)]
pub struct DistrictPlan {
    pub status: SolutionStatus,
    /// Population-weighted squared distance from every region to its anchor.
    pub objective: f64,
    pub bounds: PopulationBounds,
    /// Districts ordered by anchor index.
    pub districts: Vec<District>,
}

/// Serializable form of a plan, keyed by region ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub status: SolutionStatus,
    pub objective: f64,
    pub lower: u64,
    pub upper: u64,
    pub districts: Vec<DistrictReport>,
    /// Region id to district label, for map rendering.
    pub assignment: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistrictReport {
    pub label: usize,
    pub anchor: String,
    pub members: Vec<String>,
    pub population: u64,
}

impl DistrictPlan {
    /// Decode solver output into a plan.
    ///
    /// Optimal outcomes are decoded and validated. Limit outcomes are decoded
    /// and kept only if they pass validation, in which case they are marked
    /// `Feasible`. All other statuses map to their error.
    pub fn from_outcome(
        graph: &RegionGraph,
        distances: &DistanceMatrix,
        model: &DistrictingModel,
        outcome: &SolverOutcome,
    ) -> Result<Self> {
        let status = match &outcome.status {
            SolverStatus::Optimal => SolutionStatus::Optimal,
            SolverStatus::Limit => SolutionStatus::Feasible,
            SolverStatus::Infeasible => return Err(DistrictingError::Infeasible(format!(
                "no contiguous plan with {} districts fits the population band [{}, {}]",
                model.bounds().districts, model.bounds().lower, model.bounds().upper
            ))),
            SolverStatus::Unbounded => return Err(DistrictingError::Unbounded),
            SolverStatus::Error(reason) => return Err(DistrictingError::SolverError(reason.clone())),
        };

        let decoded = Self::decode(graph, distances, model, &outcome.values, status)
            .and_then(|plan| plan.validate(graph).map(|()| plan));

        match (status, decoded) {
            (_, Ok(plan)) => {
                debug!(districts = plan.districts.len(), objective = plan.objective, "decoded plan");
                Ok(plan)
            }
            (SolutionStatus::Feasible, Err(err)) => {
                warn!(%err, "incumbent at solver limit is not a valid plan");
                Err(DistrictingError::NoSolutionWithinLimit)
            }
            (SolutionStatus::Optimal, Err(err)) => Err(err),
        }
    }

    fn decode(
        graph: &RegionGraph,
        distances: &DistanceMatrix,
        model: &DistrictingModel,
        values: &[f64],
        status: SolutionStatus,
    ) -> Result<Self> {
        if values.len() != model.program().num_variables() {
            return Err(DistrictingError::SolverError(format!(
                "solver returned {} values for {} variables", values.len(), model.program().num_variables()
            )));
        }

        let x = model.assignment();
        let is_set = |i: usize, j: usize| x.get(i, j).is_some_and(|v| values[v.index()] > ASSIGNMENT_THRESHOLD);

        let districts = x.candidate_anchors()
            .filter(|&j| is_set(j, j))
            .map(|j| {
                let members = x.members_of(j).filter(|&i| is_set(i, j)).collect::<Vec<_>>();
                let population = members.iter().map(|&i| graph.population(i)).sum();
                District { anchor: j, members, population }
            })
            .collect::<Vec<_>>();

        let objective = districts.iter()
            .flat_map(|d| d.members.iter().map(move |&i| distances.squared(i, d.anchor) * graph.population(i) as f64))
            .sum();

        Ok(Self { status, objective, bounds: *model.bounds(), districts })
    }

    /// Check the plan against the graph, independently of how it was found:
    /// `k` districts, each containing its anchor, partitioning every region,
    /// with populations inside the bounds and connected member sets.
    pub fn validate(&self, graph: &RegionGraph) -> Result<()> {
        let invalid = |msg: String| Err(DistrictingError::InvalidPlan(msg));

        if self.districts.len() != self.bounds.districts {
            return invalid(format!("expected {} districts, found {}", self.bounds.districts, self.districts.len()));
        }

        let mut owner = vec![None; graph.node_count()];
        for (label, district) in self.districts.iter().enumerate() {
            if district.anchor >= graph.node_count() {
                return invalid(format!("district {label} anchor index {} out of range", district.anchor));
            }
            if !district.members.contains(&district.anchor) {
                return invalid(format!("anchor '{}' is outside its own district", graph.region(district.anchor).id));
            }
            for &i in &district.members {
                if i >= graph.node_count() { return invalid(format!("region index {i} out of range")) }
                if let Some(other) = owner[i].replace(label) {
                    return invalid(format!("region '{}' is in districts {other} and {label}", graph.region(i).id));
                }
            }

            let population = district.members.iter().map(|&i| graph.population(i)).sum::<u64>();
            if population != district.population {
                return invalid(format!("district {label} reports population {} but sums to {population}", district.population));
            }
            if !self.bounds.contains(population) {
                return invalid(format!(
                    "district {label} population {population} outside [{}, {}]", self.bounds.lower, self.bounds.upper
                ));
            }
            if !graph.is_contiguous(&district.members) {
                return invalid(format!("district {label} anchored at '{}' is not contiguous", graph.region(district.anchor).id));
            }
        }

        if let Some(i) = owner.iter().position(Option::is_none) {
            return invalid(format!("region '{}' is not assigned", graph.region(i).id));
        }
        Ok(())
    }

    /// District label (position in `districts`) for every region.
    pub fn labels(&self, num_regions: usize) -> Vec<Option<usize>> {
        let mut labels = vec![None; num_regions];
        for (label, district) in self.districts.iter().enumerate() {
            district.members.iter().for_each(|&i| labels[i] = Some(label));
        }
        labels
    }

    /// Convert to the id-keyed serializable form.
    pub fn to_report(&self, graph: &RegionGraph) -> PlanReport {
        let id = |i: usize| graph.region(i).id.clone();
        PlanReport {
            status: self.status,
            objective: self.objective,
            lower: self.bounds.lower,
            upper: self.bounds.upper,
            districts: self.districts.iter().enumerate()
                .map(|(label, d)| DistrictReport {
                    label,
                    anchor: id(d.anchor),
                    members: d.members.iter().map(|&i| id(i)).collect(),
                    population: d.population,
                })
                .collect(),
            assignment: self.labels(graph.node_count()).into_iter().enumerate()
                .filter_map(|(i, label)| label.map(|label| (id(i), label)))
                .collect(),
        }
    }

    /// Write the plan as pretty-printed JSON.
    pub fn write_json(&self, graph: &RegionGraph, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| DistrictingError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_report(graph))?;
        writer.flush().map_err(|e| DistrictingError::io(path, e))?;
        Ok(())
    }

    /// Human-readable report, one line per district.
    pub fn summary(&self, graph: &RegionGraph) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "objective {:.3} ({:?}), bounds [{}, {}]",
            self.objective, self.status, self.bounds.lower, self.bounds.upper);
        for (label, district) in self.districts.iter().enumerate() {
            let names = district.members.iter().map(|&i| graph.region(i).label()).collect::<Vec<_>>();
            let _ = writeln!(out, "district {label} (anchor {}) has population {} and contains {}",
                graph.region(district.anchor).label(), district.population, names.join(", "));
        }
        out
    }
}
