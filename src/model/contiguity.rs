use tracing::debug;

use crate::{
    graph::RegionGraph,
    model::{assignment::AssignmentVars, program::{MixedIntegerProgram, RowTag, VarId}},
};

/// Sizes of the flow system added for contiguity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowStats {
    /// Number of candidate roots that received a commodity.
    pub roots: usize,
    /// Number of `f[u, v, j]` variables.
    pub flow_vars: usize,
}

/// Add one flow commodity per candidate root and constraints F1 to F3.
///
/// For root `j`, arc `(u, v)` carries commodity `j` only when both `u` and `v`
/// may belong to `j`'s district. Every region assigned to `j` consumes one
/// unit (F1), only assigned regions may receive flow (F2), and the root
/// receives none of its own (F3). Together these force a path of assigned
/// regions from `j` to every member, so each district is connected.
pub(crate) fn build_contiguity(
    program: &mut MixedIntegerProgram,
    graph: &RegionGraph,
    x: &AssignmentVars,
) -> FlowStats {
    let n = graph.node_count();
    let capacity = n.saturating_sub(1) as f64;

    let mut stats = FlowStats::default();
    let mut inflow: Vec<Vec<VarId>> = vec![Vec::new(); n];
    let mut outflow: Vec<Vec<VarId>> = vec![Vec::new(); n];

    for j in x.candidate_anchors() {
        inflow.iter_mut().for_each(Vec::clear);
        outflow.iter_mut().for_each(Vec::clear);

        for (u, v) in graph.arcs() {
            if x.get(u, j).is_none() || x.get(v, j).is_none() { continue }
            let f = program.add_continuous(0.0, 0.0, capacity);
            outflow[u].push(f);
            inflow[v].push(f);
            stats.flow_vars += 1;
        }

        for i in x.members_of(j).filter(|&i| i != j) {
            let Some(assigned) = x.get(i, j) else { continue };

            // F1: inflow - outflow = x[i, j]
            let terms = inflow[i].iter().map(|&f| (f, 1.0))
                .chain(outflow[i].iter().map(|&f| (f, -1.0)))
                .chain(std::iter::once((assigned, -1.0)))
                .collect();
            program.add_eq(RowTag::FlowConservation, terms, 0.0);

            // F2: inflow <= (n - 1) * x[i, j]
            let terms = inflow[i].iter().map(|&f| (f, 1.0))
                .chain(std::iter::once((assigned, -capacity)))
                .collect();
            program.add_le(RowTag::FlowCapacity, terms, 0.0);
        }

        // F3: the root receives none of its own commodity.
        let terms = inflow[j].iter().map(|&f| (f, 1.0)).collect();
        program.add_eq(RowTag::RootExclusion, terms, 0.0);

        stats.roots += 1;
    }

    debug!(roots = stats.roots, flow_vars = stats.flow_vars, "built contiguity flows");
    stats
}
