use std::{cmp::Reverse, collections::{BinaryHeap, VecDeque}};

use crate::graph::RegionGraph;

impl RegionGraph {
    /// Find all connected components (as node lists) of the whole graph.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut components = Vec::new();

        let mut visited = vec![false; self.node_count()];
        for u in 0..self.node_count() {
            if visited[u] { continue }
            visited[u] = true;

            let mut component = Vec::new();
            let mut queue = VecDeque::from([u]);
            while let Some(v) = queue.pop_front() {
                component.push(v);
                for w in self.edges(v) {
                    if !visited[w] {
                        visited[w] = true;
                        queue.push_back(w);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Check if the whole graph forms a single connected component.
    pub fn is_connected(&self) -> bool { self.components().len() <= 1 }

    /// Check if a set of nodes induces a connected subgraph.
    ///
    /// BFS from the first node restricted to `nodes`; an empty set is
    /// considered contiguous.
    pub fn is_contiguous(&self, nodes: &[usize]) -> bool {
        let Some(&start) = nodes.first() else { return true };

        let mut in_subgraph = vec![false; self.node_count()];
        let mut size = 0;
        for &u in nodes {
            assert!(u < self.node_count(), "node {} out of range", u);
            if !in_subgraph[u] { in_subgraph[u] = true; size += 1; }
        }

        let mut seen = 1;
        let mut visited = vec![false; self.node_count()];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(u) = queue.pop_front() {
            for v in self.edges(u) {
                if in_subgraph[v] && !visited[v] {
                    seen += 1;
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        seen == size
    }

    /// Minimum total population along any path from `source` to each node,
    /// counting both endpoints. Nodes whose cheapest path exceeds `budget`
    /// are reported as `None`.
    ///
    /// Any contiguous district holding both `source` and `v` contains such a
    /// path, so `None` proves `v` can never share a district with `source`.
    pub fn population_reach(&self, source: usize, budget: u64) -> Vec<Option<u64>> {
        let mut cost = vec![None; self.node_count()];
        let start = self.population(source);
        if start > budget { return cost }

        let mut heap = BinaryHeap::from([Reverse((start, source))]);
        cost[source] = Some(start);
        while let Some(Reverse((c, u))) = heap.pop() {
            if cost[u].is_some_and(|best| c > best) { continue }
            for v in self.edges(u) {
                let next = c.saturating_add(self.population(v));
                if next > budget { continue }
                if cost[v].is_none_or(|best| next < best) {
                    cost[v] = Some(next);
                    heap.push(Reverse((next, v)));
                }
            }
        }
        cost
    }
}
