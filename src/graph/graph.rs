use ahash::AHashMap;

use crate::{
    error::{DistrictingError, Result},
    graph::Region,
};

/// An undirected region-adjacency graph in compressed sparse row format.
///
/// Adjacency is symmetrized on construction: self-loops are dropped and
/// duplicate edges collapse, so `edges(u)` is a sorted, duplicate-free list.
#[derive(Clone, Debug)]
pub struct RegionGraph {
    regions: Vec<Region>,
    index: AHashMap<String, u32>,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl RegionGraph {
    /// Construct a graph from regions and undirected edges given as index pairs.
    pub fn new(regions: Vec<Region>, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        if regions.is_empty() {
            return Err(DistrictingError::InvalidGraph("graph has no regions".into()));
        }
        if regions.len() > u32::MAX as usize {
            return Err(DistrictingError::InvalidGraph(format!("too many regions ({})", regions.len())));
        }

        let mut index = AHashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if index.insert(region.id.clone(), i as u32).is_some() {
                return Err(DistrictingError::InvalidGraph(format!("duplicate region id '{}'", region.id)));
            }
        }

        let num_nodes = regions.len();
        let mut adjacency = vec![Vec::<u32>::new(); num_nodes];
        for (u, v) in edges {
            if u >= num_nodes || v >= num_nodes {
                return Err(DistrictingError::InvalidGraph(
                    format!("edge ({u}, {v}) references a region outside 0..{num_nodes}")
                ));
            }
            if u == v { continue }
            adjacency[u].push(v as u32);
            adjacency[v].push(u as u32);
        }
        adjacency.iter_mut().for_each(|list| { list.sort_unstable(); list.dedup(); });

        Ok(Self {
            regions,
            index,
            offsets: std::iter::once(0u32).chain(
                adjacency.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect(),
            edges: adjacency.into_iter().flatten().collect(),
        })
    }

    /// Construct a graph from regions and undirected edges given as region ids.
    pub fn from_id_edges<'a>(regions: Vec<Region>, edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let lookup = regions.iter().enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect::<AHashMap<_, _>>();

        let resolve = |id: &str| lookup.get(id).copied().ok_or_else(|| {
            DistrictingError::InvalidGraph(format!("edge references unknown region '{id}'"))
        });

        let pairs = edges.into_iter()
            .map(|(a, b)| Ok((resolve(a)?, resolve(b)?)))
            .collect::<Result<Vec<_>>>()?;

        Self::new(regions, pairs)
    }

    /// Get the number of regions in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.regions.len() }

    /// Get the number of directed arcs (twice the number of undirected edges).
    #[inline] pub fn arc_count(&self) -> usize { self.edges.len() }

    /// Get the number of undirected edges.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() / 2 }

    /// Get all regions in index order.
    #[inline] pub fn regions(&self) -> &[Region] { &self.regions }

    /// Get a region by index.
    #[inline] pub fn region(&self, node: usize) -> &Region { &self.regions[node] }

    /// Get the population of a region.
    #[inline] pub fn population(&self, node: usize) -> u64 { self.regions[node].population }

    /// Look up the index of a region by its id.
    #[inline] pub fn index_of(&self, id: &str) -> Option<usize> { self.index.get(id).map(|&i| i as usize) }

    /// Sum of all region populations.
    pub fn total_population(&self) -> u64 { self.regions.iter().map(|r| r.population).sum() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Returns true if `u` and `v` are adjacent (binary search over sorted neighbors).
    pub fn contains_edge(&self, u: usize, v: usize) -> bool {
        self.edges[self.range(u)].binary_search(&(v as u32)).is_ok()
    }

    /// Iterate over every directed arc `(u, v)` of the symmetrized adjacency.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count()).flat_map(move |u| self.edges(u).map(move |v| (u, v)))
    }
}
