//! Reading region graphs from networkx-style JSON.
//!
//! Both the adjacency layout (`"adjacency": [[{"id": ..}, ..], ..]`) and the
//! node-link layout (`"links"` or `"edges"` with `source`/`target`) are
//! accepted. Node attributes are looked up through [`AttributeKeys`].

use std::{fs::File, io::BufReader, path::Path};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{DistrictingError, Result},
    graph::{Region, RegionGraph},
};

/// Names of the node attributes holding each region field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeKeys {
    pub id: String,
    pub name: String,
    pub population: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for AttributeKeys {
    /// Keys used by the 2020 census county/tract graph files.
    fn default() -> Self {
        Self {
            id: "GEOID20".into(),
            name: "NAME20".into(),
            population: "P0010001".into(),
            latitude: "INTPTLAT20".into(),
            longitude: "INTPTLON20".into(),
        }
    }
}

#[derive(Deserialize)]
struct NetworkxGraph {
    nodes: Vec<Map<String, Value>>,
    #[serde(default)]
    adjacency: Option<Vec<Vec<NetworkxNeighbor>>>,
    #[serde(default, alias = "edges")]
    links: Option<Vec<NetworkxLink>>,
}

#[derive(Deserialize)]
struct NetworkxNeighbor { id: Value }

#[derive(Deserialize)]
struct NetworkxLink { source: Value, target: Value }

/// Canonical lookup key for a node id that may be a number or a string.
fn node_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a float from a JSON number or a numeric string such as `"+32.5322"`.
fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('+').parse().ok(),
        _ => None,
    }
}

/// Read a non-negative integer from a JSON number or numeric string.
fn parse_population(value: &Value) -> std::result::Result<u64, String> {
    let parsed = match value {
        Value::Number(n) => match n.as_u64() {
            Some(p) => return Ok(p),
            None => n.as_f64(),
        },
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(p) if p.is_finite() && p >= 0.0 && p.fract() == 0.0 => Ok(p as u64),
        Some(p) => Err(format!("{p} is not a non-negative integer")),
        None => Err(format!("unparsable value {value}")),
    }
}

impl RegionGraph {
    /// Parse a region graph from a networkx JSON document.
    pub fn from_json_str(json: &str, keys: &AttributeKeys) -> Result<Self> {
        Self::from_networkx(serde_json::from_str(json)?, keys)
    }

    /// Read a region graph from a networkx JSON file.
    pub fn from_json_path(path: &Path, keys: &AttributeKeys) -> Result<Self> {
        let file = File::open(path).map_err(|e| DistrictingError::io(path, e))?;
        let graph = Self::from_networkx(serde_json::from_reader(BufReader::new(file))?, keys)?;
        debug!(path = %path.display(), regions = graph.node_count(), edges = graph.edge_count(), "loaded region graph");
        Ok(graph)
    }

    fn from_networkx(raw: NetworkxGraph, keys: &AttributeKeys) -> Result<Self> {
        // Map the networkx node id (not the region id) to a dense index.
        let mut lookup = AHashMap::with_capacity(raw.nodes.len());
        let mut regions = Vec::with_capacity(raw.nodes.len());

        for (i, node) in raw.nodes.iter().enumerate() {
            let node_id = node.get("id").map(node_key).unwrap_or_else(|| i.to_string());
            let region_id = node.get(&keys.id).map(node_key).unwrap_or_else(|| node_id.clone());

            let population = node.get(&keys.population)
                .ok_or_else(|| format!("missing attribute '{}'", keys.population))
                .and_then(parse_population)
                .map_err(|reason| DistrictingError::InvalidPopulation { region: region_id.clone(), reason })?;

            let lat = node.get(&keys.latitude).and_then(parse_f64);
            let lon = node.get(&keys.longitude).and_then(parse_f64);
            let (Some(lat), Some(lon)) = (lat, lon) else {
                return Err(DistrictingError::InvalidCoordinate {
                    region: region_id,
                    lat: lat.unwrap_or(f64::NAN),
                    lon: lon.unwrap_or(f64::NAN),
                });
            };

            let mut region = Region::new(region_id, population, lat, lon);
            if let Some(Value::String(name)) = node.get(&keys.name) {
                region = region.with_name(name.clone());
            }

            if lookup.insert(node_id.clone(), i).is_some() {
                return Err(DistrictingError::InvalidGraph(format!("duplicate node id '{node_id}'")));
            }
            regions.push(region);
        }

        let resolve = |value: &Value| {
            let key = node_key(value);
            lookup.get(&key).copied().ok_or_else(|| {
                DistrictingError::InvalidGraph(format!("adjacency references unknown node '{key}'"))
            })
        };

        let mut edges = Vec::new();
        if let Some(adjacency) = &raw.adjacency {
            if adjacency.len() != regions.len() {
                return Err(DistrictingError::InvalidGraph(format!(
                    "adjacency has {} rows but there are {} nodes", adjacency.len(), regions.len()
                )));
            }
            for (u, neighbors) in adjacency.iter().enumerate() {
                for neighbor in neighbors {
                    edges.push((u, resolve(&neighbor.id)?));
                }
            }
        }
        if let Some(links) = &raw.links {
            for link in links {
                edges.push((resolve(&link.source)?, resolve(&link.target)?));
            }
        }

        Self::new(regions, edges)
    }
}
