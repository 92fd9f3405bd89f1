mod connectivity;
mod graph;
mod io;
mod region;

pub use graph::RegionGraph;
pub use io::AttributeKeys;
pub use region::{Centroid, Region};
