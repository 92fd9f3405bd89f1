use anyhow::{Context, Result};
use districtor::{AttributeKeys, PopulationBounds, RegionGraph};

/// Load the graph and derive the population band for the requested split.
pub(crate) fn compute(args: &crate::cli::BoundsArgs) -> Result<PopulationBounds> {
    let graph = RegionGraph::from_json_path(&args.graph, &AttributeKeys::default())
        .with_context(|| format!("failed to load region graph {}", args.graph.display()))?;

    PopulationBounds::new(graph.total_population(), args.districts, args.deviation)
        .context("no population band satisfies these options")
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::BoundsArgs) -> Result<()> {
    let bounds = compute(args)?;

    println!("lower {}", bounds.lower);
    println!("upper {}", bounds.upper);
    println!("ideal {:.2}", bounds.ideal());

    Ok(())
}
