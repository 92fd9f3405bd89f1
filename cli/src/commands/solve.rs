use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use districtor::{Districting, DistrictingConfig, RegionGraph};
use tracing::info;

/// Merge the optional config file with command-line overrides.
pub(crate) fn resolve_config(args: &crate::cli::SolveArgs) -> Result<DistrictingConfig> {
    let file = args.config.as_deref()
        .map(|path| DistrictingConfig::from_toml_path(path)
            .with_context(|| format!("failed to read config {}", path.display())))
        .transpose()?;

    let districts = args.districts
        .or(file.as_ref().map(|c| c.districts))
        .context("number of districts is required (-k or a config file)")?;
    let deviation = args.deviation
        .or(file.as_ref().map(|c| c.deviation))
        .context("population deviation is required (-d or a config file)")?;

    let mut config = file.unwrap_or_default();
    config.districts = districts;
    config.deviation = deviation;
    if args.no_prune { config.prune = false }
    if let Some(metric) = args.metric { config.metric = metric }
    if let Some(limit) = args.time_limit { config.solver.time_limit = Some(limit) }
    if let Some(threads) = args.threads { config.solver.threads = Some(threads) }
    Ok(config)
}

/// Where to write the plan, refusing stdout and unrequested overwrites.
pub(crate) fn output_path(output: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| "./plan.json".into());
    if path.as_os_str() == "-" { bail!("writing the plan to stdout is not supported, pass a file path") }
    if path.exists() && !force { bail!("{} already exists (use --force to overwrite)", path.display()) }
    Ok(path)
}

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::SolveArgs) -> Result<()> {
    let mut config = resolve_config(args)?;
    config.solver.verbose |= cli.verbose > 2;
    let out_path = output_path(args.output.as_deref(), args.force)?;

    info!(graph = %args.graph.display(), "loading region graph");
    let graph = RegionGraph::from_json_path(&args.graph, &config.keys)
        .with_context(|| format!("failed to load region graph {}", args.graph.display()))?;

    println!(
        "[solve] {} regions, {} adjacencies, population {}",
        graph.node_count(), graph.edge_count(), graph.total_population()
    );

    let plan = Districting::from_config(&graph, &config)
        .solve()
        .with_context(|| format!("failed to split {} into {} districts", args.graph.display(), config.districts))?;

    print!("{}", plan.summary(&graph));

    plan.write_json(&graph, &out_path)
        .with_context(|| format!("failed to write plan to {}", out_path.display()))?;
    println!("[solve] wrote plan to {}", out_path.display());

    Ok(())
}
