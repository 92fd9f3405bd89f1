use std::path::PathBuf;

use districtor::Metric;

/// Exact contiguous districting CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "districtor", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Solve for an optimal contiguous plan (forbids stdout)
    Solve(SolveArgs),

    /// Print the population bounds for a graph
    Bounds(BoundsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SolveArgs {
    /// Region adjacency graph in networkx JSON
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub graph: PathBuf,

    /// Number of districts, overrides the config file
    #[arg(short = 'k', long)]
    pub districts: Option<usize>,

    /// Allowed population deviation, overrides the config file
    #[arg(short, long)]
    pub deviation: Option<f64>,

    /// Output plan file, defaults to "./plan.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// TOML file with districting and solver options
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Solver time limit in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Solver threads
    #[arg(long)]
    pub threads: Option<u32>,

    /// Keep assignment pairs that cannot fit under the upper bound
    #[arg(long)]
    pub no_prune: bool,

    /// Centroid distance metric
    #[arg(long)]
    pub metric: Option<Metric>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct BoundsArgs {
    /// Region adjacency graph in networkx JSON
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub graph: PathBuf,

    /// Number of districts
    #[arg(short = 'k', long)]
    pub districts: usize,

    /// Allowed population deviation
    #[arg(short, long, default_value_t = 0.0)]
    pub deviation: f64,
}
