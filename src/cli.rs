use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Taranis TC environmental feature extraction and intensity correction.
#[derive(Parser)]
#[command(
    name = "taranis",
    version,
    about = "Tropical-cyclone environmental feature extraction and intensity bias correction"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Extract per-observation environmental features from monthly grids.
    Extract(ExtractArgs),
    /// Quantile-match simulated LMI values against observed climatology.
    Correct(CorrectArgs),
}

/// Arguments for the `extract` subcommand.
#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "taranis.toml")]
    pub config: PathBuf,

    /// Override output Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Restrict to one basin code (e.g. NA, WP).
    #[arg(short, long)]
    pub basin: Option<String>,
}

/// Arguments for the `correct` subcommand.
#[derive(clap::Args)]
pub struct CorrectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "taranis.toml")]
    pub config: PathBuf,

    /// Override observation-table Parquet path from config.
    #[arg(long)]
    pub tracks: Option<PathBuf>,

    /// Parquet file with per-storm simulated LMI (`storm_id`, `simulated_lmi`).
    #[arg(long)]
    pub simulated: PathBuf,

    /// Path for the corrected-LMI Parquet output.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Grouping dimension for per-group mappings.
    #[arg(long, value_enum, default_value_t = GroupByArg::None)]
    pub group_by: GroupByArg,
}

/// Grouping choices for the corrector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupByArg {
    /// One overall mapping for the whole population.
    None,
    /// Group storms by basin code.
    Basin,
    /// Group storms by ENSO phase.
    Enso,
}
