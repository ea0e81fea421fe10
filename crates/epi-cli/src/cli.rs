//! CLI argument definitions for the outbreak estimator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "epi",
    version,
    about = "Outbreak estimation - aggregate case data and run SIRD models",
    long_about = "Aggregate daily case counts by region, estimate SIRD rates from\n\
                  country snapshots, and simulate or fit epidemic curves."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the daily, snapshot and population CSV tables.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// JSON alias table replacing the built-in one.
    #[arg(long = "aliases", value_name = "PATH", global = true)]
    pub aliases: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the aggregated daily series for a region.
    Series(SeriesArgs),

    /// Estimate SIRD rates from a country's latest snapshot.
    Estimate(EstimateArgs),

    /// Run the self-re-estimating simulation for one or more countries.
    Trajectory(TrajectoryArgs),

    /// Fit beta and gamma to a region's active-case curve.
    Fit(FitArgs),

    /// Project a region's outbreak forward with mean daily rates.
    Project(ProjectArgs),

    /// Summarize cases, deaths and recoveries per continent.
    Continents,

    /// Print or export the country alias table.
    Aliases(AliasesArgs),
}

/// Region and date window shared by the series-based commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Continent (WHO region) name.
    #[arg(long = "continent")]
    pub continent: Option<String>,

    /// Country name; requires --continent.
    #[arg(long = "country", requires = "continent")]
    pub country: Option<String>,

    /// Province or state; requires --country.
    #[arg(long = "province", requires = "country")]
    pub province: Option<String>,

    /// First day to include.
    #[arg(long = "start", value_name = "DATE")]
    pub start: Option<String>,

    /// Last day to include.
    #[arg(long = "end", value_name = "DATE")]
    pub end: Option<String>,

    /// Fail instead of reporting a partial population when a country
    /// cannot be resolved.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Args)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Show counts per million inhabitants.
    #[arg(long = "per-million")]
    pub per_million: bool,

    /// Also write the series to a CSV file.
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct EstimateArgs {
    /// Country name as spelled in either dataset.
    #[arg(value_name = "COUNTRY")]
    pub country: String,

    /// Recovery rate to use instead of the configured one.
    #[arg(long = "gamma")]
    pub gamma: Option<f64>,
}

#[derive(Args)]
pub struct TrajectoryArgs {
    /// Countries to simulate.
    #[arg(value_name = "COUNTRY", required = true)]
    pub countries: Vec<String>,

    /// Number of simulated days.
    #[arg(long = "days", default_value_t = 100)]
    pub days: usize,

    /// Rounding applied to each day's increments.
    #[arg(long = "rounding", value_enum)]
    pub rounding: Option<RoundingArg>,

    /// Also write the per-day states to a CSV file.
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct FitArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Initial beta guess.
    #[arg(long = "beta")]
    pub beta: Option<f64>,

    /// Initial gamma guess.
    #[arg(long = "gamma")]
    pub gamma: Option<f64>,

    /// Iteration cap for the optimizer.
    #[arg(long = "max-iters")]
    pub max_iters: Option<u64>,
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Days to project.
    #[arg(long = "horizon")]
    pub horizon: Option<f64>,

    /// Number of sampled points, both ends included.
    #[arg(long = "samples")]
    pub samples: Option<usize>,

    /// Also write the projected states to a CSV file.
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct AliasesArgs {
    /// Write the table as JSON instead of printing it.
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// CLI rounding choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum RoundingArg {
    None,
    Whole,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
