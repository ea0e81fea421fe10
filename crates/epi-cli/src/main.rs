//! Outbreak estimation CLI.

use clap::{ColorChoice, Parser};
use epi_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use epi_cli::commands::{
    Session, run_aliases, run_continents, run_estimate, run_fit, run_project, run_series,
    run_trajectory,
};
use epi_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod summary;

use crate::summary::{
    print_aliases, print_continents, print_estimate, print_fit, print_projection, print_series,
    print_trajectories,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let session = Session::from_cli(cli)?;
    match &cli.command {
        Command::Series(args) => {
            let series = run_series(&session, args)?;
            print_series(&series, args.per_million);
        }
        Command::Estimate(args) => print_estimate(&run_estimate(&session, args)?),
        Command::Trajectory(args) => print_trajectories(&run_trajectory(&session, args)?),
        Command::Fit(args) => print_fit(&run_fit(&session, args)?),
        Command::Project(args) => print_projection(&run_project(&session, args)?),
        Command::Continents => print_continents(&run_continents(&session)?),
        Command::Aliases(args) => {
            if let Some(mapping) = run_aliases(&session, args)? {
                print_aliases(&mapping);
            }
        }
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
