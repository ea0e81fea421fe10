use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use epi_core::{
    Aggregator, Calibrator, ContinentSummary, FittedParameters, ProjectionPoint, Simulation,
    Simulator, daily_rates, estimate_with_gamma, fetch_snapshot, mean_rates, project,
    seed_from_series, summarize_continents,
};
use epi_ingest::{CsvSource, DataSource};
use epi_map::{NameMapping, Reconciler};
use epi_model::{
    AggregateOptions, CountrySnapshot, DateWindow, ModelParameters, RoundingPolicy, Scope,
    TimeSeries,
};

use crate::cli::{
    AliasesArgs, Cli, EstimateArgs, FitArgs, ProjectArgs, RoundingArg, ScopeArgs, SeriesArgs,
    TrajectoryArgs,
};
use crate::config::EpiConfig;
use crate::export::{export_projection, export_series, export_simulations};

/// Data source, name reconciler and options shared by every command.
pub struct Session {
    pub config: EpiConfig,
    pub source: Box<dyn DataSource>,
    pub reconciler: Reconciler,
}

impl Session {
    /// Resolves configuration with flags taking precedence over the file.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("resolve working directory")?;
        let mut config = EpiConfig::discover(cli.config.as_deref(), &cwd)?;
        if let Some(dir) = &cli.data_dir {
            config.data.dir.clone_from(dir);
        }
        if let Some(path) = &cli.aliases {
            config.data.aliases = Some(path.clone());
        }
        let source =
            CsvSource::new(config.data.dir.clone()).with_files(config.data.files.clone());
        let reconciler = match &config.data.aliases {
            Some(path) => Reconciler::with_mapping(
                NameMapping::load(path)
                    .with_context(|| format!("load alias table {}", path.display()))?,
            ),
            None => Reconciler::new(),
        };
        info!(
            source = %source.describe(),
            aliases = reconciler.mapping().len(),
            "data source ready"
        );
        Ok(Self {
            config,
            source: Box::new(source),
            reconciler,
        })
    }

    pub fn with_source(
        config: EpiConfig,
        source: Box<dyn DataSource>,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            config,
            source,
            reconciler,
        }
    }

    fn aggregate(&self, args: &ScopeArgs) -> Result<TimeSeries> {
        let scope = Scope::from_query(
            args.continent.as_deref(),
            args.country.as_deref(),
            args.province.as_deref(),
        )
        .context("invalid region")?;
        let window =
            DateWindow::parse(args.start.as_deref(), args.end.as_deref()).context("invalid dates")?;
        let options = if args.strict {
            AggregateOptions::strict()
        } else {
            self.config.aggregate
        };
        let series = Aggregator::new(self.source.as_ref(), &self.reconciler)
            .with_options(options)
            .aggregate(&scope, window)
            .with_context(|| format!("aggregate {}", scope.label()))?;
        if series.is_partial() {
            warn!(
                scope = %scope.label(),
                unresolved = series.unresolved.len(),
                "population is a partial sum"
            );
        }
        Ok(series)
    }

    fn non_empty(&self, args: &ScopeArgs) -> Result<TimeSeries> {
        let series = self.aggregate(args)?;
        if series.is_empty() {
            bail!("no data for {} in the requested window", series.scope.label());
        }
        Ok(series)
    }
}

pub fn run_series(session: &Session, args: &SeriesArgs) -> Result<TimeSeries> {
    let span = info_span!("series");
    let _guard = span.enter();
    let series = session.aggregate(&args.scope)?;
    info!(scope = %series.scope.label(), days = series.len(), "aggregated series");
    if let Some(path) = &args.csv {
        export_series(path, &series)?;
    }
    Ok(series)
}

/// Rates estimated from one country's snapshot.
pub struct EstimateReport {
    pub country: String,
    pub snapshot: CountrySnapshot,
    pub params: ModelParameters,
}

pub fn run_estimate(session: &Session, args: &EstimateArgs) -> Result<EstimateReport> {
    let span = info_span!("estimate", country = %args.country);
    let _guard = span.enter();
    let snapshot = fetch_snapshot(session.source.as_ref(), &session.reconciler, &args.country)
        .with_context(|| format!("estimate {}", args.country))?;
    let gamma = args.gamma.unwrap_or(session.config.simulation.gamma);
    let params = estimate_with_gamma(&snapshot, gamma);
    info!(beta = params.beta, r0 = params.r0(), "estimated rates");
    Ok(EstimateReport {
        country: args.country.clone(),
        snapshot,
        params,
    })
}

pub fn run_trajectory(
    session: &Session,
    args: &TrajectoryArgs,
) -> Result<Vec<(String, Simulation)>> {
    let span = info_span!("trajectory", countries = args.countries.len(), days = args.days);
    let _guard = span.enter();
    let inputs = args
        .countries
        .iter()
        .map(|country| {
            fetch_snapshot(session.source.as_ref(), &session.reconciler, country)
                .map(|snapshot| (country.clone(), snapshot))
                .with_context(|| format!("load snapshot for {country}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut options = session.config.simulation;
    if let Some(rounding) = args.rounding {
        options = options.with_rounding(match rounding {
            RoundingArg::None => RoundingPolicy::None,
            RoundingArg::Whole => RoundingPolicy::WholeIndividuals,
        });
    }
    let simulations = Simulator::new(options).run_many(&inputs, args.days);
    if let Some(path) = &args.csv {
        export_simulations(path, &simulations)?;
    }
    Ok(simulations)
}

/// Calibration result with the series it was fitted on.
pub struct FitReport {
    pub scope: Scope,
    pub days: usize,
    pub population: u64,
    pub fitted: FittedParameters,
}

pub fn run_fit(session: &Session, args: &FitArgs) -> Result<FitReport> {
    let span = info_span!("fit");
    let _guard = span.enter();
    let series = session.non_empty(&args.scope)?;
    let population = series
        .population()
        .filter(|population| *population > 0)
        .with_context(|| format!("no population for {}", series.scope.label()))?;

    let mut options = session.config.calibration;
    options = options.with_initial_guess(
        args.beta.unwrap_or(options.initial_beta),
        args.gamma.unwrap_or(options.initial_gamma),
    );
    if let Some(max_iters) = args.max_iters {
        options = options.with_max_iters(max_iters);
    }
    let fitted = Calibrator::new(options)
        .fit(&series.active_curve(), population as f64)
        .with_context(|| format!("fit {}", series.scope.label()))?;
    info!(
        beta = fitted.beta,
        gamma = fitted.gamma,
        iterations = fitted.iterations,
        "calibration finished"
    );
    Ok(FitReport {
        days: series.len(),
        scope: series.scope,
        population,
        fitted,
    })
}

/// Projection from the mean daily rates of a series.
pub struct ProjectReport {
    pub scope: Scope,
    pub params: ModelParameters,
    pub points: Vec<ProjectionPoint>,
}

pub fn run_project(session: &Session, args: &ProjectArgs) -> Result<ProjectReport> {
    let span = info_span!("project");
    let _guard = span.enter();
    let series = session.non_empty(&args.scope)?;
    let label = series.scope.label();
    let rates = daily_rates(&series, session.config.simulation.gamma);
    let mean = mean_rates(&rates)
        .with_context(|| format!("{label} needs at least two days to derive rates"))?;
    let seed = seed_from_series(&series).with_context(|| format!("no seed for {label}"))?;

    let mut options = session.config.projection;
    if let Some(horizon) = args.horizon {
        options.horizon_days = horizon;
    }
    if let Some(samples) = args.samples {
        options.samples = samples;
    }
    let params = ModelParameters {
        alpha: options.alpha,
        ..mean
    };
    let points = project(seed, &params, &options).with_context(|| format!("project {label}"))?;
    if let Some(path) = &args.csv {
        export_projection(path, &label, &points)?;
    }
    Ok(ProjectReport {
        scope: series.scope,
        params,
        points,
    })
}

pub fn run_continents(session: &Session) -> Result<Vec<ContinentSummary>> {
    summarize_continents(session.source.as_ref()).context("summarize continents")
}

/// Returns the active alias table, or writes it to `args.export`.
pub fn run_aliases(session: &Session, args: &AliasesArgs) -> Result<Option<NameMapping>> {
    let mapping = session.reconciler.mapping();
    match &args.export {
        Some(path) => {
            save_mapping(mapping, path)?;
            Ok(None)
        }
        None => Ok(Some(mapping.clone())),
    }
}

fn save_mapping(mapping: &NameMapping, path: &Path) -> Result<()> {
    mapping
        .save(path)
        .with_context(|| format!("write alias table {}", path.display()))?;
    info!(path = %path.display(), aliases = mapping.len(), "exported alias table");
    Ok(())
}
