//! Day-indexed aggregation over a region scope.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn};

use epi_ingest::{DataConnection, DataSource};
use epi_map::Reconciler;
use epi_model::{
    AggregateOptions, DailyRecord, DateWindow, RegionName, Scope, TimeSeries, TimeSeriesPoint,
    UnresolvedPolicy,
};

use crate::error::QueryResult;

#[derive(Default, Clone, Copy)]
struct Totals {
    confirmed: i64,
    deaths: i64,
    recovered: i64,
    active: i64,
}

impl Totals {
    fn add(&mut self, row: &DailyRecord) {
        self.confirmed += row.confirmed;
        self.deaths += row.deaths;
        self.recovered += row.recovered;
        self.active += row.active;
    }
}

/// Builds time series for a scope from a data source.
pub struct Aggregator<'a> {
    source: &'a dyn DataSource,
    reconciler: &'a Reconciler,
    options: AggregateOptions,
}

impl<'a> Aggregator<'a> {
    pub fn new(source: &'a dyn DataSource, reconciler: &'a Reconciler) -> Self {
        Self {
            source,
            reconciler,
            options: AggregateOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: AggregateOptions) -> Self {
        self.options = options;
        self
    }

    /// Sums the daily rows inside `scope` per date over the clamped window.
    ///
    /// A window that does not overlap the observed dates yields an empty
    /// series. The country of a country or province scope is resolved first
    /// and rows are matched on its snapshot-table spelling, so either
    /// dataset's name selects the same rows. An unresolvable country there
    /// is an error; for global and continent scopes the policy in
    /// [`AggregateOptions`] decides whether an unresolved country fails the
    /// query or is reported in [`TimeSeries::unresolved`].
    pub fn aggregate(&self, scope: &Scope, window: DateWindow) -> QueryResult<TimeSeries> {
        let span = info_span!("aggregate", scope = %scope);
        let _guard = span.enter();
        let start = Instant::now();

        let conn = self.source.connect()?;
        let Some((min, max)) = conn.date_range() else {
            debug!("no daily rows");
            return Ok(empty_series(scope));
        };
        let Some((from, to)) = window.clamp(min, max) else {
            debug!(%min, %max, "window outside observed dates");
            return Ok(empty_series(scope));
        };

        let (rows_scope, population, unresolved) = match scope.country() {
            Some(country) => {
                let identity = self.reconciler.resolve(conn.as_ref(), country.as_str())?;
                let canonical = RegionName::new(identity.country_name)?;
                (scope.with_country(canonical), identity.population, BTreeSet::new())
            }
            None => {
                let (population, unresolved) = self.pooled_population(conn.as_ref(), scope)?;
                (scope.clone(), population, unresolved)
            }
        };

        let mut by_date: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
        for row in conn.daily_rows() {
            if row.date >= from && row.date <= to && rows_scope.contains(row) {
                by_date.entry(row.date).or_default().add(row);
            }
        }

        let points: Vec<TimeSeriesPoint> = by_date
            .into_iter()
            .map(|(date, totals)| TimeSeriesPoint {
                date,
                total_confirmed: totals.confirmed,
                total_deaths: totals.deaths,
                total_recovered: totals.recovered,
                total_active: totals.active,
                population,
            })
            .collect();

        if !unresolved.is_empty() {
            warn!(
                count = unresolved.len(),
                names = ?unresolved,
                "population is a partial sum"
            );
        }
        info!(
            rows = points.len(),
            %from,
            %to,
            population,
            duration_ms = start.elapsed().as_millis() as u64,
            "aggregated series"
        );
        Ok(TimeSeries {
            scope: scope.clone(),
            window: Some((from, to)),
            points,
            unresolved,
        })
    }

    /// Population of a global or continent scope: the sum over the distinct
    /// countries seen in it.
    fn pooled_population(
        &self,
        conn: &dyn DataConnection,
        scope: &Scope,
    ) -> QueryResult<(u64, BTreeSet<String>)> {
        let countries: BTreeSet<&str> = conn
            .daily_rows()
            .iter()
            .filter(|row| scope.contains(row))
            .map(|row| row.country.as_str())
            .collect();

        // Keyed by the population-side name so two spellings of one country
        // are counted once.
        let mut resolved: BTreeMap<String, u64> = BTreeMap::new();
        let mut unresolved = BTreeSet::new();
        for country in countries {
            match self.reconciler.resolve(conn, country) {
                Ok(identity) => {
                    let key = identity
                        .population_name
                        .unwrap_or(identity.country_name)
                        .to_ascii_uppercase();
                    resolved.insert(key, identity.population);
                }
                Err(err) => match self.options.unresolved {
                    UnresolvedPolicy::Strict => return Err(err.into()),
                    UnresolvedPolicy::Collect => {
                        debug!(country, error = %err, "skipping unresolved country");
                        unresolved.insert(country.to_string());
                    }
                },
            }
        }
        Ok((resolved.values().sum(), unresolved))
    }
}

fn empty_series(scope: &Scope) -> TimeSeries {
    TimeSeries {
        scope: scope.clone(),
        window: None,
        points: Vec::new(),
        unresolved: BTreeSet::new(),
    }
}
