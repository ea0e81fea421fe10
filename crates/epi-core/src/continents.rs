//! Per-continent totals from the population table.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

use epi_ingest::DataSource;

use crate::error::QueryResult;

const MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentSummary {
    pub continent: String,
    pub countries: usize,
    pub population: u64,
    pub total_cases: i64,
    pub total_deaths: i64,
    pub total_recovered: i64,
    /// Countries with no population figure. Their counts are in the totals
    /// but `population` lacks them, so per-million figures are withheld.
    pub missing_population: BTreeSet<String>,
}

impl ContinentSummary {
    pub fn is_partial(&self) -> bool {
        !self.missing_population.is_empty()
    }

    fn per_million(&self, count: i64) -> Option<f64> {
        (self.population > 0 && !self.is_partial())
            .then(|| count as f64 * MILLION / self.population as f64)
    }

    pub fn cases_per_million(&self) -> Option<f64> {
        self.per_million(self.total_cases)
    }

    pub fn deaths_per_million(&self) -> Option<f64> {
        self.per_million(self.total_deaths)
    }

    pub fn recovered_per_million(&self) -> Option<f64> {
        self.per_million(self.total_recovered)
    }
}

/// Sums cases, deaths, recovered and population per continent. Rows without
/// a continent are skipped and missing case figures count as zero. A missing
/// population is never counted as zero: the country is listed in
/// [`ContinentSummary::missing_population`] instead.
pub fn summarize_continents(source: &dyn DataSource) -> QueryResult<Vec<ContinentSummary>> {
    let span = info_span!("continents");
    let _guard = span.enter();

    let conn = source.connect()?;
    let mut by_continent: BTreeMap<&str, ContinentSummary> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in conn.populations() {
        let Some(continent) = row.continent.as_deref() else {
            skipped += 1;
            continue;
        };
        let summary = by_continent
            .entry(continent)
            .or_insert_with(|| ContinentSummary {
                continent: continent.to_string(),
                countries: 0,
                population: 0,
                total_cases: 0,
                total_deaths: 0,
                total_recovered: 0,
                missing_population: BTreeSet::new(),
            });
        summary.countries += 1;
        match row.population {
            Some(population) => summary.population += population,
            None => {
                summary.missing_population.insert(row.country.clone());
            }
        }
        summary.total_cases += row.total_cases.unwrap_or_default();
        summary.total_deaths += row.total_deaths.unwrap_or_default();
        summary.total_recovered += row.total_recovered.unwrap_or_default();
    }
    for summary in by_continent.values().filter(|summary| summary.is_partial()) {
        warn!(
            continent = %summary.continent,
            names = ?summary.missing_population,
            "continent population is a partial sum"
        );
    }
    debug!(continents = by_continent.len(), skipped, "summarized continents");
    Ok(by_continent.into_values().collect())
}
