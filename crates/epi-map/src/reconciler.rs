//! Resolves a country across the snapshot and population datasets.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use epi_ingest::DataConnection;
use epi_model::PopulationRecord;

use crate::error::{ReconcileError, Result};
use crate::mapping::NameMapping;
use crate::suggest::suggest;

const MAX_SUGGESTIONS: usize = 3;

/// How a country was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Direct,
    Alias,
    Override,
}

/// A country identified in both datasets, with its population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// Spelling used by the snapshot and daily tables.
    pub country_name: String,
    /// Spelling used by the population table; `None` for overrides.
    pub population_name: Option<String>,
    pub population: u64,
    pub continent: Option<String>,
    pub source: ResolutionSource,
}

/// Name reconciler. Uses the built-in alias table unless one is supplied.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    mapping: Option<NameMapping>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mapping: NameMapping) -> Self {
        Self {
            mapping: Some(mapping),
        }
    }

    pub fn mapping(&self) -> &NameMapping {
        self.mapping.as_ref().unwrap_or_else(|| NameMapping::builtin())
    }

    /// Resolves `name`: override, direct join, alias (A side then B side),
    /// otherwise `NotFound` with suggestions.
    pub fn resolve(&self, conn: &dyn DataConnection, name: &str) -> Result<ResolvedIdentity> {
        let name = name.trim();
        let mapping = self.mapping();

        if let Some(entry) = mapping.override_for(name) {
            trace!(country = name, "resolved by override");
            return Ok(ResolvedIdentity {
                country_name: dataset_a_name(conn, name).unwrap_or_else(|| entry.country.clone()),
                population_name: None,
                population: entry.population,
                continent: entry.continent.clone(),
                source: ResolutionSource::Override,
            });
        }

        if let Some(found) = join(conn, name, name, ResolutionSource::Direct) {
            return found;
        }

        let mapped = [
            mapping.to_dataset_b(name).map(|b| (name, b)),
            mapping.to_dataset_a(name).map(|a| (a, name)),
        ];
        for (a, b) in mapped.into_iter().flatten() {
            if let Some(found) = join(conn, a, b, ResolutionSource::Alias) {
                trace!(country = name, dataset_a = a, dataset_b = b, "resolved by alias");
                return found;
            }
        }

        let suggestions = suggest(name, known_names(conn, mapping), MAX_SUGGESTIONS);
        debug!(country = name, ?suggestions, "country not resolved");
        Err(ReconcileError::NotFound {
            name: name.to_string(),
            suggestions,
        })
    }

    /// Population row behind a resolved identity, for the alternative totals.
    pub fn population_row<'c>(
        &self,
        conn: &'c dyn DataConnection,
        identity: &ResolvedIdentity,
    ) -> Option<&'c PopulationRecord> {
        identity
            .population_name
            .as_deref()
            .and_then(|name| conn.population_row(name))
    }
}

/// Joins a dataset A name with a dataset B name. `None` when either side is
/// missing.
fn join(
    conn: &dyn DataConnection,
    a: &str,
    b: &str,
    source: ResolutionSource,
) -> Option<Result<ResolvedIdentity>> {
    let country_name = dataset_a_name(conn, a)?;
    let row = conn.population_row(b)?;
    let Some(population) = row.population else {
        return Some(Err(ReconcileError::MissingPopulation {
            country: country_name,
        }));
    };
    let continent = row.continent.clone().or_else(|| {
        conn.country_row(&country_name)
            .and_then(|snapshot| snapshot.region.clone())
    });
    Some(Ok(ResolvedIdentity {
        country_name,
        population_name: Some(row.country.clone()),
        population,
        continent,
        source,
    }))
}

/// Canonical dataset A spelling: the snapshot table first, then the daily
/// table.
fn dataset_a_name(conn: &dyn DataConnection, name: &str) -> Option<String> {
    if let Some(row) = conn.country_row(name) {
        return Some(row.country.clone());
    }
    conn.daily_rows()
        .iter()
        .find(|row| row.country.eq_ignore_ascii_case(name))
        .map(|row| row.country.clone())
}

fn known_names<'c>(
    conn: &'c dyn DataConnection,
    mapping: &'c NameMapping,
) -> impl Iterator<Item = &'c str> {
    conn.countries()
        .iter()
        .map(|row| row.country.as_str())
        .chain(conn.populations().iter().map(|row| row.country.as_str()))
        .chain(mapping.overrides.iter().map(|entry| entry.country.as_str()))
}
