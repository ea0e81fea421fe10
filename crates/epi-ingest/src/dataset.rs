//! In-memory bundle of the three source tables.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use epi_model::{CountryRecord, DailyRecord, PopulationRecord};

use crate::error::{IngestError, Result};
use crate::tables::{read_country_table, read_daily_table, read_population_table};

/// File names of the three tables inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub daily: String,
    pub countries: String,
    pub populations: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            daily: "full_grouped.csv".to_string(),
            countries: "country_wise_latest.csv".to_string(),
            populations: "worldometer_data.csv".to_string(),
        }
    }
}

/// Daily, country-snapshot and population rows held together.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    daily: Vec<DailyRecord>,
    countries: Vec<CountryRecord>,
    populations: Vec<PopulationRecord>,
}

impl Dataset {
    /// Builds a dataset, dropping repeated daily rows for the same place and
    /// day (first occurrence wins).
    pub fn new(
        daily: Vec<DailyRecord>,
        countries: Vec<CountryRecord>,
        populations: Vec<PopulationRecord>,
    ) -> Self {
        let before = daily.len();
        let mut seen = HashSet::with_capacity(before);
        let daily: Vec<DailyRecord> = daily
            .into_iter()
            .filter(|row| seen.insert(row.identity()))
            .collect();
        if daily.len() < before {
            debug!(dropped = before - daily.len(), "dropped duplicate daily rows");
        }
        Self {
            daily,
            countries,
            populations,
        }
    }

    /// Loads the three tables from `dir`.
    pub fn load(dir: &Path, files: &DatasetFiles) -> Result<Self> {
        if !dir.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        let daily = read_daily_table(&dir.join(&files.daily))?;
        let countries = read_country_table(&dir.join(&files.countries))?;
        let populations = read_population_table(&dir.join(&files.populations))?;
        let dataset = Self::new(daily, countries, populations);
        info!(
            dir = %dir.display(),
            daily = dataset.daily.len(),
            countries = dataset.countries.len(),
            populations = dataset.populations.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn daily(&self) -> &[DailyRecord] {
        &self.daily
    }

    pub fn countries(&self) -> &[CountryRecord] {
        &self.countries
    }

    pub fn populations(&self) -> &[PopulationRecord] {
        &self.populations
    }

    /// Earliest and latest date in the daily table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.daily.iter().map(|row| row.date).min()?;
        let max = self.daily.iter().map(|row| row.date).max()?;
        Some((min, max))
    }

    /// Snapshot row whose country name equals `name` (case-insensitive).
    pub fn country_row(&self, name: &str) -> Option<&CountryRecord> {
        let name = name.trim();
        self.countries
            .iter()
            .find(|row| row.country.eq_ignore_ascii_case(name))
    }

    /// Population row whose country name equals `name` (case-insensitive).
    pub fn population_row(&self, name: &str) -> Option<&PopulationRecord> {
        let name = name.trim();
        self.populations
            .iter()
            .find(|row| row.country.eq_ignore_ascii_case(name))
    }
}
