use serde::{Deserialize, Serialize};

use crate::records::{CountryRecord, PopulationRecord};

/// A point-in-time record for one country, joining the snapshot table with
/// the population table.
///
/// Counts are the latest cumulative values; the `new_*` fields are the most
/// recent daily deltas. The `*_alt` fields come from the population source
/// and are kept for cross-checking only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySnapshot {
    pub active: i64,
    pub new_cases: i64,
    pub recovered: i64,
    pub new_recovered: i64,
    pub deaths: i64,
    pub new_deaths: i64,
    pub population: u64,
    pub active_cases_alt: Option<i64>,
    pub total_deaths_alt: Option<i64>,
    pub total_recovered_alt: Option<i64>,
}

impl CountrySnapshot {
    /// Joins a snapshot row with an optional population row.
    ///
    /// `population` is passed separately because it may come from an
    /// override rather than from `alt`.
    pub fn join(row: &CountryRecord, population: u64, alt: Option<&PopulationRecord>) -> Self {
        Self {
            active: row.active,
            new_cases: row.new_cases,
            recovered: row.recovered,
            new_recovered: row.new_recovered,
            deaths: row.deaths,
            new_deaths: row.new_deaths,
            population,
            active_cases_alt: alt.and_then(|p| p.active_cases),
            total_deaths_alt: alt.and_then(|p| p.total_deaths),
            total_recovered_alt: alt.and_then(|p| p.total_recovered),
        }
    }

    /// Active cases on the day before the snapshot.
    pub fn previous_active(&self) -> i64 {
        self.active - self.new_cases
    }

    /// Recovered count on the day before the snapshot.
    pub fn previous_recovered(&self) -> i64 {
        self.recovered - self.new_recovered
    }

    /// Death count on the day before the snapshot.
    pub fn previous_deaths(&self) -> i64 {
        self.deaths - self.new_deaths
    }

    /// Susceptible count on the day before the snapshot.
    pub fn previous_susceptible(&self) -> i64 {
        self.population as i64
            - (self.previous_active() + self.previous_recovered() + self.previous_deaths())
    }
}
