//! Raw rows as supplied by the data layer.
//!
//! Three tables feed the core:
//!
//! - **daily**: one row per `(date, region, country, province)` with cumulative
//!   counts (the "complete" table).
//! - **country snapshot**: one row per country with the latest cumulative
//!   counts plus the most recent daily deltas (dataset A naming).
//! - **population**: one row per country with population and alternative
//!   totals (dataset B naming).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Continent-level region (WHO region in the source data).
    pub region: String,
    pub country: String,
    pub province: Option<String>,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
}

impl DailyRecord {
    /// Key used to drop duplicated rows for the same place and day.
    pub fn identity(&self) -> (NaiveDate, String, String, String) {
        (
            self.date,
            self.region.to_ascii_uppercase(),
            self.country.to_ascii_uppercase(),
            self.province
                .as_deref()
                .unwrap_or_default()
                .to_ascii_uppercase(),
        )
    }
}

/// Country snapshot row (dataset A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country: String,
    pub region: Option<String>,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
    pub new_cases: i64,
    pub new_deaths: i64,
    pub new_recovered: i64,
}

/// Population reference row (dataset B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub country: String,
    pub continent: Option<String>,
    pub population: Option<u64>,
    pub total_cases: Option<i64>,
    pub total_deaths: Option<i64>,
    pub total_recovered: Option<i64>,
    pub active_cases: Option<i64>,
}
