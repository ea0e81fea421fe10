//! Day-indexed aggregate series.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::scope::Scope;

const MILLION: f64 = 1_000_000.0;

/// One day of an aggregated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub total_confirmed: i64,
    pub total_deaths: i64,
    pub total_recovered: i64,
    pub total_active: i64,
    pub population: u64,
}

impl TimeSeriesPoint {
    /// Deaths over confirmed cases; `None` while nothing is confirmed.
    pub fn case_fatality_rate(&self) -> Option<f64> {
        if self.total_confirmed <= 0 {
            return None;
        }
        Some(self.total_deaths as f64 / self.total_confirmed as f64)
    }

    /// Counts rescaled to cases per million inhabitants.
    pub fn per_million(&self) -> Option<PerMillionPoint> {
        if self.population == 0 {
            return None;
        }
        let scale = MILLION / self.population as f64;
        Some(PerMillionPoint {
            date: self.date,
            confirmed: self.total_confirmed as f64 * scale,
            deaths: self.total_deaths as f64 * scale,
            recovered: self.total_recovered as f64 * scale,
            active: self.total_active as f64 * scale,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerMillionPoint {
    pub date: NaiveDate,
    pub confirmed: f64,
    pub deaths: f64,
    pub recovered: f64,
    pub active: f64,
}

/// Optional requested date bounds, clamped against the observed span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parses `YYYY-MM-DD` bounds; blank strings mean "unbounded".
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: parse_optional_date(start)?,
            end: parse_optional_date(end)?,
        })
    }

    /// Clamps the window into `[observed_min, observed_max]`.
    ///
    /// Returns `None` when the clamped window is empty (for example a range
    /// lying entirely before the first observation).
    pub fn clamp(
        &self,
        observed_min: NaiveDate,
        observed_max: NaiveDate,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let start = self
            .start
            .map_or(observed_min, |start| start.max(observed_min));
        let end = self.end.map_or(observed_max, |end| end.min(observed_max));
        (start <= end).then_some((start, end))
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ModelError::InvalidDate {
            value: raw.to_string(),
        })
}

/// Result of an aggregation query.
///
/// `unresolved` lists the country names whose population could not be
/// resolved; when it is non-empty the population attached to every point is
/// a partial sum and per-capita figures must be read with that in mind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub scope: Scope,
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub points: Vec<TimeSeriesPoint>,
    pub unresolved: BTreeSet<String>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.unresolved.is_empty()
    }

    pub fn population(&self) -> Option<u64> {
        self.points.first().map(|point| point.population)
    }

    /// The observed active-case curve, as used for calibration.
    pub fn active_curve(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|point| point.total_active as f64)
            .collect()
    }
}
