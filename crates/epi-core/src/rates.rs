//! Day-by-day rate estimates from an aggregated series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use epi_model::{ModelParameters, TimeSeries};

/// Rates estimated for one day of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub date: NaiveDate,
    pub params: ModelParameters,
}

impl DailyRate {
    pub fn r0(&self) -> f64 {
        self.params.r0()
    }
}

/// Per-day `mu` and `beta` from consecutive points of `series`.
///
/// For day `t` with active cases `I`, confirmed `C` and population `N`:
/// `mu = dD / I` and `beta = (dI + mu * I + gamma * I) * N / (I * (N - C))`.
/// The first day has no predecessor and is skipped. `alpha` is not
/// estimated here and stays zero.
pub fn daily_rates(series: &TimeSeries, gamma: f64) -> Vec<DailyRate> {
    series
        .points
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let i = cur.total_active as f64;
            let n = cur.population as f64;
            let c = cur.total_confirmed as f64;
            let d_i = (cur.total_active - prev.total_active) as f64;
            let d_d = (cur.total_deaths - prev.total_deaths) as f64;

            let mu = if i > 0.0 { d_d / i } else { 0.0 };
            let denominator = i * (n - c);
            let beta = if i > 0.0 && denominator > 0.0 {
                (d_i + mu * i + gamma * i) * n / denominator
            } else {
                0.0
            };
            DailyRate {
                date: cur.date,
                params: ModelParameters::new(0.0, beta, gamma, mu),
            }
        })
        .collect()
}

/// Arithmetic mean of the daily rates, `None` for fewer than two points.
pub fn mean_rates(rates: &[DailyRate]) -> Option<ModelParameters> {
    ModelParameters::mean(rates.iter().map(|rate| &rate.params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use epi_model::{Scope, TimeSeriesPoint};
    use std::collections::BTreeSet;

    fn point(day: u32, confirmed: i64, deaths: i64, active: i64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date: NaiveDate::from_ymd_opt(2020, 4, day).expect("date"),
            total_confirmed: confirmed,
            total_deaths: deaths,
            total_recovered: confirmed - deaths - active,
            total_active: active,
            population: 10_000,
        }
    }

    fn series(points: Vec<TimeSeriesPoint>) -> TimeSeries {
        TimeSeries {
            scope: Scope::Global,
            window: None,
            points,
            unresolved: BTreeSet::new(),
        }
    }

    #[test]
    fn rates_follow_difference_formulas() {
        let s = series(vec![point(1, 100, 2, 80), point(2, 130, 4, 100)]);
        let rates = daily_rates(&s, 0.25);
        assert_eq!(rates.len(), 1);
        let mu = 2.0 / 100.0;
        let beta = (20.0 + mu * 100.0 + 0.25 * 100.0) * 10_000.0 / (100.0 * (10_000.0 - 130.0));
        assert!((rates[0].params.mu - mu).abs() < 1e-12);
        assert!((rates[0].params.beta - beta).abs() < 1e-12);
        assert!((rates[0].r0() - beta / 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_active_gives_zero_rates() {
        let s = series(vec![point(1, 10, 0, 5), point(2, 10, 1, 0)]);
        let rates = daily_rates(&s, 0.25);
        assert_eq!(rates[0].params.mu, 0.0);
        assert_eq!(rates[0].params.beta, 0.0);
    }

    #[test]
    fn single_point_has_no_rates() {
        let s = series(vec![point(1, 10, 0, 5)]);
        assert!(daily_rates(&s, 0.25).is_empty());
        assert!(mean_rates(&[]).is_none());
    }
}
