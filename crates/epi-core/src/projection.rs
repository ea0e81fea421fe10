//! Continuous-time SIRD projection with a fixed-step RK4 integrator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use epi_model::{EpidemicState, ModelParameters, ProjectionOptions, TimeSeries};

use crate::error::ProjectionError;

/// State sampled at time `day`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub day: f64,
    pub state: EpidemicState,
}

/// One classic RK4 step of `dy/dt = f(y)` over `dt`.
fn rk4_step<F>(y: [f64; 4], dt: f64, f: F) -> [f64; 4]
where
    F: Fn(&[f64; 4]) -> [f64; 4],
{
    let offset = |base: &[f64; 4], k: &[f64; 4], scale: f64| -> [f64; 4] {
        std::array::from_fn(|i| base[i] + scale * k[i])
    };
    let k1 = f(&y);
    let k2 = f(&offset(&y, &k1, 0.5 * dt));
    let k3 = f(&offset(&y, &k2, 0.5 * dt));
    let k4 = f(&offset(&y, &k3, dt));
    std::array::from_fn(|i| y[i] + (dt / 6.0) * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
}

/// Integrates the SIRD system with constant `params` from `seed`, sampled on
/// `options.samples` evenly spaced points over `[0, horizon_days]`
/// (both ends included). The population is the seed total.
pub fn project(
    seed: EpidemicState,
    params: &ModelParameters,
    options: &ProjectionOptions,
) -> Result<Vec<ProjectionPoint>, ProjectionError> {
    if !(options.horizon_days.is_finite() && options.horizon_days > 0.0) {
        return Err(ProjectionError::InvalidHorizon(options.horizon_days));
    }
    if options.samples < 2 {
        return Err(ProjectionError::TooFewSamples(options.samples));
    }
    if options.substeps == 0 {
        return Err(ProjectionError::NoSubsteps);
    }

    let n = seed.total();
    let interval = options.horizon_days / (options.samples - 1) as f64;
    let dt = interval / options.substeps as f64;
    let rhs = |y: &[f64; 4]| -> [f64; 4] {
        let d = EpidemicState::from(*y).derivatives(params, n);
        [d.susceptible, d.infected, d.recovered, d.deceased]
    };

    let mut y: [f64; 4] = seed.into();
    let mut points = Vec::with_capacity(options.samples);
    points.push(ProjectionPoint {
        day: 0.0,
        state: seed,
    });
    for sample in 1..options.samples {
        for _ in 0..options.substeps {
            y = rk4_step(y, dt, rhs);
        }
        points.push(ProjectionPoint {
            day: sample as f64 * interval,
            state: EpidemicState::from(y),
        });
    }
    debug!(
        samples = points.len(),
        horizon = options.horizon_days,
        "projection finished"
    );
    Ok(points)
}

/// Seed for a projection from the first point of a series: the observed
/// active, recovered and deceased counts, everyone else susceptible.
pub fn seed_from_series(series: &TimeSeries) -> Option<EpidemicState> {
    let first = series.points.first()?;
    let infected = first.total_active as f64;
    let recovered = first.total_recovered as f64;
    let deceased = first.total_deaths as f64;
    let susceptible = first.population as f64 - infected - recovered - deceased;
    Some(EpidemicState::new(susceptible, infected, recovered, deceased))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rk4_integrates_exponential_decay() {
        // dy/dt = -y, y(0) = 1  =>  y(1) = e^-1
        let mut y = [1.0, 0.0, 0.0, 0.0];
        for _ in 0..100 {
            y = rk4_step(y, 0.01, |v| [-v[0], 0.0, 0.0, 0.0]);
        }
        assert!((y[0] - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn projection_samples_inclusive_grid() {
        let seed = EpidemicState::new(9_990.0, 10.0, 0.0, 0.0);
        let params = ModelParameters::new(0.0, 0.3, 0.1, 0.01);
        let options = ProjectionOptions {
            horizon_days: 10.0,
            samples: 11,
            substeps: 4,
            alpha: 0.0,
        };
        let points = project(seed, &params, &options).expect("projection");
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].state, seed);
        assert!((points[10].day - 10.0).abs() < 1e-12);
        for point in &points {
            assert!((point.state.total() - 10_000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn projection_rejects_bad_options() {
        let seed = EpidemicState::new(1.0, 1.0, 0.0, 0.0);
        let params = ModelParameters::new(0.0, 0.3, 0.1, 0.0);
        let options = ProjectionOptions {
            samples: 1,
            ..ProjectionOptions::default()
        };
        assert_eq!(
            project(seed, &params, &options),
            Err(ProjectionError::TooFewSamples(1))
        );
    }
}
