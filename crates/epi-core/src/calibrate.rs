//! Least-squares calibration of `(beta, gamma)` against an active-case curve.

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use epi_model::{Bounds, CalibrationOptions, EpidemicState, ModelParameters};

use crate::error::CalibrationError;

/// Fitted rates and the residual cost they reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedParameters {
    pub beta: f64,
    pub gamma: f64,
    pub r0: f64,
    /// Sum of squared residuals at the optimum.
    pub cost: f64,
    pub iterations: u64,
}

/// Sum of squared differences between the simulated infected compartment
/// and the observed curve. Candidates outside the bounds cost `+inf`.
struct ActiveCurveCost<'a> {
    observed: &'a [f64],
    seed: EpidemicState,
    alpha: f64,
    mu: f64,
    beta_bounds: Bounds,
    gamma_bounds: Bounds,
}

impl ActiveCurveCost<'_> {
    fn sum_squared_error(&self, beta: f64, gamma: f64) -> f64 {
        let params = ModelParameters::new(self.alpha, beta, gamma, self.mu);
        let n = self.seed.total();
        let mut state = self.seed;
        let mut total = 0.0;
        for (day, observed) in self.observed.iter().enumerate() {
            if day > 0 {
                state = state.apply(&state.derivatives(&params, n));
            }
            let residual = state.infected - observed;
            total += residual * residual;
        }
        if total.is_finite() { total } else { f64::INFINITY }
    }
}

impl CostFunction for ActiveCurveCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let [beta, gamma] = param.as_slice() else {
            return Ok(f64::INFINITY);
        };
        let admissible = *beta > 0.0
            && *gamma > 0.0
            && self.beta_bounds.contains(*beta)
            && self.gamma_bounds.contains(*gamma);
        if !admissible {
            return Ok(f64::INFINITY);
        }
        Ok(self.sum_squared_error(*beta, *gamma))
    }
}

/// Bounded Nelder-Mead fit of the fixed-rate recurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calibrator {
    options: CalibrationOptions,
}

impl Calibrator {
    pub fn new(options: CalibrationOptions) -> Self {
        Self { options }
    }

    /// Fits against `observed` with everyone but the first observed active
    /// cases susceptible at day 0.
    pub fn fit(
        &self,
        observed: &[f64],
        population: f64,
    ) -> Result<FittedParameters, CalibrationError> {
        if !(population.is_finite() && population > 0.0) {
            return Err(CalibrationError::InvalidPopulation(population));
        }
        let infected = observed.first().copied().unwrap_or_default();
        let seed = EpidemicState::new(population - infected, infected, 0.0, 0.0);
        self.fit_from_seed(seed, observed)
    }

    pub fn fit_from_seed(
        &self,
        seed: EpidemicState,
        observed: &[f64],
    ) -> Result<FittedParameters, CalibrationError> {
        let options = &self.options;
        if observed.len() < 2 {
            return Err(CalibrationError::TooFewObservations(observed.len()));
        }
        if let Some(index) = observed.iter().position(|value| !value.is_finite()) {
            return Err(CalibrationError::NonFiniteObservation(index));
        }
        let population = seed.total();
        if !(population.is_finite() && population > 0.0) {
            return Err(CalibrationError::InvalidPopulation(population));
        }
        let (beta, gamma) = (options.initial_beta, options.initial_gamma);
        if !(options.beta_bounds.contains(beta) && options.gamma_bounds.contains(gamma)) {
            return Err(CalibrationError::GuessOutOfBounds { beta, gamma });
        }

        let span = info_span!("calibrate", points = observed.len(), population);
        let _guard = span.enter();

        let cost = ActiveCurveCost {
            observed,
            seed,
            alpha: options.alpha,
            mu: options.mu,
            beta_bounds: options.beta_bounds,
            gamma_bounds: options.gamma_bounds,
        };
        let simplex = vec![
            vec![beta, gamma],
            vec![perturb(beta, options.beta_bounds), gamma],
            vec![beta, perturb(gamma, options.gamma_bounds)],
        ];
        let solver = NelderMead::new(simplex).with_sd_tolerance(options.sd_tolerance)?;
        let result = Executor::new(cost, solver)
            .configure(|state| state.max_iters(options.max_iters))
            .run()?;

        let state = result.state();
        let iterations = state.get_iter();
        let status = state.get_termination_status();
        if !matches!(
            status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        ) {
            debug!(iterations, ?status, "calibration stopped early");
            return Err(CalibrationError::NotConverged {
                iterations,
                reason: format!("{status:?}"),
            });
        }
        let best_cost = state.get_best_cost();
        let Some([beta, gamma]) = state
            .get_best_param()
            .and_then(|param| <[f64; 2]>::try_from(param.as_slice()).ok())
        else {
            return Err(CalibrationError::Optimizer(
                "optimizer returned no parameters".to_string(),
            ));
        };
        if !best_cost.is_finite() {
            return Err(CalibrationError::NotConverged {
                iterations,
                reason: "no admissible point found".to_string(),
            });
        }

        let fitted = FittedParameters {
            beta,
            gamma,
            r0: beta / gamma,
            cost: best_cost,
            iterations,
        };
        info!(
            beta = fitted.beta,
            gamma = fitted.gamma,
            r0 = fitted.r0,
            cost = fitted.cost,
            iterations,
            "calibration converged"
        );
        Ok(fitted)
    }
}

/// Second simplex vertex along one axis, kept inside the bounds.
fn perturb(value: f64, bounds: Bounds) -> f64 {
    let step = (value * 0.05).max(1e-3);
    if bounds.contains(value + step) {
        value + step
    } else {
        value - step
    }
}
