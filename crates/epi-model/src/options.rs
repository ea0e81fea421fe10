//! Configuration options for estimation, simulation and calibration.

use serde::{Deserialize, Serialize};

use crate::epidemic::GAMMA;
use crate::error::{ModelError, Result};

/// How per-step deltas are rounded before they are fed back into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Keep fractional individuals.
    None,
    /// Round every delta to a whole individual.
    #[default]
    WholeIndividuals,
}

impl RoundingPolicy {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::None => value,
            Self::WholeIndividuals => value.round(),
        }
    }
}

/// What the aggregator does with country names it cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Fail the whole query on the first unresolved name.
    Strict,
    /// Leave the name out of the population sum and report it.
    #[default]
    Collect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    pub unresolved: UnresolvedPolicy,
}

impl AggregateOptions {
    pub fn strict() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Strict,
        }
    }
}

/// Options for the discrete-time simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Recovery rate held fixed for the whole run.
    pub gamma: f64,
    /// Rounding applied to deltas in self-re-estimating mode.
    pub rounding: RoundingPolicy,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            gamma: GAMMA,
            rounding: RoundingPolicy::default(),
        }
    }
}

impl SimulationOptions {
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    #[must_use]
    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }
}

/// Closed interval used to bound a fitted parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
            return Err(ModelError::InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: 0.001,
            upper: 10.0,
        }
    }
}

/// Options for the least-squares calibration of `(beta, gamma)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationOptions {
    pub initial_beta: f64,
    pub initial_gamma: f64,
    pub beta_bounds: Bounds,
    pub gamma_bounds: Bounds,
    /// Reinfection rate held fixed while fitting.
    pub alpha: f64,
    /// Death rate held fixed while fitting.
    pub mu: f64,
    pub max_iters: u64,
    /// Nelder-Mead stops once the cost spread across the simplex drops below this.
    pub sd_tolerance: f64,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            initial_beta: 0.3,
            initial_gamma: 0.1,
            beta_bounds: Bounds::default(),
            gamma_bounds: Bounds::default(),
            alpha: 0.0,
            mu: 0.0,
            max_iters: 2_000,
            sd_tolerance: 1e-8,
        }
    }
}

impl CalibrationOptions {
    #[must_use]
    pub fn with_initial_guess(mut self, beta: f64, gamma: f64) -> Self {
        self.initial_beta = beta;
        self.initial_gamma = gamma;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, beta: Bounds, gamma: Bounds) -> Self {
        self.beta_bounds = beta;
        self.gamma_bounds = gamma;
        self
    }

    #[must_use]
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }
}

/// Options for the continuous-time projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    pub horizon_days: f64,
    /// Number of evenly spaced sample points over `[0, horizon_days]`.
    pub samples: usize,
    /// RK4 steps taken between two consecutive samples.
    pub substeps: usize,
    /// Reinfection rate; the daily rate series carries no estimate of it.
    pub alpha: f64,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            horizon_days: 180.0,
            samples: 180,
            substeps: 10,
            alpha: 0.01,
        }
    }
}
