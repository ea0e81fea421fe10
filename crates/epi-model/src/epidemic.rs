//! Compartment state and transition rates of the SIRD model.

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Recovery rate used throughout: one recovery per 4.5 days of infection.
pub const GAMMA: f64 = 1.0 / 4.5;

/// Transition rates of the SIRD model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Reinfection rate (recovered back to susceptible).
    pub alpha: f64,
    /// Transmission rate.
    pub beta: f64,
    /// Recovery rate.
    pub gamma: f64,
    /// Death rate.
    pub mu: f64,
}

impl ModelParameters {
    pub fn new(alpha: f64, beta: f64, gamma: f64, mu: f64) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            mu,
        }
    }

    /// Reproduction number `beta / gamma`; zero when gamma is not positive.
    pub fn r0(&self) -> f64 {
        if self.gamma > 0.0 {
            self.beta / self.gamma
        } else {
            0.0
        }
    }

    /// Arithmetic mean of a parameter series, `None` for an empty series.
    pub fn mean<'a, I>(series: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ModelParameters>,
    {
        let mut count = 0usize;
        let mut sum = Self::new(0.0, 0.0, 0.0, 0.0);
        for params in series {
            count += 1;
            sum.alpha += params.alpha;
            sum.beta += params.beta;
            sum.gamma += params.gamma;
            sum.mu += params.mu;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self::new(sum.alpha / n, sum.beta / n, sum.gamma / n, sum.mu / n))
    }
}

/// Compartment sizes at one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpidemicState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub deceased: f64,
}

impl EpidemicState {
    pub fn new(susceptible: f64, infected: f64, recovered: f64, deceased: f64) -> Self {
        Self {
            susceptible,
            infected,
            recovered,
            deceased,
        }
    }

    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered + self.deceased
    }

    /// Right-hand side of the SIRD equations for a constant population `n`.
    #[allow(clippy::many_single_char_names)]
    pub fn derivatives(&self, params: &ModelParameters, n: f64) -> Deltas {
        let s = self.susceptible;
        let i = self.infected;
        let r = self.recovered;
        let infection = if n > 0.0 {
            params.beta * s * i / n
        } else {
            0.0
        };
        Deltas {
            susceptible: params.alpha * r - infection,
            infected: infection - params.mu * i - params.gamma * i,
            recovered: params.gamma * i - params.alpha * r,
            deceased: params.mu * i,
        }
    }

    pub fn apply(&self, deltas: &Deltas) -> Self {
        Self {
            susceptible: self.susceptible + deltas.susceptible,
            infected: self.infected + deltas.infected,
            recovered: self.recovered + deltas.recovered,
            deceased: self.deceased + deltas.deceased,
        }
    }
}

impl From<EpidemicState> for [f64; 4] {
    fn from(state: EpidemicState) -> Self {
        [
            state.susceptible,
            state.infected,
            state.recovered,
            state.deceased,
        ]
    }
}

impl From<[f64; 4]> for EpidemicState {
    fn from(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// Per-step change of every compartment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deltas {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub deceased: f64,
}

/// Reproduction number per simulated day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReproductionTrajectory(Vec<f64>);

impl ReproductionTrajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }
}

impl Index<usize> for ReproductionTrajectory {
    type Output = f64;

    fn index(&self, day: usize) -> &f64 {
        &self.0[day]
    }
}

impl FromIterator<f64> for ReproductionTrajectory {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
