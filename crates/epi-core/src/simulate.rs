//! Discrete-time SIRD simulation.
//!
//! Two modes share one Euler step:
//!
//! - **fixed**: the same rates for every day;
//! - **self-re-estimating**: after each day the rates for the next day are
//!   re-derived from the deltas just produced, and `beta / gamma` is
//!   recorded as that day's reproduction number.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use epi_model::{
    CountrySnapshot, Deltas, EpidemicState, ModelParameters, ReproductionTrajectory,
    SimulationOptions,
};

use crate::estimate::{balance_rates, estimate_with_gamma, previous_state};

/// One simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStep {
    pub day: usize,
    /// State at the start of the day.
    pub state: EpidemicState,
    /// Rates used to advance this day.
    pub params: ModelParameters,
    /// Deltas applied, after rounding.
    pub deltas: Deltas,
    /// State at the end of the day.
    pub next_state: EpidemicState,
    /// Rates re-derived from `deltas`, used for the following day.
    pub next_params: ModelParameters,
}

impl SimulationStep {
    /// Reproduction number recorded for this day.
    pub fn r0(&self) -> f64 {
        self.next_params.r0()
    }
}

/// Output of a self-re-estimating run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub population: f64,
    pub initial: EpidemicState,
    pub steps: Vec<SimulationStep>,
}

impl Simulation {
    pub fn trajectory(&self) -> ReproductionTrajectory {
        self.steps.iter().map(SimulationStep::r0).collect()
    }

    /// Initial state followed by the state after every day.
    pub fn states(&self) -> Vec<EpidemicState> {
        std::iter::once(self.initial)
            .chain(self.steps.iter().map(|step| step.next_state))
            .collect()
    }

    pub fn final_state(&self) -> EpidemicState {
        self.steps
            .last()
            .map_or(self.initial, |step| step.next_state)
    }

    /// Rates the run started from.
    pub fn initial_params(&self) -> Option<ModelParameters> {
        self.steps.first().map(|step| step.params)
    }
}

/// Discrete-time simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator {
    options: SimulationOptions,
}

impl Simulator {
    pub fn new(options: SimulationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Fixed-rate run. Returns `days + 1` states, the seed first. Deltas are
    /// not rounded, so `S + I + R + D` stays at the seed total.
    pub fn run_fixed(
        &self,
        seed: EpidemicState,
        params: &ModelParameters,
        days: usize,
    ) -> Vec<EpidemicState> {
        let n = seed.total();
        let mut states = Vec::with_capacity(days + 1);
        states.push(seed);
        let mut state = seed;
        for _ in 0..days {
            state = state.apply(&state.derivatives(params, n));
            states.push(state);
        }
        states
    }

    /// Self-re-estimating run from an explicit seed and day-0 rates. The
    /// population is the seed total and `initial.gamma` is held fixed.
    pub fn run_reestimating(
        &self,
        seed: EpidemicState,
        initial: ModelParameters,
        days: usize,
    ) -> Simulation {
        let n = seed.total();
        let rounding = self.options.rounding;
        let span = info_span!("simulate", days, population = n);
        let _guard = span.enter();

        let (steps, _) = (0..days).fold(
            (Vec::with_capacity(days), (seed, initial)),
            |(mut steps, (state, params)), day| {
                let raw = state.derivatives(&params, n);
                let deltas = Deltas {
                    susceptible: rounding.apply(raw.susceptible),
                    infected: rounding.apply(raw.infected),
                    recovered: rounding.apply(raw.recovered),
                    deceased: rounding.apply(raw.deceased),
                };
                let next_state = state.apply(&deltas);
                let next_params = balance_rates(&state, &deltas, params.gamma, n);
                steps.push(SimulationStep {
                    day,
                    state,
                    params,
                    deltas,
                    next_state,
                    next_params,
                });
                (steps, (next_state, next_params))
            },
        );
        debug!(steps = steps.len(), "simulation finished");
        Simulation {
            population: n,
            initial: seed,
            steps,
        }
    }

    /// Seeds from the day before `snapshot` and starts from the estimator's
    /// rates for the same snapshot.
    pub fn run_from_snapshot(&self, snapshot: &CountrySnapshot, days: usize) -> Simulation {
        let params = estimate_with_gamma(snapshot, self.options.gamma);
        self.run_reestimating(previous_state(snapshot), params, days)
    }

    /// Runs several snapshots on scoped worker threads. Results keep the
    /// input order.
    pub fn run_many<K>(&self, inputs: &[(K, CountrySnapshot)], days: usize) -> Vec<(K, Simulation)>
    where
        K: Clone + Send + Sync,
    {
        thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|(key, snapshot)| {
                    scope.spawn(move || (key.clone(), self.run_from_snapshot(snapshot, days)))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epi_model::RoundingPolicy;

    #[test]
    fn fixed_run_returns_seed_first() {
        let seed = EpidemicState::new(990.0, 10.0, 0.0, 0.0);
        let params = ModelParameters::new(0.0, 0.3, 0.1, 0.0);
        let states = Simulator::default().run_fixed(seed, &params, 3);
        assert_eq!(states.len(), 4);
        assert_eq!(states[0], seed);
    }

    #[test]
    fn zero_days_is_empty_trajectory() {
        let seed = EpidemicState::new(990.0, 10.0, 0.0, 0.0);
        let sim = Simulator::default().run_reestimating(seed, ModelParameters::new(0.0, 0.3, 0.1, 0.0), 0);
        assert!(sim.trajectory().is_empty());
        assert_eq!(sim.final_state(), seed);
    }

    #[test]
    fn rounding_keeps_whole_individuals() {
        let seed = EpidemicState::new(17_000_000.0, 100.0, 10.0, 1.0);
        let params = ModelParameters::new(0.01, 0.3, 0.1, 0.01);
        let sim = Simulator::new(SimulationOptions::default().with_rounding(RoundingPolicy::WholeIndividuals))
            .run_reestimating(seed, params, 5);
        for state in sim.states() {
            assert_eq!(state.infected, state.infected.round());
            assert_eq!(state.recovered, state.recovered.round());
        }
    }
}
