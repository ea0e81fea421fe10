//! Outbreak estimation core.
//!
//! - [`Aggregator`]: scoped day-indexed series with populations.
//! - [`estimate`]: SIRD rates from one snapshot.
//! - [`Simulator`]: fixed-rate and self-re-estimating discrete runs.
//! - [`daily_rates`] / [`project`]: rate series and the RK4 projection.
//! - [`Calibrator`]: Nelder-Mead fit of `(beta, gamma)`.

pub mod aggregate;
pub mod calibrate;
pub mod continents;
pub mod error;
pub mod estimate;
pub mod projection;
pub mod rates;
pub mod simulate;

pub use aggregate::Aggregator;
pub use calibrate::{Calibrator, FittedParameters};
pub use continents::{ContinentSummary, summarize_continents};
pub use error::{CalibrationError, ProjectionError, QueryError, QueryResult};
pub use estimate::{estimate, estimate_with_gamma, fetch_snapshot, previous_state};
pub use projection::{ProjectionPoint, project, seed_from_series};
pub use rates::{DailyRate, daily_rates, mean_rates};
pub use simulate::{Simulation, SimulationStep, Simulator};
