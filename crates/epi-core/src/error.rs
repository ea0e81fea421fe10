//! Error types for the estimation core.

use thiserror::Error;

use epi_ingest::IngestError;
use epi_map::ReconcileError;
use epi_model::ModelError;

/// Errors raised while querying the outbreak data.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("data source unavailable: {0}")]
    Source(#[from] IngestError),

    #[error(transparent)]
    Unresolved(#[from] ReconcileError),

    #[error("invalid scope: {0}")]
    Scope(#[from] ModelError),

    /// The country resolved but has no row in the snapshot table.
    #[error("no snapshot row for '{country}'")]
    MissingSnapshot { country: String },
}

/// Errors raised by the least-squares calibrator.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("need at least two observations to fit, got {0}")]
    TooFewObservations(usize),

    #[error("observed series contains a non-finite value at index {0}")]
    NonFiniteObservation(usize),

    #[error("population must be positive, got {0}")]
    InvalidPopulation(f64),

    #[error("initial guess ({beta}, {gamma}) lies outside the bounds")]
    GuessOutOfBounds { beta: f64, gamma: f64 },

    /// The optimizer stopped without meeting its convergence criterion.
    #[error("optimizer did not converge after {iterations} iterations: {reason}")]
    NotConverged { iterations: u64, reason: String },

    #[error("optimizer failed: {0}")]
    Optimizer(String),
}

impl From<argmin::core::Error> for CalibrationError {
    fn from(err: argmin::core::Error) -> Self {
        Self::Optimizer(err.to_string())
    }
}

/// Errors raised by the continuous-time projection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("horizon must be positive and finite, got {0}")]
    InvalidHorizon(f64),

    #[error("need at least two sample points, got {0}")]
    TooFewSamples(usize),

    #[error("need at least one integration step between samples")]
    NoSubsteps,
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
