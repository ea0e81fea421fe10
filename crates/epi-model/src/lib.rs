//! Data model for outbreak estimation and simulation.

pub mod epidemic;
pub mod error;
pub mod ids;
pub mod options;
pub mod records;
pub mod scope;
pub mod series;
pub mod snapshot;

pub use epidemic::{Deltas, EpidemicState, GAMMA, ModelParameters, ReproductionTrajectory};
pub use error::{ModelError, Result};
pub use ids::RegionName;
pub use options::{
    AggregateOptions, Bounds, CalibrationOptions, ProjectionOptions, RoundingPolicy,
    SimulationOptions, UnresolvedPolicy,
};
pub use records::{CountryRecord, DailyRecord, PopulationRecord};
pub use scope::Scope;
pub use series::{DateWindow, PerMillionPoint, TimeSeries, TimeSeriesPoint};
pub use snapshot::CountrySnapshot;
