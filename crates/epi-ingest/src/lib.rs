//! Outbreak data ingestion.
//!
//! Loads the daily, country-snapshot and population tables from CSV with
//! Polars and exposes them through the [`DataSource`] / [`DataConnection`]
//! seam used by the estimation core.

pub mod dataset;
pub mod error;
pub mod header;
pub mod polars_utils;
pub mod source;
pub mod tables;

pub use dataset::{Dataset, DatasetFiles};
pub use error::{IngestError, Result};
pub use header::normalize_header;
pub use polars_utils::{any_to_count, any_to_date, any_to_f64, any_to_string, parse_date};
pub use source::{Connection, CsvSource, DataConnection, DataSource, InMemorySource};
pub use tables::{read_country_table, read_daily_table, read_frame, read_population_table};
