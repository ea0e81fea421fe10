//! Injectable data access.
//!
//! A [`DataSource`] hands out scoped [`DataConnection`]s. A connection is
//! read-only and is released when dropped, so every early return or `?` in a
//! caller releases it too.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, trace};

use epi_model::{CountryRecord, DailyRecord, PopulationRecord};

use crate::dataset::{Dataset, DatasetFiles};
use crate::error::Result;

/// Something that can open read-only connections to the outbreak data.
pub trait DataSource: Send + Sync {
    /// Opens a connection. The connection is released on drop.
    fn connect(&self) -> Result<Box<dyn DataConnection + '_>>;

    /// Short human-readable description used in logs.
    fn describe(&self) -> String;
}

/// Read-only view over the tables for the lifetime of one query.
pub trait DataConnection {
    fn dataset(&self) -> &Dataset;

    fn daily_rows(&self) -> &[DailyRecord] {
        self.dataset().daily()
    }

    fn country_row(&self, name: &str) -> Option<&CountryRecord> {
        self.dataset().country_row(name)
    }

    fn population_row(&self, name: &str) -> Option<&PopulationRecord> {
        self.dataset().population_row(name)
    }

    fn countries(&self) -> &[CountryRecord] {
        self.dataset().countries()
    }

    fn populations(&self) -> &[PopulationRecord] {
        self.dataset().populations()
    }

    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.dataset().date_range()
    }
}

/// Connection handed out by the bundled sources.
pub struct Connection<'a> {
    dataset: Cow<'a, Dataset>,
    open: &'a AtomicUsize,
    opened_at: Instant,
}

impl<'a> Connection<'a> {
    fn new(dataset: Cow<'a, Dataset>, open: &'a AtomicUsize) -> Self {
        let count = open.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(open = count, "opened connection");
        Self {
            dataset,
            open,
            opened_at: Instant::now(),
        }
    }
}

impl DataConnection for Connection<'_> {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        let remaining = self.open.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!(
            open = remaining,
            duration_ms = self.opened_at.elapsed().as_millis() as u64,
            "released connection"
        );
    }
}

/// Source backed by a dataset already held in memory.
#[derive(Debug, Default)]
pub struct InMemorySource {
    dataset: Dataset,
    open: AtomicUsize,
}

impl InMemorySource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            open: AtomicUsize::new(0),
        }
    }

    /// Number of connections currently open.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl DataSource for InMemorySource {
    fn connect(&self) -> Result<Box<dyn DataConnection + '_>> {
        Ok(Box::new(Connection::new(
            Cow::Borrowed(&self.dataset),
            &self.open,
        )))
    }

    fn describe(&self) -> String {
        format!("in-memory ({} daily rows)", self.dataset.daily().len())
    }
}

/// Source that reads the CSV tables from a directory on every connect.
#[derive(Debug)]
pub struct CsvSource {
    dir: PathBuf,
    files: DatasetFiles,
    open: AtomicUsize,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: DatasetFiles::default(),
            open: AtomicUsize::new(0),
        }
    }

    pub fn with_files(mut self, files: DatasetFiles) -> Self {
        self.files = files;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl DataSource for CsvSource {
    fn connect(&self) -> Result<Box<dyn DataConnection + '_>> {
        let dataset = Dataset::load(&self.dir, &self.files)?;
        Ok(Box::new(Connection::new(Cow::Owned(dataset), &self.open)))
    }

    fn describe(&self) -> String {
        format!("csv directory {}", self.dir.display())
    }
}
