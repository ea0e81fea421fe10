//! Configuration file loading.
//!
//! Every section is optional; missing keys fall back to the library
//! defaults. A file passed with `--config` must exist and parse. Without
//! one, `epi.toml` in the working directory is used when present.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use epi_ingest::DatasetFiles;
use epi_model::{AggregateOptions, CalibrationOptions, ProjectionOptions, SimulationOptions};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "epi.toml";

/// Directory the tables are read from when neither flag nor file names one.
pub const DEFAULT_DATA_DIR: &str = "Data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpiConfig {
    pub data: DataConfig,
    pub aggregate: AggregateOptions,
    pub simulation: SimulationOptions,
    pub calibration: CalibrationOptions,
    pub projection: ProjectionOptions,
}

/// Where the tables and the alias table live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub files: DatasetFiles,
    pub aliases: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DATA_DIR),
            files: DatasetFiles::default(),
            aliases: None,
        }
    }
}

impl EpiConfig {
    /// Parses a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise `epi.toml` from `cwd` if it
    /// exists, otherwise the defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        debug!("no configuration file, using defaults");
        Ok(Self::default())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EpiConfig::from_toml("").expect("parse");
        assert_eq!(config, EpiConfig::default());
        assert_eq!(config.data.dir, PathBuf::from("Data"));
    }

    #[test]
    fn unknown_rounding_is_rejected() {
        let error = EpiConfig::from_toml("[simulation]\nrounding = \"half\"\n")
            .expect_err("bad rounding");
        assert!(format!("{error:#}").contains("invalid configuration"));
    }
}
