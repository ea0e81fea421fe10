//! Alias table between the two country datasets.
//!
//! Dataset A is the snapshot/daily naming (`US`, `United Kingdom`,
//! `Congo (Kinshasa)`), dataset B is the population naming (`USA`, `UK`,
//! `DRC`). Overrides carry a fixed population for countries that have no row
//! in dataset B at all.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReconcileError, Result};

/// Current alias table format version.
pub const MAPPING_VERSION: u32 = 1;

const SEED_ALIASES: &[(&str, &str)] = &[
    ("US", "USA"),
    ("United Kingdom", "UK"),
    ("South Korea", "S. Korea"),
    ("Korea, South", "S. Korea"),
    ("Taiwan*", "Taiwan"),
    ("Congo (Kinshasa)", "DRC"),
    ("Congo (Brazzaville)", "Congo"),
    ("Central African Republic", "CAR"),
    ("United Arab Emirates", "UAE"),
    ("Cote d'Ivoire", "Ivory Coast"),
    ("Burma", "Myanmar"),
    ("West Bank and Gaza", "Palestine"),
    ("Saint Vincent and the Grenadines", "St. Vincent Grenadines"),
    ("Saint Kitts and Nevis", "Saint Kitts & Nevis"),
    ("Antigua and Barbuda", "Antigua & Barbuda"),
    ("Bosnia and Herzegovina", "Bosnia & Herzegovina"),
    ("Trinidad and Tobago", "Trinidad & Tobago"),
    ("Holy See", "Vatican City"),
];

const SEED_OVERRIDES: &[(&str, u64, &str)] = &[
    ("Kosovo", 1_810_366, "Europe"),
];

/// One `(dataset A name, dataset B name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPair {
    pub dataset_a: String,
    pub dataset_b: String,
}

impl AliasPair {
    pub fn new(dataset_a: impl Into<String>, dataset_b: impl Into<String>) -> Self {
        Self {
            dataset_a: dataset_a.into(),
            dataset_b: dataset_b.into(),
        }
    }
}

/// Fixed population for a country absent from the population dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationOverride {
    pub country: String,
    pub population: u64,
    #[serde(default)]
    pub continent: Option<String>,
}

/// Ordered alias pairs plus population overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    pub version: u32,
    #[serde(default)]
    pub aliases: Vec<AliasPair>,
    #[serde(default)]
    pub overrides: Vec<PopulationOverride>,
}

impl Default for NameMapping {
    fn default() -> Self {
        Self {
            version: MAPPING_VERSION,
            aliases: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

impl NameMapping {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in mapping, seeded once on first use.
    pub fn builtin() -> &'static NameMapping {
        static BUILTIN: OnceLock<NameMapping> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut mapping = NameMapping::new();
            let added = mapping.ensure_seeded();
            debug!(added, "seeded built-in alias table");
            mapping
        })
    }

    /// Adds every built-in pair and override not already present. Returns how
    /// many entries were added, so a second call returns 0.
    pub fn ensure_seeded(&mut self) -> usize {
        let mut added = 0;
        for (a, b) in SEED_ALIASES {
            if self.insert_alias(*a, *b) {
                added += 1;
            }
        }
        for (country, population, continent) in SEED_OVERRIDES {
            if self.insert_override(*country, *population, Some(*continent)) {
                added += 1;
            }
        }
        added
    }

    /// Inserts an alias pair unless the same pair already exists.
    pub fn insert_alias(&mut self, dataset_a: impl Into<String>, dataset_b: impl Into<String>) -> bool {
        let pair = AliasPair::new(dataset_a, dataset_b);
        let exists = self.aliases.iter().any(|existing| {
            existing.dataset_a.eq_ignore_ascii_case(&pair.dataset_a)
                && existing.dataset_b.eq_ignore_ascii_case(&pair.dataset_b)
        });
        if exists {
            return false;
        }
        self.aliases.push(pair);
        true
    }

    /// Inserts an override unless the country already has one.
    pub fn insert_override(
        &mut self,
        country: impl Into<String>,
        population: u64,
        continent: Option<&str>,
    ) -> bool {
        let country = country.into();
        if self.override_for(&country).is_some() {
            return false;
        }
        self.overrides.push(PopulationOverride {
            country,
            population,
            continent: continent.map(str::to_string),
        });
        true
    }

    /// Dataset B name for a dataset A name.
    pub fn to_dataset_b(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.aliases
            .iter()
            .find(|pair| pair.dataset_a.eq_ignore_ascii_case(name))
            .map(|pair| pair.dataset_b.as_str())
    }

    /// Dataset A name for a dataset B name.
    pub fn to_dataset_a(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.aliases
            .iter()
            .find(|pair| pair.dataset_b.eq_ignore_ascii_case(name))
            .map(|pair| pair.dataset_a.as_str())
    }

    pub fn override_for(&self, country: &str) -> Option<&PopulationOverride> {
        let country = country.trim();
        self.overrides
            .iter()
            .find(|entry| entry.country.eq_ignore_ascii_case(country))
    }

    pub fn len(&self) -> usize {
        self.aliases.len() + self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.overrides.is_empty()
    }

    /// Loads a mapping from JSON, rejecting other format versions.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ReconcileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mapping: NameMapping =
            serde_json::from_str(&content).map_err(|source| ReconcileError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if mapping.version != MAPPING_VERSION {
            return Err(ReconcileError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: mapping.version,
                expected: MAPPING_VERSION,
            });
        }
        info!(
            path = %path.display(),
            aliases = mapping.aliases.len(),
            overrides = mapping.overrides.len(),
            "loaded alias table"
        );
        Ok(mapping)
    }

    /// Writes the mapping as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ReconcileError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ReconcileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = self.len(), "saved alias table");
        Ok(())
    }
}
