//! Header normalization and column lookup.
//!
//! The source tables come in two spellings: dotted names exported from a
//! SQL layer (`Country.Region`, `New.cases`) and the original CSV headers
//! (`Country/Region`, `New cases`, `TotalCases`). Both normalize to the same
//! lowercase, single-spaced key.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::{Column, DataFrame};

use crate::error::{IngestError, Result};

/// Normalizes a header for matching: strips a BOM, lowercases, turns every
/// non-alphanumeric run into one space.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut normalized = String::with_capacity(trimmed.len());
    let mut pending_space = false;
    for ch in trimmed.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    normalized
}

/// Columns of a loaded table, addressable by normalized header.
pub(crate) struct TableColumns<'a> {
    df: &'a DataFrame,
    path: &'a Path,
    by_key: BTreeMap<String, String>,
}

impl<'a> TableColumns<'a> {
    pub(crate) fn new(df: &'a DataFrame, path: &'a Path) -> Self {
        let mut by_key = BTreeMap::new();
        for name in df.get_column_names() {
            by_key
                .entry(normalize_header(name.as_str()))
                .or_insert_with(|| name.to_string());
        }
        Self { df, path, by_key }
    }

    /// First column matching any candidate, or `MissingColumn` naming the
    /// first candidate.
    pub(crate) fn required(&self, candidates: &[&str]) -> Result<&'a Column> {
        self.optional(candidates)
            .ok_or_else(|| IngestError::MissingColumn {
                column: candidates.first().copied().unwrap_or_default().to_string(),
                path: self.path.to_path_buf(),
            })
    }

    pub(crate) fn optional(&self, candidates: &[&str]) -> Option<&'a Column> {
        candidates.iter().find_map(|candidate| {
            let name = self.by_key.get(&normalize_header(candidate))?;
            self.df.column(name).ok()
        })
    }
}
