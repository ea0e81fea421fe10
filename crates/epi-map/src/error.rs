//! Error types for name reconciliation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No direct match, alias or override for the name.
    #[error("country '{name}' could not be resolved{}", format_suggestions(.suggestions))]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    /// The population row exists but carries no population figure.
    #[error("population for '{country}' is missing in the population table")]
    MissingPopulation { country: String },

    #[error("failed to read alias table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid alias table {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("alias table {path} has version {found}, expected {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

impl ReconcileError {
    /// The unresolved name, when this is a resolution failure.
    pub fn unresolved_name(&self) -> Option<&str> {
        match self {
            Self::NotFound { name, .. } => Some(name),
            Self::MissingPopulation { country } => Some(country),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_suggestions() {
        let err = ReconcileError::NotFound {
            name: "Frnace".to_string(),
            suggestions: vec!["France".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "country 'Frnace' could not be resolved (did you mean: France?)"
        );
        assert_eq!(err.unresolved_name(), Some("Frnace"));
    }

    #[test]
    fn not_found_without_suggestions() {
        let err = ReconcileError::NotFound {
            name: "Atlantis".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "country 'Atlantis' could not be resolved");
    }
}
