//! Country name reconciliation.
//!
//! The snapshot/daily tables and the population table spell some countries
//! differently. [`Reconciler::resolve`] joins them directly, through the
//! bidirectional [`NameMapping`], or through a population override.

pub mod error;
pub mod mapping;
pub mod reconciler;
pub mod suggest;

pub use error::{ReconcileError, Result};
pub use mapping::{AliasPair, MAPPING_VERSION, NameMapping, PopulationOverride};
pub use reconciler::{Reconciler, ResolutionSource, ResolvedIdentity};
pub use suggest::{SUGGESTION_THRESHOLD, suggest};
