//! Point estimates of the SIRD rates from one daily snapshot.
//!
//! With the previous-day compartments `(S, I, R)` and the day's deltas
//! `(dS, dR, dD)`:
//!
//! - `mu    = dD / I`
//! - `alpha = (gamma * I - dR) / R`
//! - `beta  = (alpha * R - dS) * N / (S * I)`
//!
//! Each rate is zero when its denominator is not positive.

use tracing::{debug, info_span};

use epi_ingest::DataSource;
use epi_map::Reconciler;
use epi_model::{CountrySnapshot, Deltas, EpidemicState, GAMMA, ModelParameters};

use crate::error::{QueryError, QueryResult};

/// Estimates the rates with the fixed recovery rate `1 / 4.5`.
pub fn estimate(snapshot: &CountrySnapshot) -> ModelParameters {
    estimate_with_gamma(snapshot, GAMMA)
}

pub fn estimate_with_gamma(snapshot: &CountrySnapshot, gamma: f64) -> ModelParameters {
    let previous = previous_state(snapshot);
    let deltas = snapshot_deltas(snapshot);
    balance_rates(&previous, &deltas, gamma, snapshot.population as f64)
}

/// Compartments on the day before the snapshot.
pub fn previous_state(snapshot: &CountrySnapshot) -> EpidemicState {
    EpidemicState::new(
        snapshot.previous_susceptible() as f64,
        snapshot.previous_active() as f64,
        snapshot.previous_recovered() as f64,
        snapshot.previous_deaths() as f64,
    )
}

fn snapshot_deltas(snapshot: &CountrySnapshot) -> Deltas {
    let new_cases = snapshot.new_cases as f64;
    let new_recovered = snapshot.new_recovered as f64;
    let new_deaths = snapshot.new_deaths as f64;
    Deltas {
        susceptible: -(new_cases + new_recovered + new_deaths),
        infected: new_cases,
        recovered: new_recovered,
        deceased: new_deaths,
    }
}

/// Solves the balance equations for `(mu, alpha, beta)` given the state the
/// deltas were produced from.
pub(crate) fn balance_rates(
    previous: &EpidemicState,
    deltas: &Deltas,
    gamma: f64,
    population: f64,
) -> ModelParameters {
    let s = previous.susceptible;
    let i = previous.infected;
    let r = previous.recovered;

    let mu = if i > 0.0 { deltas.deceased / i } else { 0.0 };
    let alpha = if r > 0.0 {
        (gamma * i - deltas.recovered) / r
    } else {
        0.0
    };
    let beta = if s > 0.0 && i > 0.0 {
        (alpha * r - deltas.susceptible) * population / (s * i)
    } else {
        0.0
    };
    ModelParameters::new(finite_or_zero(alpha), finite_or_zero(beta), gamma, finite_or_zero(mu))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Builds the snapshot for `country` by joining the snapshot table with the
/// population table through the reconciler.
pub fn fetch_snapshot(
    source: &dyn DataSource,
    reconciler: &Reconciler,
    country: &str,
) -> QueryResult<CountrySnapshot> {
    let span = info_span!("fetch_snapshot", country = %country);
    let _guard = span.enter();

    let conn = source.connect()?;
    let identity = reconciler.resolve(conn.as_ref(), country)?;
    let row = conn
        .country_row(&identity.country_name)
        .ok_or_else(|| QueryError::MissingSnapshot {
            country: identity.country_name.clone(),
        })?;
    let alt = reconciler.population_row(conn.as_ref(), &identity);
    let snapshot = CountrySnapshot::join(row, identity.population, alt);
    debug!(
        population = snapshot.population,
        active = snapshot.active,
        source = ?identity.source,
        "fetched snapshot"
    );
    Ok(snapshot)
}
