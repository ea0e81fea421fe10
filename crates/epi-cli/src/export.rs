//! CSV export of series, simulations and projections.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use epi_core::{ProjectionPoint, Simulation};
use epi_model::TimeSeries;

#[derive(Debug, Serialize)]
struct SeriesRow {
    date: NaiveDate,
    confirmed: i64,
    deaths: i64,
    recovered: i64,
    active: i64,
    population: u64,
    confirmed_per_million: Option<f64>,
    deaths_per_million: Option<f64>,
    recovered_per_million: Option<f64>,
    active_per_million: Option<f64>,
    case_fatality_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
struct StateRow<'a> {
    label: &'a str,
    day: f64,
    susceptible: f64,
    infected: f64,
    recovered: f64,
    deceased: f64,
    r0: Option<f64>,
}

fn write_rows<W, R, I>(writer: W, rows: I) -> Result<usize>
where
    W: io::Write,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut csv = csv::Writer::from_writer(writer);
    let mut count = 0;
    for row in rows {
        csv.serialize(row)?;
        count += 1;
    }
    csv.flush()?;
    Ok(count)
}

fn create(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path).with_context(|| format!("create {}", path.display()))
}

pub fn write_series<W: io::Write>(writer: W, series: &TimeSeries) -> Result<usize> {
    let rows = series.points.iter().map(|point| {
        let scaled = point.per_million();
        SeriesRow {
            date: point.date,
            confirmed: point.total_confirmed,
            deaths: point.total_deaths,
            recovered: point.total_recovered,
            active: point.total_active,
            population: point.population,
            confirmed_per_million: scaled.map(|p| p.confirmed),
            deaths_per_million: scaled.map(|p| p.deaths),
            recovered_per_million: scaled.map(|p| p.recovered),
            active_per_million: scaled.map(|p| p.active),
            case_fatality_rate: point.case_fatality_rate(),
        }
    });
    write_rows(writer, rows)
}

/// Per-day states of each run; `r0` is the value recorded for that day and
/// empty on the seed row.
pub fn write_simulations<W: io::Write>(
    writer: W,
    simulations: &[(String, Simulation)],
) -> Result<usize> {
    let rows = simulations.iter().flat_map(|(label, simulation)| {
        let seed = StateRow {
            label,
            day: 0.0,
            susceptible: simulation.initial.susceptible,
            infected: simulation.initial.infected,
            recovered: simulation.initial.recovered,
            deceased: simulation.initial.deceased,
            r0: None,
        };
        let steps = simulation.steps.iter().map(move |step| StateRow {
            label,
            day: (step.day + 1) as f64,
            susceptible: step.next_state.susceptible,
            infected: step.next_state.infected,
            recovered: step.next_state.recovered,
            deceased: step.next_state.deceased,
            r0: Some(step.r0()),
        });
        std::iter::once(seed).chain(steps)
    });
    write_rows(writer, rows)
}

pub fn write_projection<W: io::Write>(
    writer: W,
    label: &str,
    points: &[ProjectionPoint],
) -> Result<usize> {
    let rows = points.iter().map(|point| StateRow {
        label,
        day: point.day,
        susceptible: point.state.susceptible,
        infected: point.state.infected,
        recovered: point.state.recovered,
        deceased: point.state.deceased,
        r0: None,
    });
    write_rows(writer, rows)
}

pub fn export_series(path: &Path, series: &TimeSeries) -> Result<()> {
    let rows = write_series(create(path)?, series)?;
    info!(path = %path.display(), rows, "exported series");
    Ok(())
}

pub fn export_simulations(path: &Path, simulations: &[(String, Simulation)]) -> Result<()> {
    let rows = write_simulations(create(path)?, simulations)?;
    info!(path = %path.display(), rows, "exported simulations");
    Ok(())
}

pub fn export_projection(path: &Path, label: &str, points: &[ProjectionPoint]) -> Result<()> {
    let rows = write_projection(create(path)?, label, points)?;
    info!(path = %path.display(), rows, "exported projection");
    Ok(())
}
