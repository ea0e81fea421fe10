use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use epi_cli::commands::{EstimateReport, FitReport, ProjectReport};
use epi_core::{ContinentSummary, Simulation};
use epi_map::NameMapping;
use epi_model::TimeSeries;

pub fn print_series(series: &TimeSeries, per_million: bool) {
    println!("Scope: {}", series.scope.label());
    match series.window {
        Some((start, end)) => println!("Window: {start} .. {end}"),
        None => {
            println!("Window: no data");
            return;
        }
    }
    if let Some(population) = series.population() {
        println!("Population: {population}");
    }
    if series.is_partial() {
        let names: Vec<&str> = series.unresolved.iter().map(String::as_str).collect();
        println!("Unresolved (partial population): {}", names.join(", "));
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Confirmed"),
        header_cell("Deaths"),
        header_cell("Recovered"),
        header_cell("Active"),
        header_cell("CFR"),
    ]);
    apply_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for point in &series.points {
        let counts = match point.per_million().filter(|_| per_million) {
            Some(scaled) => [
                format!("{:.2}", scaled.confirmed),
                format!("{:.2}", scaled.deaths),
                format!("{:.2}", scaled.recovered),
                format!("{:.2}", scaled.active),
            ],
            None => [
                point.total_confirmed.to_string(),
                point.total_deaths.to_string(),
                point.total_recovered.to_string(),
                point.total_active.to_string(),
            ],
        };
        let mut row = vec![Cell::new(point.date)];
        row.extend(counts.into_iter().map(Cell::new));
        let cfr = point
            .case_fatality_rate()
            .map(|cfr| format!("{:.2}%", cfr * 100.0));
        row.push(optional_cell(cfr));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn print_estimate(report: &EstimateReport) {
    let snapshot = &report.snapshot;
    println!("Country: {}", report.country);
    println!(
        "Snapshot: active {} (+{}), recovered {} (+{}), deaths {} (+{}), population {}",
        snapshot.active,
        snapshot.new_cases,
        snapshot.recovered,
        snapshot.new_recovered,
        snapshot.deaths,
        snapshot.new_deaths,
        snapshot.population
    );
    let params = &report.params;
    print_rates(&[
        ("alpha", params.alpha),
        ("beta", params.beta),
        ("gamma", params.gamma),
        ("mu", params.mu),
        ("R0", params.r0()),
    ]);
}

pub fn print_trajectories(simulations: &[(String, Simulation)]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Country"),
        header_cell("Days"),
        header_cell("R0 day 1"),
        header_cell("R0 last"),
        header_cell("Infected"),
        header_cell("Recovered"),
        header_cell("Deceased"),
    ]);
    apply_table_style(&mut table);
    for index in 1..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (country, simulation) in simulations {
        let trajectory = simulation.trajectory();
        let last = simulation.final_state();
        table.add_row(vec![
            Cell::new(country).add_attribute(Attribute::Bold),
            Cell::new(simulation.steps.len()),
            optional_cell(trajectory.iter().next().map(|r0| format!("{r0:.3}"))),
            optional_cell(trajectory.iter().last().map(|r0| format!("{r0:.3}"))),
            Cell::new(format!("{:.0}", last.infected)),
            Cell::new(format!("{:.0}", last.recovered)),
            Cell::new(format!("{:.0}", last.deceased)),
        ]);
    }
    println!("{table}");
}

pub fn print_fit(report: &FitReport) {
    println!("Scope: {}", report.scope.label());
    println!("Observations: {} days, population {}", report.days, report.population);
    let fitted = &report.fitted;
    print_rates(&[
        ("beta", fitted.beta),
        ("gamma", fitted.gamma),
        ("R0", fitted.r0),
        ("cost", fitted.cost),
    ]);
    println!("Iterations: {}", fitted.iterations);
}

pub fn print_projection(report: &ProjectReport) {
    println!("Scope: {}", report.scope.label());
    let params = &report.params;
    print_rates(&[
        ("alpha", params.alpha),
        ("beta", params.beta),
        ("gamma", params.gamma),
        ("mu", params.mu),
    ]);
    let peak = report
        .points
        .iter()
        .max_by(|a, b| a.state.infected.total_cmp(&b.state.infected));
    if let Some(peak) = peak {
        println!("Peak infected: {:.0} on day {:.1}", peak.state.infected, peak.day);
    }
    if let Some(last) = report.points.last() {
        println!(
            "Day {:.1}: S {:.0}, I {:.0}, R {:.0}, D {:.0}",
            last.day,
            last.state.susceptible,
            last.state.infected,
            last.state.recovered,
            last.state.deceased
        );
    }
}

pub fn print_continents(summaries: &[ContinentSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Continent"),
        header_cell("Countries"),
        header_cell("Population"),
        header_cell("Cases"),
        header_cell("Deaths"),
        header_cell("Recovered"),
        header_cell("Cases/M"),
        header_cell("Deaths/M"),
    ]);
    apply_table_style(&mut table);
    for index in 1..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.continent)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.countries),
            Cell::new(summary.population),
            Cell::new(summary.total_cases),
            Cell::new(summary.total_deaths),
            Cell::new(summary.total_recovered),
            optional_cell(summary.cases_per_million().map(|value| format!("{value:.1}"))),
            optional_cell(summary.deaths_per_million().map(|value| format!("{value:.1}"))),
        ]);
    }
    println!("{table}");
    for summary in summaries.iter().filter(|summary| summary.is_partial()) {
        let names: Vec<&str> = summary
            .missing_population
            .iter()
            .map(String::as_str)
            .collect();
        println!(
            "{}: no population for {} (per-million withheld)",
            summary.continent,
            names.join(", ")
        );
    }
}

pub fn print_aliases(mapping: &NameMapping) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Snapshot name"), header_cell("Population name")]);
    apply_table_style(&mut table);
    for alias in &mapping.aliases {
        table.add_row(vec![Cell::new(&alias.dataset_a), Cell::new(&alias.dataset_b)]);
    }
    println!("{table}");

    if !mapping.overrides.is_empty() {
        let mut overrides = Table::new();
        overrides.set_header(vec![
            header_cell("Country"),
            header_cell("Population"),
            header_cell("Continent"),
        ]);
        apply_table_style(&mut overrides);
        align_column(&mut overrides, 1, CellAlignment::Right);
        for entry in &mapping.overrides {
            overrides.add_row(vec![
                Cell::new(&entry.country),
                Cell::new(entry.population),
                optional_cell(entry.continent.clone()),
            ]);
        }
        println!("{overrides}");
    }
}

fn print_rates(rates: &[(&str, f64)]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rate"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (name, value) in rates {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{value:.6}"))]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<String>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
