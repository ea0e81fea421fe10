#![allow(dead_code)]

use chrono::NaiveDate;

use epi_ingest::{Dataset, InMemorySource};
use epi_model::{CountryRecord, CountrySnapshot, DailyRecord, PopulationRecord};

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, day).expect("valid date")
}

pub fn daily(
    day: u32,
    region: &str,
    country: &str,
    province: Option<&str>,
    confirmed: i64,
    deaths: i64,
    recovered: i64,
) -> DailyRecord {
    DailyRecord {
        date: date(day),
        region: region.to_string(),
        country: country.to_string(),
        province: province.map(str::to_string),
        confirmed,
        deaths,
        recovered,
        active: confirmed - deaths - recovered,
    }
}

pub fn country_row(name: &str, region: &str) -> CountryRecord {
    CountryRecord {
        country: name.to_string(),
        region: Some(region.to_string()),
        confirmed: 1_500,
        deaths: 60,
        recovered: 240,
        active: 1_200,
        new_cases: 200,
        new_deaths: 10,
        new_recovered: 40,
    }
}

pub fn population_row(name: &str, continent: &str, population: u64) -> PopulationRecord {
    PopulationRecord {
        country: name.to_string(),
        continent: Some(continent.to_string()),
        population: Some(population),
        total_cases: Some(1_500),
        total_deaths: Some(60),
        total_recovered: Some(240),
        active_cases: Some(1_200),
    }
}

/// Three days of data for France, Italy, the US, two Chinese provinces and
/// one country that appears in no other table.
pub fn dataset() -> Dataset {
    let mut rows = Vec::new();
    for day in 1..=3 {
        let k = i64::from(day);
        rows.push(daily(day, "Europe", "France", None, 100 * k, 2 * k, 10 * k));
        rows.push(daily(day, "Europe", "Italy", None, 200 * k, 5 * k, 20 * k));
        rows.push(daily(day, "Americas", "US", None, 300 * k, 3 * k, 30 * k));
        rows.push(daily(day, "Western Pacific", "China", Some("Hubei"), 400 * k, 4 * k, 40 * k));
        rows.push(daily(day, "Western Pacific", "China", Some("Beijing"), 10 * k, 0, k));
        rows.push(daily(day, "Europe", "Atlantis", None, k, 0, 0));
    }
    // Repeated row is dropped on load.
    rows.push(daily(1, "Europe", "France", None, 100, 2, 10));

    let countries = vec![
        country_row("France", "Europe"),
        country_row("Italy", "Europe"),
        country_row("US", "Americas"),
        country_row("China", "Western Pacific"),
    ];
    let populations = vec![
        population_row("France", "Europe", 65_000_000),
        population_row("Italy", "Europe", 60_000_000),
        population_row("USA", "North America", 331_000_000),
        population_row("China", "Asia", 1_400_000_000),
    ];
    Dataset::new(rows, countries, populations)
}

pub fn source() -> InMemorySource {
    InMemorySource::new(dataset())
}

pub fn snapshot() -> CountrySnapshot {
    CountrySnapshot {
        active: 1_200,
        new_cases: 200,
        recovered: 240,
        new_recovered: 40,
        deaths: 60,
        new_deaths: 10,
        population: 1_000_000,
        active_cases_alt: None,
        total_deaths_alt: None,
        total_recovered_alt: None,
    }
}
