//! Typed readers for the three source tables.

use std::path::Path;

use polars::prelude::{AnyValue, Column, CsvReadOptions, DataFrame, SerReader};
use tracing::debug;

use epi_model::{CountryRecord, DailyRecord, PopulationRecord};

use crate::error::{IngestError, Result};
use crate::header::TableColumns;
use crate::polars_utils::{any_to_count, any_to_date, any_to_string, any_to_string_non_empty};

const COUNTRY: &[&str] = &["Country/Region", "Country"];
const REGION: &[&str] = &["WHO Region", "Continent", "Region"];
const PROVINCE: &[&str] = &["Province/State", "Province"];

/// Reads a CSV file into a DataFrame with the first row as header.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(SerReader::finish)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Reads the daily table (`full_grouped`-style: one row per place and day).
pub fn read_daily_table(path: &Path) -> Result<Vec<DailyRecord>> {
    let df = read_frame(path)?;
    let records = daily_records(&df, path)?;
    debug!(path = %path.display(), rows = records.len(), "loaded daily table");
    Ok(records)
}

/// Reads the country snapshot table (`country_wise_latest`-style).
pub fn read_country_table(path: &Path) -> Result<Vec<CountryRecord>> {
    let df = read_frame(path)?;
    let records = country_records(&df, path)?;
    debug!(path = %path.display(), rows = records.len(), "loaded country table");
    Ok(records)
}

/// Reads the population table (`worldometer`-style).
pub fn read_population_table(path: &Path) -> Result<Vec<PopulationRecord>> {
    let df = read_frame(path)?;
    let records = population_records(&df, path)?;
    debug!(path = %path.display(), rows = records.len(), "loaded population table");
    Ok(records)
}

fn daily_records(df: &DataFrame, path: &Path) -> Result<Vec<DailyRecord>> {
    let columns = TableColumns::new(df, path);
    let date_col = columns.required(&["Date", "ObservationDate"])?;
    let region_col = columns.required(REGION)?;
    let country_col = columns.required(COUNTRY)?;
    let province_col = columns.optional(PROVINCE);
    let confirmed_col = columns.required(&["Confirmed"])?;
    let deaths_col = columns.required(&["Deaths"])?;
    let recovered_col = columns.required(&["Recovered"])?;
    let active_col = columns.required(&["Active"])?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(country) = any_to_string_non_empty(country_col.get(row)?) else {
            continue;
        };
        let raw_date = date_col.get(row)?;
        let date = any_to_date(raw_date.clone()).ok_or_else(|| IngestError::InvalidValue {
            field: "date".to_string(),
            value: any_to_string(raw_date),
            row,
            path: path.to_path_buf(),
        })?;
        let province = match province_col {
            Some(col) => any_to_string_non_empty(col.get(row)?),
            None => None,
        };
        records.push(DailyRecord {
            date,
            region: any_to_string_non_empty(region_col.get(row)?).unwrap_or_default(),
            country,
            province,
            confirmed: count_cell(confirmed_col, row, "confirmed", path)?,
            deaths: count_cell(deaths_col, row, "deaths", path)?,
            recovered: count_cell(recovered_col, row, "recovered", path)?,
            active: count_cell(active_col, row, "active", path)?,
        });
    }
    Ok(records)
}

fn country_records(df: &DataFrame, path: &Path) -> Result<Vec<CountryRecord>> {
    let columns = TableColumns::new(df, path);
    let country_col = columns.required(COUNTRY)?;
    let region_col = columns.optional(REGION);
    let confirmed_col = columns.required(&["Confirmed"])?;
    let deaths_col = columns.required(&["Deaths"])?;
    let recovered_col = columns.required(&["Recovered"])?;
    let active_col = columns.required(&["Active"])?;
    let new_cases_col = columns.required(&["New cases"])?;
    let new_deaths_col = columns.required(&["New deaths"])?;
    let new_recovered_col = columns.required(&["New recovered"])?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(country) = any_to_string_non_empty(country_col.get(row)?) else {
            continue;
        };
        let region = match region_col {
            Some(col) => any_to_string_non_empty(col.get(row)?),
            None => None,
        };
        records.push(CountryRecord {
            country,
            region,
            confirmed: count_cell(confirmed_col, row, "confirmed", path)?,
            deaths: count_cell(deaths_col, row, "deaths", path)?,
            recovered: count_cell(recovered_col, row, "recovered", path)?,
            active: count_cell(active_col, row, "active", path)?,
            new_cases: count_cell(new_cases_col, row, "new cases", path)?,
            new_deaths: count_cell(new_deaths_col, row, "new deaths", path)?,
            new_recovered: count_cell(new_recovered_col, row, "new recovered", path)?,
        });
    }
    Ok(records)
}

fn population_records(df: &DataFrame, path: &Path) -> Result<Vec<PopulationRecord>> {
    let columns = TableColumns::new(df, path);
    let country_col = columns.required(COUNTRY)?;
    let continent_col = columns.optional(&["Continent"]);
    let population_col = columns.required(&["Population"])?;
    let cases_col = columns.optional(&["TotalCases", "Total cases"]);
    let deaths_col = columns.optional(&["TotalDeaths", "Total deaths"]);
    let recovered_col = columns.optional(&["TotalRecovered", "Total recovered"]);
    let active_col = columns.optional(&["ActiveCases", "Active cases"]);

    let optional_count = |col: Option<&Column>, row: usize| -> Result<Option<i64>> {
        match col {
            Some(col) => Ok(any_to_count(col.get(row)?)),
            None => Ok(None),
        }
    };

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(country) = any_to_string_non_empty(country_col.get(row)?) else {
            continue;
        };
        let continent = match continent_col {
            Some(col) => any_to_string_non_empty(col.get(row)?),
            None => None,
        };
        let population = any_to_count(population_col.get(row)?)
            .and_then(|value| u64::try_from(value).ok());
        records.push(PopulationRecord {
            country,
            continent,
            population,
            total_cases: optional_count(cases_col, row)?,
            total_deaths: optional_count(deaths_col, row)?,
            total_recovered: optional_count(recovered_col, row)?,
            active_cases: optional_count(active_col, row)?,
        });
    }
    Ok(records)
}

/// Count cell: null reads as zero, anything else must be numeric.
fn count_cell(col: &Column, row: usize, field: &str, path: &Path) -> Result<i64> {
    let value = col.get(row)?;
    if matches!(value, AnyValue::Null) {
        return Ok(0);
    }
    any_to_count(value.clone()).ok_or_else(|| IngestError::InvalidValue {
        field: field.to_string(),
        value: any_to_string(value),
        row,
        path: path.to_path_buf(),
    })
}
