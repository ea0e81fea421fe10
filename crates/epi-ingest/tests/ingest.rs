use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use epi_ingest::{
    CsvSource, DataConnection, DataSource, Dataset, DatasetFiles, IngestError, InMemorySource,
    read_daily_table, read_population_table,
};

const DAILY: &str = "\
Date,Country/Region,Confirmed,Deaths,Recovered,Active,New cases,New deaths,New recovered,WHO Region
2020-01-22,France,10,1,2,7,10,1,2,Europe
2020-01-23,France,15,1,3,11,5,0,1,Europe
2020-01-23,France,15,1,3,11,5,0,1,Europe
2020-01-22,Italy,4,0,0,4,4,0,0,Europe
";

const COUNTRIES: &str = "\
Country.Region,Confirmed,Deaths,Recovered,Active,New.cases,New.deaths,New.recovered,WHO.Region
France,15,1,3,11,5,0,1,Europe
US,120,6,30,84,20,1,5,Americas
";

const POPULATION: &str = "\
Country/Region,Continent,Population,TotalCases,TotalDeaths,TotalRecovered,ActiveCases
France,Europe,65273511,16,1,3,12
USA,North America,331002651,125,6,31,
Diamond Princess,,,712,13,651,48
";

fn write_dataset(dir: &Path) {
    fs::write(dir.join("full_grouped.csv"), DAILY).expect("write daily");
    fs::write(dir.join("country_wise_latest.csv"), COUNTRIES).expect("write countries");
    fs::write(dir.join("worldometer_data.csv"), POPULATION).expect("write population");
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn csv_source_loads_all_tables() {
    let dir = TempDir::new().expect("temp dir");
    write_dataset(dir.path());
    let source = CsvSource::new(dir.path());

    let conn = source.connect().expect("connect");
    // Duplicate France row on 2020-01-23 is dropped.
    assert_eq!(conn.daily_rows().len(), 3);
    assert_eq!(conn.date_range(), Some((date(2020, 1, 22), date(2020, 1, 23))));

    let us = conn.country_row("us").expect("US snapshot row");
    assert_eq!(us.new_cases, 20);
    assert_eq!(us.region.as_deref(), Some("Americas"));

    let usa = conn.population_row("USA").expect("USA population row");
    assert_eq!(usa.population, Some(331_002_651));
    assert_eq!(usa.active_cases, None);
    assert_eq!(usa.continent.as_deref(), Some("North America"));
}

#[test]
fn connections_are_released_on_drop() {
    let dir = TempDir::new().expect("temp dir");
    write_dataset(dir.path());
    let source = CsvSource::new(dir.path());
    {
        let _first = source.connect().expect("connect");
        let _second = source.connect().expect("connect");
        assert_eq!(source.open_connections(), 2);
    }
    assert_eq!(source.open_connections(), 0);
}

#[test]
fn population_without_value_is_none() {
    let dir = TempDir::new().expect("temp dir");
    write_dataset(dir.path());
    let rows = read_population_table(&dir.path().join("worldometer_data.csv")).expect("read");
    let ship = rows
        .iter()
        .find(|row| row.country == "Diamond Princess")
        .expect("ship row");
    assert_eq!(ship.population, None);
    assert_eq!(ship.continent, None);
    assert_eq!(ship.total_cases, Some(712));
}

#[test]
fn missing_column_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("daily.csv");
    fs::write(&path, "Date,Country/Region,Confirmed,Deaths\n2020-01-22,France,1,0\n")
        .expect("write");
    let err = read_daily_table(&path).expect_err("missing columns");
    assert!(matches!(err, IngestError::MissingColumn { .. }));
}

#[test]
fn short_dates_are_accepted() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("daily.csv");
    fs::write(
        &path,
        "Date,Country.Region,Province.State,Confirmed,Deaths,Recovered,Active,WHO.Region\n\
         1/22/20,China,Hubei,444,17,28,399,Western Pacific\n",
    )
    .expect("write");
    let rows = read_daily_table(&path).expect("read");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, date(2020, 1, 22));
    assert_eq!(rows[0].province.as_deref(), Some("Hubei"));
    assert_eq!(rows[0].region, "Western Pacific");
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("nope");
    let err = Dataset::load(&missing, &DatasetFiles::default()).expect_err("missing dir");
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = CsvSource::new(dir.path())
        .connect()
        .err()
        .expect("missing files");
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn in_memory_source_borrows_dataset() {
    let source = InMemorySource::new(Dataset::default());
    let conn = source.connect().expect("connect");
    assert!(conn.daily_rows().is_empty());
    assert_eq!(conn.date_range(), None);
    assert_eq!(source.open_connections(), 1);
    drop(conn);
    assert_eq!(source.open_connections(), 0);
}

#[test]
fn sources_describe_where_rows_come_from() {
    let dir = TempDir::new().expect("temp dir");
    write_dataset(dir.path());
    let csv = CsvSource::new(dir.path());
    assert!(csv.describe().contains(&dir.path().display().to_string()));

    let dataset = Dataset::load(dir.path(), &DatasetFiles::default()).expect("load");
    let memory = InMemorySource::new(dataset);
    assert_eq!(memory.describe(), "in-memory (3 daily rows)");
}
