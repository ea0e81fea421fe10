use chrono::NaiveDate;
use tempfile::TempDir;

use epi_ingest::{DataSource, Dataset, InMemorySource};
use epi_map::{
    MAPPING_VERSION, NameMapping, ReconcileError, Reconciler, ResolutionSource,
};
use epi_model::{CountryRecord, DailyRecord, PopulationRecord};

fn country(name: &str, region: &str) -> CountryRecord {
    CountryRecord {
        country: name.to_string(),
        region: Some(region.to_string()),
        confirmed: 100,
        deaths: 5,
        recovered: 20,
        active: 75,
        new_cases: 10,
        new_deaths: 1,
        new_recovered: 2,
    }
}

fn population(name: &str, continent: &str, population: Option<u64>) -> PopulationRecord {
    PopulationRecord {
        country: name.to_string(),
        continent: Some(continent.to_string()),
        population,
        total_cases: Some(100),
        total_deaths: Some(5),
        total_recovered: Some(20),
        active_cases: Some(75),
    }
}

fn source() -> InMemorySource {
    let daily = vec![DailyRecord {
        date: NaiveDate::from_ymd_opt(2020, 3, 1).expect("date"),
        region: "Europe".to_string(),
        country: "Kosovo".to_string(),
        province: None,
        confirmed: 1,
        deaths: 0,
        recovered: 0,
        active: 1,
    }];
    let countries = vec![
        country("US", "Americas"),
        country("United Kingdom", "Europe"),
        country("France", "Europe"),
        country("Diamond Princess", "Western Pacific"),
    ];
    let populations = vec![
        population("USA", "North America", Some(331_002_651)),
        population("UK", "Europe", Some(67_886_011)),
        population("France", "Europe", Some(65_273_511)),
        population("Diamond Princess", "Asia", None),
    ];
    InMemorySource::new(Dataset::new(daily, countries, populations))
}

#[test]
fn direct_join_resolves() {
    let source = source();
    let conn = source.connect().expect("connect");
    let identity = Reconciler::new().resolve(conn.as_ref(), "France").expect("France");
    assert_eq!(identity.source, ResolutionSource::Direct);
    assert_eq!(identity.population, 65_273_511);
    assert_eq!(identity.continent.as_deref(), Some("Europe"));
}

#[test]
fn alias_round_trip_yields_same_identity() {
    let source = source();
    let conn = source.connect().expect("connect");
    let reconciler = Reconciler::new();
    let from_a = reconciler.resolve(conn.as_ref(), "US").expect("US");
    let from_b = reconciler.resolve(conn.as_ref(), "USA").expect("USA");
    assert_eq!(from_a, from_b);
    assert_eq!(from_a.source, ResolutionSource::Alias);
    assert_eq!(from_a.country_name, "US");
    assert_eq!(from_a.population_name.as_deref(), Some("USA"));

    let uk = reconciler.resolve(conn.as_ref(), "UK").expect("UK");
    assert_eq!(uk.country_name, "United Kingdom");
}

#[test]
fn override_bypasses_population_table() {
    let source = source();
    let conn = source.connect().expect("connect");
    let identity = Reconciler::new().resolve(conn.as_ref(), "Kosovo").expect("Kosovo");
    assert_eq!(identity.source, ResolutionSource::Override);
    assert_eq!(identity.population, 1_810_366);
    assert_eq!(identity.population_name, None);
}

#[test]
fn unknown_country_is_not_found_with_suggestions() {
    let source = source();
    let conn = source.connect().expect("connect");
    let err = Reconciler::new()
        .resolve(conn.as_ref(), "Frnace")
        .expect_err("typo");
    match err {
        ReconcileError::NotFound { name, suggestions } => {
            assert_eq!(name, "Frnace");
            assert_eq!(suggestions, vec!["France".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_population_is_not_defaulted() {
    let source = source();
    let conn = source.connect().expect("connect");
    let err = Reconciler::new()
        .resolve(conn.as_ref(), "Diamond Princess")
        .expect_err("no population");
    assert!(matches!(err, ReconcileError::MissingPopulation { .. }));
}

#[test]
fn custom_mapping_without_alias_fails() {
    let source = source();
    let conn = source.connect().expect("connect");
    let reconciler = Reconciler::with_mapping(NameMapping::new());
    assert!(reconciler.resolve(conn.as_ref(), "US").is_err());
    assert!(reconciler.resolve(conn.as_ref(), "France").is_ok());
}

#[test]
fn mapping_round_trips_through_json_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("aliases.json");
    let mut mapping = NameMapping::new();
    mapping.insert_alias("Burma", "Myanmar");
    mapping.insert_override("Kosovo", 1_810_366, Some("Europe"));
    mapping.save(&path).expect("save");

    let loaded = NameMapping::load(&path).expect("load");
    assert_eq!(loaded, mapping);
    assert_eq!(loaded.version, MAPPING_VERSION);
}

#[test]
fn mapping_file_shape_is_stable() {
    let mut mapping = NameMapping::new();
    mapping.insert_alias("US", "USA");
    mapping.insert_override("Holy See", 801, None);
    insta::assert_json_snapshot!(mapping, @r#"
    {
      "version": 1,
      "aliases": [
        {
          "dataset_a": "US",
          "dataset_b": "USA"
        }
      ],
      "overrides": [
        {
          "country": "Holy See",
          "population": 801,
          "continent": null
        }
      ]
    }
    "#);
}

#[test]
fn other_versions_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("aliases.json");
    std::fs::write(&path, r#"{"version": 7, "aliases": [], "overrides": []}"#).expect("write");
    let err = NameMapping::load(&path).expect_err("version");
    assert!(matches!(
        err,
        ReconcileError::UnsupportedVersion { found: 7, .. }
    ));
}
