mod common;

use epi_core::{Aggregator, QueryError};
use epi_map::{ReconcileError, Reconciler};
use epi_model::{AggregateOptions, DateWindow, Scope};

use common::{date, source};

#[test]
fn global_series_sums_every_row_per_date() {
    let source = source();
    let reconciler = Reconciler::new();
    let series = Aggregator::new(&source, &reconciler)
        .aggregate(&Scope::Global, DateWindow::default())
        .expect("aggregate");

    assert_eq!(series.len(), 3);
    let dates: Vec<_> = series.points.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![date(1), date(2), date(3)]);
    // 100 + 200 + 300 + 400 + 10 + 1 confirmed on day 1.
    assert_eq!(series.points[0].total_confirmed, 1_011);
    assert_eq!(series.points[2].total_confirmed, 3_033);
    assert_eq!(
        series.population(),
        Some(65_000_000 + 60_000_000 + 331_000_000 + 1_400_000_000)
    );
    assert!(series.is_partial());
    assert!(series.unresolved.contains("Atlantis"));
}

#[test]
fn strict_policy_fails_on_unresolved_country() {
    let source = source();
    let reconciler = Reconciler::new();
    let err = Aggregator::new(&source, &reconciler)
        .with_options(AggregateOptions::strict())
        .aggregate(&Scope::Global, DateWindow::default())
        .expect_err("Atlantis is unresolved");
    assert!(matches!(
        err,
        QueryError::Unresolved(ReconcileError::NotFound { .. })
    ));
    assert_eq!(source.open_connections(), 0);
}

#[test]
fn continent_scope_restricts_rows_and_population() {
    let source = source();
    let reconciler = Reconciler::new();
    let scope = Scope::from_query(Some("Europe"), None, None).expect("scope");
    let series = Aggregator::new(&source, &reconciler)
        .aggregate(&scope, DateWindow::default())
        .expect("aggregate");
    assert_eq!(series.points[0].total_confirmed, 301);
    assert_eq!(series.population(), Some(125_000_000));
}

#[test]
fn country_scope_resolves_through_alias() {
    let source = source();
    let reconciler = Reconciler::new();
    let scope = Scope::from_query(Some("Americas"), Some("US"), None).expect("scope");
    let series = Aggregator::new(&source, &reconciler)
        .aggregate(&scope, DateWindow::default())
        .expect("aggregate");
    assert_eq!(series.population(), Some(331_000_000));
    assert_eq!(series.points[1].total_deaths, 6);
    assert!(!series.is_partial());
}

#[test]
fn either_dataset_spelling_selects_the_same_rows() {
    let source = source();
    let reconciler = Reconciler::new();
    let aggregator = Aggregator::new(&source, &reconciler);
    let by_snapshot_name = aggregator
        .aggregate(
            &Scope::from_query(Some("Americas"), Some("US"), None).expect("scope"),
            DateWindow::default(),
        )
        .expect("aggregate US");
    let by_population_name = aggregator
        .aggregate(
            &Scope::from_query(Some("Americas"), Some("USA"), None).expect("scope"),
            DateWindow::default(),
        )
        .expect("aggregate USA");

    assert_eq!(by_population_name.len(), 3);
    assert_eq!(by_population_name.points, by_snapshot_name.points);
    assert_eq!(by_population_name.window, by_snapshot_name.window);
    assert_eq!(by_population_name.population(), Some(331_000_000));
}

#[test]
fn province_scope_uses_country_population() {
    let source = source();
    let reconciler = Reconciler::new();
    let scope =
        Scope::from_query(Some("Western Pacific"), Some("China"), Some("Hubei")).expect("scope");
    let series = Aggregator::new(&source, &reconciler)
        .aggregate(&scope, DateWindow::default())
        .expect("aggregate");
    assert_eq!(series.points[0].total_confirmed, 400);
    assert_eq!(series.population(), Some(1_400_000_000));
}

#[test]
fn unresolved_country_scope_is_an_error() {
    let source = source();
    let reconciler = Reconciler::new();
    let scope = Scope::from_query(Some("Europe"), Some("Atlantis"), None).expect("scope");
    let result = Aggregator::new(&source, &reconciler).aggregate(&scope, DateWindow::default());
    assert!(matches!(result, Err(QueryError::Unresolved(_))));
    assert_eq!(source.open_connections(), 0);
}

#[test]
fn window_is_clamped_to_observed_dates() {
    let source = source();
    let reconciler = Reconciler::new();
    let window = DateWindow::parse(Some("2019-12-01"), Some("2020-03-02")).expect("window");
    let series = Aggregator::new(&source, &reconciler)
        .aggregate(&Scope::Global, window)
        .expect("aggregate");
    assert_eq!(series.window, Some((date(1), date(2))));
    assert_eq!(series.len(), 2);
}

#[test]
fn window_before_first_observation_is_empty() {
    let source = source();
    let reconciler = Reconciler::new();
    let window = DateWindow::parse(Some("2019-01-01"), Some("2019-12-31")).expect("window");
    let series = Aggregator::new(&source, &reconciler)
        .aggregate(&Scope::Global, window)
        .expect("aggregate");
    assert!(series.is_empty());
    assert_eq!(series.window, None);
}

#[test]
fn aggregation_is_idempotent() {
    let source = source();
    let reconciler = Reconciler::new();
    let aggregator = Aggregator::new(&source, &reconciler);
    let scope = Scope::from_query(Some("Europe"), None, None).expect("scope");
    let first = aggregator.aggregate(&scope, DateWindow::default()).expect("first");
    let second = aggregator.aggregate(&scope, DateWindow::default()).expect("second");
    assert_eq!(first, second);
}
