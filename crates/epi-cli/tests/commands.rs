use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use epi_cli::cli::{Cli, Command};
use epi_cli::commands::{
    Session, run_aliases, run_continents, run_estimate, run_fit, run_project, run_series,
    run_trajectory,
};
use epi_map::NameMapping;
use epi_model::GAMMA;

const DAILY: &str = "\
Date,Country/Region,Confirmed,Deaths,Recovered,Active,New cases,New deaths,New recovered,WHO Region
2020-01-22,France,10,1,2,7,10,1,2,Europe
2020-01-23,France,15,1,3,11,5,0,1,Europe
2020-01-24,France,20,2,5,13,5,1,2,Europe
2020-01-22,US,100,5,25,70,100,5,25,Americas
2020-01-23,US,120,6,30,84,20,1,5,Americas
";

const COUNTRIES: &str = "\
Country/Region,Confirmed,Deaths,Recovered,Active,New cases,New deaths,New recovered,WHO Region
France,20,2,5,13,5,1,2,Europe
US,120,6,30,84,20,1,5,Americas
";

const POPULATION: &str = "\
Country/Region,Continent,Population,TotalCases,TotalDeaths,TotalRecovered,ActiveCases
France,Europe,65273511,20,2,5,13
USA,North America,331002651,125,6,31,88
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(config: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("full_grouped.csv"), DAILY).expect("write daily");
        fs::write(dir.path().join("country_wise_latest.csv"), COUNTRIES).expect("write countries");
        fs::write(dir.path().join("worldometer_data.csv"), POPULATION).expect("write population");
        fs::write(dir.path().join("epi.toml"), config).expect("write config");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cli(&self, args: &[&str]) -> Cli {
        let data_dir = self.path().to_str().expect("utf-8 path").to_string();
        let config = self.path().join("epi.toml");
        let config = config.to_str().expect("utf-8 path").to_string();
        let mut argv = vec![
            "epi".to_string(),
            "--data-dir".to_string(),
            data_dir,
            "--config".to_string(),
            config,
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_string()));
        Cli::try_parse_from(argv).expect("parse arguments")
    }

    fn session(&self, cli: &Cli) -> Session {
        Session::from_cli(cli).expect("session")
    }
}

#[test]
fn series_for_a_country_carries_its_population() {
    let fixture = Fixture::new("");
    let export = fixture.path().join("france.csv");
    let export_arg = export.to_str().expect("utf-8 path");
    let cli = fixture.cli(&[
        "series",
        "--continent",
        "Europe",
        "--country",
        "France",
        "--csv",
        export_arg,
    ]);
    let Command::Series(args) = &cli.command else {
        panic!("expected series command");
    };
    let series = run_series(&fixture.session(&cli), args).expect("series");

    assert_eq!(series.len(), 3);
    assert_eq!(series.population(), Some(65_273_511));
    assert_eq!(series.points[2].total_active, 13);

    let written = fs::read_to_string(&export).expect("read export");
    let mut lines = written.lines();
    assert!(lines.next().expect("header").starts_with("date,confirmed,deaths"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn estimate_joins_aliased_population() {
    let fixture = Fixture::new("");
    let cli = fixture.cli(&["estimate", "US"]);
    let Command::Estimate(args) = &cli.command else {
        panic!("expected estimate command");
    };
    let report = run_estimate(&fixture.session(&cli), args).expect("estimate");

    assert_eq!(report.snapshot.population, 331_002_651);
    assert_eq!(report.snapshot.active, 84);
    assert!((report.params.gamma - GAMMA).abs() < 1e-12);
    assert!(report.params.beta > 0.0);
}

#[test]
fn config_file_sets_simulation_gamma() {
    let fixture = Fixture::new("[simulation]\ngamma = 0.5\n");
    let cli = fixture.cli(&["estimate", "France"]);
    let Command::Estimate(args) = &cli.command else {
        panic!("expected estimate command");
    };
    let report = run_estimate(&fixture.session(&cli), args).expect("estimate");
    assert!((report.params.gamma - 0.5).abs() < 1e-12);
}

#[test]
fn unknown_country_suggests_a_match() {
    let fixture = Fixture::new("");
    let cli = fixture.cli(&["estimate", "Frence"]);
    let Command::Estimate(args) = &cli.command else {
        panic!("expected estimate command");
    };
    let Err(error) = run_estimate(&fixture.session(&cli), args) else {
        panic!("unknown country must fail");
    };
    let message = format!("{error:#}");
    assert!(message.contains("France"), "{message}");
}

#[test]
fn trajectories_keep_argument_order() {
    let fixture = Fixture::new("");
    let export = fixture.path().join("runs.csv");
    let export_arg = export.to_str().expect("utf-8 path");
    let cli = fixture.cli(&["trajectory", "US", "France", "--days", "5", "--csv", export_arg]);
    let Command::Trajectory(args) = &cli.command else {
        panic!("expected trajectory command");
    };
    let runs = run_trajectory(&fixture.session(&cli), args).expect("trajectory");

    let labels: Vec<&str> = runs.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(labels, ["US", "France"]);
    assert!(runs.iter().all(|(_, run)| run.steps.len() == 5));

    // Seed row plus five days per country.
    let written = fs::read_to_string(&export).expect("read export");
    assert_eq!(written.lines().count(), 1 + 2 * 6);
}

#[test]
fn projection_samples_requested_grid() {
    let fixture = Fixture::new("");
    let cli = fixture.cli(&[
        "project",
        "--continent",
        "Europe",
        "--country",
        "France",
        "--horizon",
        "10",
        "--samples",
        "11",
    ]);
    let Command::Project(args) = &cli.command else {
        panic!("expected project command");
    };
    let report = run_project(&fixture.session(&cli), args).expect("project");

    assert_eq!(report.points.len(), 11);
    assert!((report.points[10].day - 10.0).abs() < 1e-9);
    assert!((report.params.alpha - 0.01).abs() < 1e-12);
    let seed = report.points[0].state;
    assert!((seed.susceptible - (65_273_511.0 - 7.0 - 2.0 - 1.0)).abs() < 1e-6);
    assert!((seed.infected - 7.0).abs() < 1e-9);
}

#[test]
fn fit_needs_more_than_one_day() {
    let fixture = Fixture::new("");
    let cli = fixture.cli(&[
        "fit",
        "--continent",
        "Europe",
        "--country",
        "France",
        "--start",
        "2020-01-24",
        "--end",
        "2020-01-24",
    ]);
    let Command::Fit(args) = &cli.command else {
        panic!("expected fit command");
    };
    let Err(error) = run_fit(&fixture.session(&cli), args) else {
        panic!("a single observation cannot be fitted");
    };
    assert!(format!("{error:#}").contains("at least two observations"));
}

#[test]
fn continents_group_population_rows() {
    let fixture = Fixture::new("");
    let cli = fixture.cli(&["continents"]);
    let summaries = run_continents(&fixture.session(&cli)).expect("continents");

    let names: Vec<&str> = summaries.iter().map(|s| s.continent.as_str()).collect();
    assert_eq!(names, ["Europe", "North America"]);
    assert_eq!(summaries[0].population, 65_273_511);
    assert_eq!(summaries[1].total_cases, 125);
}

#[test]
fn aliases_export_round_trips() {
    let fixture = Fixture::new("");
    let export = fixture.path().join("aliases.json");
    let export_arg = export.to_str().expect("utf-8 path");
    let cli = fixture.cli(&["aliases", "--export", export_arg]);
    let Command::Aliases(args) = &cli.command else {
        panic!("expected aliases command");
    };
    let printed = run_aliases(&fixture.session(&cli), args).expect("aliases");
    assert!(printed.is_none());

    let loaded = NameMapping::load(&export).expect("load exported table");
    assert_eq!(&loaded, NameMapping::builtin());
    assert_eq!(loaded.to_dataset_b("US"), Some("USA"));
}

#[test]
fn country_without_continent_is_rejected_by_parser() {
    let result = Cli::try_parse_from(["epi", "series", "--country", "France"]);
    assert!(result.is_err());
}
