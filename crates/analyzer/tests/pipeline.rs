//! End-to-end runs from a price file on disk to a ranking.

use analytics::{MetricTable, MetricsEngine};
use analyzer::{Analyzer, SensitivityAnalyzer};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use configuration::{CanonicalProfile, DataSettings, MetricsSettings, ProfileRegistry, WeightProfile};
use core_types::{Metric, PriceTable};
use std::io::Write;

const RETURNS: usize = 756;

fn weekdays(count: usize) -> Vec<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(date);
        }
        date += Duration::days(1);
    }
    out
}

/// Geometric growth at `annual` with a 1% sawtooth on alternate days. The
/// sawtooth is back at 1.0 on the last day, so CAGR is exactly `annual`.
fn growth_path(annual: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|t| {
            let noise = if t % 2 == 0 { 1.0 } else { 1.01 };
            100.0 * (1.0 + annual).powf(t as f64 / 252.0) * noise
        })
        .collect()
}

fn write_prices(columns: &[(&str, Vec<f64>)]) -> tempfile::NamedTempFile {
    let dates = weekdays(RETURNS + 1);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let header: Vec<&str> = columns.iter().map(|(t, _)| *t).collect();
    writeln!(file, "Date,{}", header.join(",")).unwrap();
    for (i, date) in dates.iter().enumerate() {
        let cells: Vec<String> = columns.iter().map(|(_, p)| format!("{:.10}", p[i])).collect();
        writeln!(file, "{},{}", date.format("%Y-%m-%d"), cells.join(",")).unwrap();
    }
    file
}

fn load(columns: &[(&str, Vec<f64>)]) -> PriceTable {
    let file = write_prices(columns);
    data_handler::load_price_table(file.path(), &DataSettings::default()).unwrap()
}

fn three_growth_assets() -> Vec<(&'static str, Vec<f64>)> {
    vec![
        ("SLOW", growth_path(0.05, RETURNS + 1)),
        ("FAST", growth_path(0.20, RETURNS + 1)),
        ("MID", growth_path(0.10, RETURNS + 1)),
    ]
}

#[test]
fn growth_rates_survive_the_round_trip_through_disk() {
    let table = load(&three_growth_assets());
    let metrics = MetricsEngine::new(MetricsSettings::default())
        .unwrap()
        .compute(&table)
        .unwrap();

    let cagr = |t: &str| metrics.get(t).unwrap().cagr.unwrap();
    assert!((cagr("FAST") - 0.20).abs() < 1e-6);
    assert!((cagr("MID") - 0.10).abs() < 1e-6);
    assert!((cagr("SLOW") - 0.05).abs() < 1e-6);
    assert_eq!(metrics.get("FAST").unwrap().observations, RETURNS + 1);
}

#[test]
fn a_growth_only_profile_orders_by_cagr() {
    let table = load(&three_growth_assets());
    let metrics = MetricsEngine::new(MetricsSettings::default())
        .unwrap()
        .compute(&table)
        .unwrap();

    let growth = WeightProfile::new("growth", [(Metric::Cagr, 1.0)]).unwrap();
    let ranked = Analyzer::new(growth).rank(&metrics).unwrap();

    let order: Vec<&str> = ranked.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(order, vec!["FAST", "MID", "SLOW"]);
    assert!((ranked[0].score - 1.0).abs() < 1e-9);
    assert!(ranked[2].score.abs() < 1e-9);
}

#[test]
fn equal_weights_order_the_cagr_component_by_growth() {
    let table = load(&three_growth_assets());
    let metrics = MetricsEngine::new(MetricsSettings::default())
        .unwrap()
        .compute(&table)
        .unwrap();

    let ranked = Analyzer::new(CanonicalProfile::EqualWeight.profile()).rank(&metrics).unwrap();
    let component = |t: &str| {
        ranked.iter().find(|r| r.ticker == t).unwrap().normalized[&Metric::Cagr]
    };
    assert!(component("FAST") > component("MID"));
    assert!(component("MID") > component("SLOW"));
    assert_eq!(component("FAST"), 1.0);
    assert_eq!(component("SLOW"), 0.0);
}

#[test]
fn a_missing_benchmark_leaves_beta_undefined_but_scores_finite() {
    let table = load(&three_growth_assets());
    let metrics = MetricsEngine::new(MetricsSettings::default())
        .unwrap()
        .compute_metrics(&table, "^NOT_THERE", 0.06)
        .unwrap();

    assert!(metrics.iter().all(|(_, r)| r.beta.is_none()));

    let registry = ProfileRegistry::canonical();
    for canonical in CanonicalProfile::ALL {
        let ranked = Analyzer::from_registry(&registry, canonical.name())
            .unwrap()
            .rank(&metrics)
            .unwrap();
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| r.score.is_finite()));
    }
}

#[test]
fn the_benchmark_defines_beta_and_can_be_left_out_of_the_universe() {
    let mut columns = three_growth_assets();
    columns.push(("^NSEI", growth_path(0.08, RETURNS + 1)));
    let table = load(&columns);

    let metrics = MetricsEngine::new(MetricsSettings::default())
        .unwrap()
        .compute(&table)
        .unwrap();
    assert!(metrics.iter().all(|(_, r)| r.beta.is_some_and(f64::is_finite)));
    assert!((metrics.get("^NSEI").unwrap().beta.unwrap() - 1.0).abs() < 1e-9);

    let universe: MetricTable = metrics.without("^NSEI");
    assert_eq!(universe.len(), 3);
    assert!(universe.get("^NSEI").is_none());
}

#[test]
fn repeated_runs_are_identical() {
    let table = load(&three_growth_assets());
    let engine = MetricsEngine::new(MetricsSettings::default()).unwrap();
    let registry = ProfileRegistry::canonical();

    let first = engine.compute(&table).unwrap();
    let second = engine.compute(&table).unwrap();
    assert_eq!(first, second);

    let balanced = Analyzer::from_registry(&registry, "balanced").unwrap();
    assert_eq!(balanced.rank(&first).unwrap(), balanced.rank(&second).unwrap());

    let sensitivity = SensitivityAnalyzer::new(&registry, "balanced", 2).unwrap();
    assert_eq!(sensitivity.run(&first).unwrap(), sensitivity.run(&second).unwrap());
}
