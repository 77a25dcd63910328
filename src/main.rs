use analytics::{MetricTable, MetricsEngine};
use analyzer::{Analyzer, RankedResult, SensitivityAnalyzer, SensitivityReport};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use configuration::settings::Config;
use configuration::{LoggingSettings, ProfileRegistry, load_config};
use core_types::Metric;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// The main entry point for the screener application.
fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging)?;

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);
    let _entered = span.enter();

    match cli.command {
        Commands::Rank(args) => handle_rank(args, config),
        Commands::Sensitivity(args) => handle_sensitivity(args, config),
        Commands::Profiles => handle_profiles(&config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Ranks assets on risk-adjusted performance from daily price history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./screener.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics and rank every ticker under one weight profile.
    Rank(RankArgs),
    /// Compare the top-K of every weight profile against a baseline profile.
    Sensitivity(SensitivityArgs),
    /// List the available weight profiles and their weights.
    Profiles,
}

/// Options shared by every command that reads a price file.
#[derive(clap::Args)]
struct PriceArgs {
    /// Wide CSV of daily prices: a Date column followed by one column per ticker.
    #[arg(long)]
    prices: PathBuf,

    /// Ticker used as the market for Beta (e.g., "^NSEI").
    #[arg(long)]
    benchmark: Option<String>,

    /// Annual risk-free rate as a decimal (e.g., 0.06).
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Keep the benchmark in the ranking universe.
    #[arg(long)]
    include_benchmark: bool,
}

#[derive(clap::Args)]
struct RankArgs {
    #[command(flatten)]
    prices: PriceArgs,

    /// Weight profile to score with (e.g., "balanced", "risk-priority").
    #[arg(long)]
    profile: Option<String>,

    /// Number of rows to print. The JSON output always holds the full ranking.
    #[arg(long)]
    top: Option<usize>,

    /// Also write the ranking as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(clap::Args)]
struct SensitivityArgs {
    #[command(flatten)]
    prices: PriceArgs,

    /// Profile the others are compared against.
    #[arg(long)]
    baseline: Option<String>,

    /// Size of the leader set compared between profiles.
    #[arg(long)]
    top_k: Option<usize>,

    /// Also write the report as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// The returned guard flushes the file writer on drop and must live until exit.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("Invalid log level '{}'", settings.level))?;

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "screener.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads prices and computes the metric table the ranking commands share.
fn compute_universe(args: &PriceArgs, config: &Config) -> anyhow::Result<MetricTable> {
    let mut settings = config.metrics.clone();
    if let Some(benchmark) = &args.benchmark {
        settings.benchmark = benchmark.clone();
    }
    if let Some(rate) = args.risk_free_rate {
        settings.risk_free_rate = rate;
    }
    let include_benchmark = args.include_benchmark || config.ranking.include_benchmark;

    let prices = data_handler::load_price_table(&args.prices, &config.data)
        .with_context(|| format!("Failed to load prices from {}", args.prices.display()))?;

    let engine = MetricsEngine::new(settings)?;
    let metrics = engine.compute(&prices)?;

    if include_benchmark {
        Ok(metrics)
    } else {
        Ok(metrics.without(&engine.settings().benchmark))
    }
}

fn handle_rank(args: RankArgs, config: Config) -> anyhow::Result<()> {
    let registry = ProfileRegistry::from_config(&config)?;
    let profile = args.profile.as_deref().unwrap_or(&config.ranking.profile);
    let analyzer = Analyzer::from_registry(&registry, profile)?;

    let metrics = compute_universe(&args.prices, &config)?;
    let ranked = analyzer.rank(&metrics)?;

    let top = args.top.or(config.ranking.top).unwrap_or(ranked.len());
    println!("Profile: {}", analyzer.profile().name());
    println!("{}", ranking_table(&ranked[..top.min(ranked.len())]));

    if let Some(path) = &args.json {
        write_json(path, &ranked)?;
    }
    Ok(())
}

fn handle_sensitivity(args: SensitivityArgs, config: Config) -> anyhow::Result<()> {
    let registry = ProfileRegistry::from_config(&config)?;
    let baseline = args
        .baseline
        .as_deref()
        .unwrap_or(&config.ranking.sensitivity_baseline);
    let top_k = args.top_k.unwrap_or(config.ranking.sensitivity_top_k);
    let analyzer = SensitivityAnalyzer::new(&registry, baseline, top_k)?;

    let metrics = compute_universe(&args.prices, &config)?;
    let report = analyzer.run(&metrics)?;

    println!("{}", sensitivity_table(&report));
    println!("Mean overlap: {:.1}%", report.stability());

    if let Some(path) = &args.json {
        write_json(path, &report)?;
    }
    Ok(())
}

fn handle_profiles(config: &Config) -> anyhow::Result<()> {
    let registry = ProfileRegistry::from_config(config)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("Profile")];
    header.extend(Metric::ALL.iter().map(|m| Cell::new(m.key())));
    table.set_header(header);

    for profile in registry.iter() {
        let mut row = vec![Cell::new(profile.name())];
        row.extend(
            Metric::ALL
                .iter()
                .map(|m| Cell::new(format!("{:.2}", profile.weight(*m))).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn ranking_table(ranked: &[RankedResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Rank", "Ticker", "Score", "CAGR", "Vol", "Sharpe", "Sortino", "Calmar", "MaxDD", "Beta", "Recovery",
    ]);

    for r in ranked {
        let m = &r.record;
        table.add_row(vec![
            Cell::new(r.rank),
            Cell::new(&r.ticker),
            number(Some(r.score), 4),
            percent(m.cagr),
            percent(m.volatility),
            number(m.sharpe, 2),
            number(m.sortino, 2),
            number(m.calmar, 2),
            percent(m.max_drawdown),
            number(m.beta, 2),
            Cell::new(m.recovery_days.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn sensitivity_table(report: &SensitivityReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Profile", "Leaders", "Overlap", "Overlap %"]);

    table.add_row(vec![
        Cell::new(format!("{} (baseline)", report.baseline)),
        Cell::new(report.baseline_top.join(", ")),
        Cell::new(report.top_k),
        Cell::new("100.0"),
    ]);
    for (name, overlap) in &report.profiles {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(overlap.top_tickers.join(", ")),
            Cell::new(overlap.overlap_count),
            Cell::new(format!("{:.1}", overlap.overlap_pct)),
        ]);
    }
    table
}

/// Undefined statistics print as "NaN".
fn number(value: Option<f64>, precision: usize) -> Cell {
    let text = value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.precision$}"));
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn percent(value: Option<f64>) -> Cell {
    number(value.map(|v| v * 100.0), 2)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    tracing::info!(path = %path.display(), "JSON output written.");
    Ok(())
}
