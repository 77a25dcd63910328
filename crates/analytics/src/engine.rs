use crate::drawdown;
use crate::error::AnalyticsError;
use crate::report::{MetricRecord, MetricTable};
use crate::returns::{self, DatedReturn};
use crate::stats;
use chrono::{Months, NaiveDate};
use configuration::MetricsSettings;
use core_types::{PriceSeries, PriceTable, RecoveryDays};
use rayon::prelude::*;

/// A stateless calculator deriving a `MetricRecord` for every eligible ticker
/// of a price table.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    settings: MetricsSettings,
}

/// Why a ticker was left out of the metric table.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Ineligible {
    TooFewPoints(usize),
    LowCoverage(f64),
}

impl MetricsEngine {
    pub fn new(settings: MetricsSettings) -> Result<Self, AnalyticsError> {
        settings
            .validate()
            .map_err(|e| AnalyticsError::InvalidSettings(e.to_string()))?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &MetricsSettings {
        &self.settings
    }

    /// Computes metrics using the benchmark and risk-free rate from the settings.
    pub fn compute(&self, table: &PriceTable) -> Result<MetricTable, AnalyticsError> {
        self.compute_metrics(table, &self.settings.benchmark, self.settings.risk_free_rate)
    }

    /// The main entry point for calculating per-ticker metrics.
    ///
    /// # Arguments
    ///
    /// * `table` - Cleaned daily prices for the whole universe, benchmark included.
    /// * `benchmark` - Ticker whose returns define Beta. If absent, Beta is undefined for all rows.
    /// * `risk_free_rate` - Annual decimal rate subtracted from CAGR in Sharpe and Sortino.
    ///
    /// # Returns
    ///
    /// The records of every ticker with enough history inside the trailing
    /// window, in ticker order. Tickers below the coverage threshold are
    /// skipped, not reported as errors.
    pub fn compute_metrics(
        &self,
        table: &PriceTable,
        benchmark: &str,
        risk_free_rate: f64,
    ) -> Result<MetricTable, AnalyticsError> {
        if table.is_empty() {
            return Err(AnalyticsError::EmptyPriceTable);
        }
        let total = table.len();
        let latest = table
            .latest_date()
            .ok_or(AnalyticsError::NoEligibleTickers { total })?;
        let window_start = latest
            .checked_sub_months(Months::new(self.settings.lookback_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        let calendar_len = table.calendar_between(window_start, latest).len();

        tracing::info!(
            tickers = total,
            %window_start,
            window_end = %latest,
            trading_days = calendar_len,
            "Computing metrics."
        );

        let market = match table.get(benchmark) {
            Some(series) => Some(self.clipped(returns::dated_returns(&series.since(window_start)))),
            None => {
                tracing::warn!(benchmark, "Benchmark not in price table; Beta is undefined for every ticker.");
                None
            }
        };

        let universe: Vec<(&str, &PriceSeries)> = table.iter().collect();
        let rows: Vec<Option<(String, MetricRecord)>> = universe
            .par_iter()
            .map(|(ticker, series)| {
                let window = series.since(window_start);
                match self.eligibility(&window, calendar_len) {
                    Ok(()) => Some((
                        ticker.to_string(),
                        self.evaluate(&window, market.as_deref(), risk_free_rate),
                    )),
                    Err(reason) => {
                        tracing::debug!(ticker, ?reason, "Skipping ineligible ticker.");
                        None
                    }
                }
            })
            .collect();

        let metrics: MetricTable = rows.into_iter().flatten().collect();
        if metrics.is_empty() {
            return Err(AnalyticsError::NoEligibleTickers { total });
        }

        tracing::info!(
            eligible = metrics.len(),
            skipped = total - metrics.len(),
            "Metrics computed."
        );
        Ok(metrics)
    }

    fn eligibility(&self, window: &PriceSeries, calendar_len: usize) -> Result<(), Ineligible> {
        if window.len() < 2 {
            return Err(Ineligible::TooFewPoints(window.len()));
        }
        let coverage = window.len() as f64 / calendar_len.max(1) as f64;
        if coverage < self.settings.min_coverage {
            return Err(Ineligible::LowCoverage(coverage));
        }
        Ok(())
    }

    fn clipped(&self, dated: Vec<DatedReturn>) -> Vec<DatedReturn> {
        let values: Vec<f64> = dated.iter().map(|(_, r)| *r).collect();
        let clipped = returns::clip_returns(&values, self.settings.return_clip);
        dated.into_iter().map(|(d, _)| d).zip(clipped).collect()
    }

    /// Computes one record. Each statistic fails independently to `None`.
    fn evaluate(
        &self,
        window: &PriceSeries,
        market: Option<&[DatedReturn]>,
        risk_free_rate: f64,
    ) -> MetricRecord {
        let periods_per_year = f64::from(self.settings.trading_days_per_year);
        let annualizer = periods_per_year.sqrt();

        let dated = returns::dated_returns(window);
        let raw: Vec<f64> = dated.iter().map(|(_, r)| *r).collect();
        let clipped_dated = self.clipped(dated);
        let clipped: Vec<f64> = clipped_dated.iter().map(|(_, r)| *r).collect();

        // Growth follows the price path, so it is computed on unclipped returns.
        let cagr = returns::compound_annual_growth(&raw, periods_per_year);
        let excess = cagr.map(|c| c - risk_free_rate);

        let volatility = stats::sample_std(&clipped).map(|s| s * annualizer);
        let sharpe = stats::ratio(excess, volatility);

        let downside: Vec<f64> = clipped.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_deviation = stats::sample_std(&downside).map(|s| s * annualizer);
        let sortino = stats::ratio(excess, downside_deviation);

        let (max_drawdown, recovery_days) = match drawdown::analyze(window) {
            Some(a) => (Some(a.max_drawdown), a.recovery_days),
            None => (None, RecoveryDays::Unrecovered),
        };
        let calmar = match max_drawdown {
            Some(mdd) if mdd != 0.0 => cagr.map(|c| c / mdd.abs()),
            _ => None,
        };

        let beta = market.and_then(|m| self.beta(&clipped_dated, m));

        MetricRecord {
            cagr,
            volatility,
            sharpe,
            sortino,
            calmar,
            max_drawdown,
            beta,
            recovery_days,
            observations: window.len(),
            start: window.first_date().unwrap_or(NaiveDate::MIN),
            end: window.last_date().unwrap_or(NaiveDate::MIN),
        }
    }

    /// Covariance with the market over market variance, on date-aligned returns.
    fn beta(&self, asset: &[DatedReturn], market: &[DatedReturn]) -> Option<f64> {
        let pairs = returns::align(asset, market);
        if pairs.len() < self.settings.min_beta_overlap.max(2) {
            return None;
        }
        let (a, m): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let variance = stats::sample_variance(&m)?;
        if variance <= stats::DEGENERATE_DISPERSION * stats::DEGENERATE_DISPERSION {
            return None;
        }
        Some(stats::sample_covariance(&a, &m)? / variance)
    }
}
