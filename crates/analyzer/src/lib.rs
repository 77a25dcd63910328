use crate::error::AnalyzerError;
use crate::scoring::score_table;
use analytics::{MetricRecord, MetricTable};
use configuration::{ProfileRegistry, WeightProfile};
use core_types::Metric;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub mod error;
pub mod scoring;
pub mod sensitivity;

pub use sensitivity::{ProfileOverlap, SensitivityAnalyzer, SensitivityReport};

/// A ticker's metrics together with its composite score and 1-based rank.
///
/// Serializes as one flat row: `Rank`, `Ticker`, `FinalScore`, the metric
/// columns (`CAGR` .. `RecoveryDays`, `null` when undefined) and `Normalized`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RankedResult {
    pub rank: usize,
    pub ticker: String,
    #[serde(rename = "FinalScore")]
    pub score: f64,
    #[serde(flatten)]
    pub record: MetricRecord,
    /// Per-metric components in `[0, 1]` after orientation and min-max scaling.
    pub normalized: BTreeMap<Metric, f64>,
}

/// The scoring and ranking engine for one weight profile.
#[derive(Debug, Clone)]
pub struct Analyzer {
    profile: WeightProfile,
}

impl Analyzer {
    pub fn new(profile: WeightProfile) -> Self {
        Self { profile }
    }

    /// Builds an analyzer for the named profile.
    pub fn from_registry(registry: &ProfileRegistry, name: &str) -> Result<Self, AnalyzerError> {
        Ok(Self::new(registry.get(name)?.clone()))
    }

    pub fn profile(&self) -> &WeightProfile {
        &self.profile
    }

    /// Normalizes, scores, and ranks every row of the metric table.
    ///
    /// Rows are sorted by descending score. The sort is stable, so equal
    /// scores keep the table's row order.
    pub fn rank(&self, metrics: &MetricTable) -> Result<Vec<RankedResult>, AnalyzerError> {
        if metrics.is_empty() {
            return Err(AnalyzerError::EmptyUniverse);
        }

        let mut scored: Vec<_> = score_table(metrics, &self.profile)
            .into_iter()
            .zip(metrics.iter())
            .collect();

        scored.sort_by(|(a, _), (b, _)| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let ranked: Vec<RankedResult> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (row, (_, record)))| RankedResult {
                rank: i + 1,
                ticker: row.ticker,
                score: row.score,
                record: record.clone(),
                normalized: row.normalized,
            })
            .collect();

        tracing::info!(
            profile = self.profile.name(),
            tickers = ranked.len(),
            leader = ranked.first().map(|r| r.ticker.as_str()),
            "Ranking complete."
        );
        Ok(ranked)
    }
}

/// Ranks `metrics` under `profile`.
pub fn rank(metrics: &MetricTable, profile: &WeightProfile) -> Result<Vec<RankedResult>, AnalyzerError> {
    Analyzer::new(profile.clone()).rank(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::RecoveryDays;

    fn record(cagr: f64, recovery_days: RecoveryDays) -> MetricRecord {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        MetricRecord {
            cagr: Some(cagr),
            volatility: Some(0.2),
            sharpe: None,
            sortino: Some(1.1),
            calmar: Some(0.8),
            max_drawdown: Some(-0.25),
            beta: None,
            recovery_days,
            observations: 250,
            start: day,
            end: day,
        }
    }

    #[test]
    fn ranked_rows_export_as_flat_named_columns() {
        let table: MetricTable = [
            ("AAA".to_string(), record(0.2, RecoveryDays::Days(30))),
            ("BBB".to_string(), record(0.1, RecoveryDays::Unrecovered)),
        ]
        .into_iter()
        .collect();
        let ranked = Analyzer::new(configuration::CanonicalProfile::Balanced.profile())
            .rank(&table)
            .unwrap();

        let json = serde_json::to_value(&ranked).unwrap();
        let top = &json[0];
        assert_eq!(top["Rank"], 1);
        assert_eq!(top["Ticker"], "AAA");
        assert!(top["FinalScore"].is_f64());
        assert_eq!(top["CAGR"], 0.2);
        assert_eq!(top["MaxDrawdown"], -0.25);
        assert_eq!(top["RecoveryDays"], 30);
        assert!(top["Sharpe"].is_null());
        assert!(top["Beta"].is_null());
        assert!(top.get("record").is_none());
        assert!(top.get("score").is_none());
        assert!(json[1]["RecoveryDays"].is_null());
    }
}
