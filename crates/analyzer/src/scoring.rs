//! Cross-sectional normalisation and weighted scoring.

use analytics::{MetricRecord, MetricTable};
use configuration::WeightProfile;
use core_types::{Metric, RecoveryDays};
use std::collections::BTreeMap;

/// Added to magnitudes before inversion so a zero maps to a large finite value.
pub const INVERSION_EPSILON: f64 = 1e-6;

/// A metric table row with its per-metric normalised components and score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub ticker: String,
    pub normalized: BTreeMap<Metric, f64>,
    pub score: f64,
}

/// Maps a raw metric onto a "higher is better" scale.
///
/// Volatility and drawdown magnitude are inverted as `1 / (|v| + ε)`.
/// Recovery time becomes `1 / (1 + days)`; an unrecovered drawdown is `0`,
/// the worst value that scale can take.
pub fn oriented_value(record: &MetricRecord, metric: Metric) -> Option<f64> {
    match metric {
        Metric::Volatility | Metric::MaxDrawdown => record
            .value(metric)
            .map(|v| 1.0 / (v.abs() + INVERSION_EPSILON)),
        Metric::RecoveryDays => Some(match record.recovery_days {
            RecoveryDays::Days(d) => 1.0 / (1.0 + d.max(0) as f64),
            RecoveryDays::Unrecovered => 0.0,
        }),
        _ => record.value(metric),
    }
}

/// Min-max scales a column to `[0, 1]`.
///
/// Undefined entries become `0` (worst) after scaling. A column whose defined
/// values are all equal, or that has none, maps to all zeros.
pub fn normalize_column(values: &[Option<f64>]) -> Vec<f64> {
    let defined = values.iter().flatten().copied().filter(|v| v.is_finite());
    let (min, max) = defined.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !(min.is_finite() && max.is_finite()) || max == min {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|v| match v {
            Some(v) if v.is_finite() => (v - min) / (max - min),
            _ => 0.0,
        })
        .collect()
}

/// Normalises every metric across the table and applies `profile`.
///
/// The score is the plain weighted sum of normalised components; it is not
/// divided by the profile's total weight. Rows keep the table's order.
pub fn score_table(metrics: &MetricTable, profile: &WeightProfile) -> Vec<ScoredRow> {
    let columns: Vec<(Metric, Vec<f64>)> = Metric::ALL
        .into_iter()
        .map(|metric| {
            let raw: Vec<Option<f64>> = metrics
                .iter()
                .map(|(_, record)| oriented_value(record, metric))
                .collect();
            (metric, normalize_column(&raw))
        })
        .collect();

    metrics
        .tickers()
        .enumerate()
        .map(|(row, ticker)| {
            let normalized: BTreeMap<Metric, f64> =
                columns.iter().map(|(m, col)| (*m, col[row])).collect();
            let score = normalized
                .iter()
                .map(|(m, v)| v * profile.weight(*m))
                .sum();
            ScoredRow {
                ticker: ticker.to_string(),
                normalized,
                score,
            }
        })
        .collect()
}
