use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of per-ticker statistics produced by the metrics engine
/// and consumed by the ranking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "CAGR")]
    Cagr,
    Volatility,
    Sharpe,
    Sortino,
    Calmar,
    MaxDrawdown,
    Beta,
    RecoveryDays,
}

impl Metric {
    /// Every metric, in output column order.
    pub const ALL: [Metric; 8] = [
        Metric::Cagr,
        Metric::Volatility,
        Metric::Sharpe,
        Metric::Sortino,
        Metric::Calmar,
        Metric::MaxDrawdown,
        Metric::Beta,
        Metric::RecoveryDays,
    ];

    /// The external key used in weight profiles and result tables.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Cagr => "CAGR",
            Metric::Volatility => "Volatility",
            Metric::Sharpe => "Sharpe",
            Metric::Sortino => "Sortino",
            Metric::Calmar => "Calmar",
            Metric::MaxDrawdown => "MaxDrawdown",
            Metric::Beta => "Beta",
            Metric::RecoveryDays => "RecoveryDays",
        }
    }

    /// Returns true for metrics where a smaller raw magnitude is preferable.
    pub fn lower_is_better(&self) -> bool {
        matches!(
            self,
            Metric::Volatility | Metric::MaxDrawdown | Metric::RecoveryDays
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownMetric(trimmed.to_string()))
    }
}

/// Calendar days from the deepest trough back to the prior peak.
///
/// `Unrecovered` is an explicit sentinel: it is never coerced to zero or to a
/// large number. Serialized as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum RecoveryDays {
    Days(i64),
    Unrecovered,
}

impl RecoveryDays {
    pub fn as_days(&self) -> Option<i64> {
        match self {
            RecoveryDays::Days(d) => Some(*d),
            RecoveryDays::Unrecovered => None,
        }
    }
}

impl From<Option<i64>> for RecoveryDays {
    fn from(value: Option<i64>) -> Self {
        value.map_or(RecoveryDays::Unrecovered, RecoveryDays::Days)
    }
}

impl From<RecoveryDays> for Option<i64> {
    fn from(value: RecoveryDays) -> Self {
        value.as_days()
    }
}

impl fmt::Display for RecoveryDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryDays::Days(d) => write!(f, "{d}"),
            RecoveryDays::Unrecovered => f.write_str("NaN"),
        }
    }
}
