use chrono::NaiveDate;
use core_types::{Metric, RecoveryDays};
use serde::{Deserialize, Serialize};

/// The standardized set of risk/return statistics for one ticker.
///
/// Every ratio is an `Option`: `None` means the statistic is mathematically
/// undefined for this ticker (zero dispersion, no downside days, no benchmark
/// overlap), never a fabricated number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    #[serde(rename = "CAGR")]
    pub cagr: Option<f64>,
    pub volatility: Option<f64>,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub calmar: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub beta: Option<f64>,
    pub recovery_days: RecoveryDays,

    // Provenance of the window the statistics were computed over.
    pub observations: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MetricRecord {
    /// Uniform column view of the record. An unrecovered drawdown reads as `None`.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cagr => self.cagr,
            Metric::Volatility => self.volatility,
            Metric::Sharpe => self.sharpe,
            Metric::Sortino => self.sortino,
            Metric::Calmar => self.calmar,
            Metric::MaxDrawdown => self.max_drawdown,
            Metric::Beta => self.beta,
            Metric::RecoveryDays => self.recovery_days.as_days().map(|d| d as f64),
        }
    }
}

/// One row of a [`MetricTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(flatten)]
    pub record: MetricRecord,
}

/// Per-ticker metric records in a fixed order.
///
/// The order is the order rows were added; the ranking engine breaks score
/// ties by it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricTable {
    rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row, or replaces the record in place if the ticker is already present.
    pub fn insert(&mut self, ticker: impl Into<String>, record: MetricRecord) {
        let ticker = ticker.into();
        match self.rows.iter_mut().find(|r| r.ticker == ticker) {
            Some(row) => row.record = record,
            None => self.rows.push(MetricRow { ticker, record }),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&MetricRecord> {
        self.rows.iter().find(|r| r.ticker == ticker).map(|r| &r.record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricRecord)> {
        self.rows.iter().map(|r| (r.ticker.as_str(), &r.record))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.ticker.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A copy of the table without `ticker`, keeping the order of the others.
    pub fn without(&self, ticker: &str) -> MetricTable {
        MetricTable {
            rows: self.rows.iter().filter(|r| r.ticker != ticker).cloned().collect(),
        }
    }
}

impl FromIterator<(String, MetricRecord)> for MetricTable {
    fn from_iter<T: IntoIterator<Item = (String, MetricRecord)>>(iter: T) -> Self {
        let mut table = MetricTable::new();
        for (ticker, record) in iter {
            table.insert(ticker, record);
        }
        table
    }
}
