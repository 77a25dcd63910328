use crate::error::ConfigError;
use crate::profiles::ProfileRegistry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metrics: MetricsSettings,
    pub ranking: RankingSettings,
    pub data: DataSettings,
    pub logging: LoggingSettings,
    /// User-defined weight profiles, keyed by profile name. Each table maps a
    /// metric key (e.g. "CAGR") to a non-negative weight.
    pub profiles: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Parameters for the per-ticker metrics engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// The ticker whose returns are used as the market for Beta.
    pub benchmark: String,
    /// Annual risk-free rate as a decimal. 0.06 corresponds to 6%.
    pub risk_free_rate: f64,
    /// Length of the trailing analysis window, relative to the latest date in the table.
    pub lookback_years: u32,
    /// Fraction of the window's trading dates a ticker must have to be eligible.
    pub min_coverage: f64,
    /// Daily returns are clipped to `[-return_clip, return_clip]` before dispersion statistics.
    pub return_clip: f64,
    /// Minimum number of date-aligned returns required to estimate Beta.
    pub min_beta_overlap: usize,
    pub trading_days_per_year: u32,
}

/// Parameters for scoring, ranking and sensitivity analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// The weight profile used when none is given on the command line.
    pub profile: String,
    /// Number of rows to display. `None` shows the full ranking.
    pub top: Option<usize>,
    /// Keep the benchmark ticker in the ranking universe.
    pub include_benchmark: bool,
    pub sensitivity_baseline: String,
    pub sensitivity_top_k: usize,
}

/// Parameters for cleaning raw price files before analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Columns with fewer raw (pre-fill) observations than this fraction of rows are dropped.
    pub min_column_coverage: f64,
    pub date_format: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            benchmark: "^NSEI".to_string(),
            risk_free_rate: 0.06,
            lookback_years: 10,
            min_coverage: 0.9,
            return_clip: 0.5,
            min_beta_overlap: 30,
            trading_days_per_year: 252,
        }
    }
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            profile: "balanced".to_string(),
            top: Some(10),
            include_benchmark: false,
            sensitivity_baseline: "balanced".to_string(),
            sensitivity_top_k: 5,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            min_column_coverage: 0.8,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Checks value ranges and that every user-defined profile is well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()?;

        let r = &self.ranking;
        if r.sensitivity_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.sensitivity_top_k must be at least 1".to_string(),
            ));
        }
        if r.top == Some(0) {
            return Err(ConfigError::ValidationError(
                "ranking.top must be at least 1 when set".to_string(),
            ));
        }

        let c = self.data.min_column_coverage;
        if !(0.0..=1.0).contains(&c) {
            return Err(ConfigError::ValidationError(format!(
                "data.min_column_coverage must lie in [0, 1], got {c}"
            )));
        }

        let registry = ProfileRegistry::from_config(self)?;
        registry.get(&r.profile)?;
        registry.get(&r.sensitivity_baseline)?;
        Ok(())
    }
}

impl MetricsSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_coverage > 0.0 && self.min_coverage <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "metrics.min_coverage must lie in (0, 1], got {}",
                self.min_coverage
            )));
        }
        if !(self.return_clip.is_finite() && self.return_clip > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "metrics.return_clip must be positive, got {}",
                self.return_clip
            )));
        }
        if self.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "metrics.trading_days_per_year must be positive".to_string(),
            ));
        }
        if self.lookback_years == 0 {
            return Err(ConfigError::ValidationError(
                "metrics.lookback_years must be positive".to_string(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "metrics.risk_free_rate must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}
