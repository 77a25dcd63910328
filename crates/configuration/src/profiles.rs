use crate::error::ConfigError;
use crate::settings::Config;
use core_types::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const EQUAL_WEIGHTS: [(Metric, f64); 8] = [
    (Metric::Cagr, 0.125),
    (Metric::Sharpe, 0.125),
    (Metric::Sortino, 0.125),
    (Metric::Calmar, 0.125),
    (Metric::Volatility, 0.125),
    (Metric::MaxDrawdown, 0.125),
    (Metric::Beta, 0.125),
    (Metric::RecoveryDays, 0.125),
];

const BALANCED_WEIGHTS: [(Metric, f64); 8] = [
    (Metric::Cagr, 0.20),
    (Metric::Sharpe, 0.15),
    (Metric::Sortino, 0.15),
    (Metric::Calmar, 0.15),
    (Metric::Volatility, 0.10),
    (Metric::MaxDrawdown, 0.10),
    (Metric::Beta, 0.10),
    (Metric::RecoveryDays, 0.05),
];

const RISK_PRIORITY_WEIGHTS: [(Metric, f64); 8] = [
    (Metric::MaxDrawdown, 0.25),
    (Metric::Sortino, 0.20),
    (Metric::RecoveryDays, 0.15),
    (Metric::Volatility, 0.15),
    (Metric::Calmar, 0.10),
    (Metric::Sharpe, 0.05),
    (Metric::Cagr, 0.05),
    (Metric::Beta, 0.05),
];

/// The built-in weight profiles, one per risk appetite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalProfile {
    EqualWeight,
    /// Growth-leaning default.
    Balanced,
    /// Emphasises downside protection: drawdown depth, downside deviation and recovery time.
    RiskPriority,
}

impl CanonicalProfile {
    pub const ALL: [CanonicalProfile; 3] = [
        CanonicalProfile::EqualWeight,
        CanonicalProfile::Balanced,
        CanonicalProfile::RiskPriority,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalProfile::EqualWeight => "equal-weight",
            CanonicalProfile::Balanced => "balanced",
            CanonicalProfile::RiskPriority => "risk-priority",
        }
    }

    pub fn profile(&self) -> WeightProfile {
        let table: &[(Metric, f64)] = match self {
            CanonicalProfile::EqualWeight => &EQUAL_WEIGHTS,
            CanonicalProfile::Balanced => &BALANCED_WEIGHTS,
            CanonicalProfile::RiskPriority => &RISK_PRIORITY_WEIGHTS,
        };
        WeightProfile {
            name: self.name().to_string(),
            weights: table.iter().copied().collect(),
        }
    }
}

impl fmt::Display for CanonicalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, immutable assignment of non-negative weights to metrics.
///
/// Metrics without an entry weigh 0. Weights are not required to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightProfile {
    name: String,
    weights: BTreeMap<Metric, f64>,
}

impl WeightProfile {
    pub fn new<I>(name: impl Into<String>, weights: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Metric, f64)>,
    {
        let name = name.into();
        let mut map = BTreeMap::new();
        for (metric, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{name}': weight for {metric} must be a non-negative number, got {weight}"
                )));
            }
            map.insert(metric, weight);
        }
        Ok(Self { name, weights: map })
    }

    /// Builds a profile from external string keys. Unrecognized keys are
    /// ignored with a warning.
    pub fn from_keys<I, K>(name: impl Into<String>, entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let name = name.into();
        let mut recognized = Vec::new();
        for (key, weight) in entries {
            match key.as_ref().parse::<Metric>() {
                Ok(metric) => recognized.push((metric, weight)),
                Err(_) => tracing::warn!(
                    profile = %name,
                    key = key.as_ref(),
                    "Ignoring unrecognized metric key in weight profile."
                ),
            }
        }
        Self::new(name, recognized)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self, metric: Metric) -> f64 {
        self.weights.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.weights.iter().map(|(m, w)| (*m, *w))
    }

    /// Sum of all weights; divide a score by this to express it as a fraction
    /// of the attainable maximum.
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// The set of weight profiles available to a run, looked up by name.
///
/// Always contains the canonical profiles; user-defined profiles from the
/// configuration file are appended, or replace a canonical profile of the
/// same name.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<WeightProfile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::canonical()
    }
}

impl ProfileRegistry {
    pub fn canonical() -> Self {
        Self {
            profiles: CanonicalProfile::ALL.iter().map(|p| p.profile()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::canonical();
        for (name, weights) in &config.profiles {
            let profile = WeightProfile::from_keys(name.clone(), weights.iter().map(|(k, w)| (k, *w)))?;
            registry.register(profile);
        }
        Ok(registry)
    }

    /// Adds a profile, replacing any existing profile with the same name.
    pub fn register(&mut self, profile: WeightProfile) {
        match self
            .profiles
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&profile.name))
        {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    /// Looks up a profile by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Result<&WeightProfile, ConfigError> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightProfile> {
        self.profiles.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
