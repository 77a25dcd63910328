//! Ranking stability across weight profiles.
//!
//! The same metric table is ranked under every registered profile and each
//! profile's top-K is compared with the top-K of a baseline profile. A ranking
//! whose leaders survive a change of weights depends less on the subjective
//! choice of those weights.

use crate::error::AnalyzerError;
use crate::Analyzer;
use analytics::MetricTable;
use configuration::{ProfileRegistry, WeightProfile};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// How one profile's leaders compare with the baseline's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileOverlap {
    pub overlap_count: usize,
    /// `overlap_count / K * 100`.
    pub overlap_pct: f64,
    pub top_tickers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub baseline: String,
    /// The K actually used: the requested K capped at the universe size.
    pub top_k: usize,
    pub baseline_top: Vec<String>,
    pub profiles: BTreeMap<String, ProfileOverlap>,
}

impl SensitivityReport {
    /// Mean overlap percentage across the compared profiles; 100 when there
    /// is nothing to compare against.
    pub fn stability(&self) -> f64 {
        if self.profiles.is_empty() {
            return 100.0;
        }
        self.profiles.values().map(|p| p.overlap_pct).sum::<f64>() / self.profiles.len() as f64
    }
}

pub struct SensitivityAnalyzer<'a> {
    registry: &'a ProfileRegistry,
    baseline: &'a WeightProfile,
    top_k: usize,
}

impl<'a> SensitivityAnalyzer<'a> {
    pub fn new(registry: &'a ProfileRegistry, baseline: &str, top_k: usize) -> Result<Self, AnalyzerError> {
        if top_k == 0 {
            return Err(AnalyzerError::InvalidTopK);
        }
        Ok(Self {
            registry,
            baseline: registry.get(baseline)?,
            top_k,
        })
    }

    pub fn run(&self, metrics: &MetricTable) -> Result<SensitivityReport, AnalyzerError> {
        let k = self.top_k.min(metrics.len());
        let baseline_top = top_tickers(self.baseline, metrics, k)?;
        let baseline_set: HashSet<&str> = baseline_top.iter().map(String::as_str).collect();

        let mut profiles = BTreeMap::new();
        for profile in self.registry.iter() {
            if profile.name().eq_ignore_ascii_case(self.baseline.name()) {
                continue;
            }
            let top = top_tickers(profile, metrics, k)?;
            let overlap_count = top.iter().filter(|t| baseline_set.contains(t.as_str())).count();
            let overlap_pct = if k == 0 {
                0.0
            } else {
                overlap_count as f64 / k as f64 * 100.0
            };
            tracing::debug!(profile = profile.name(), overlap_count, overlap_pct, "Profile compared.");
            profiles.insert(
                profile.name().to_string(),
                ProfileOverlap {
                    overlap_count,
                    overlap_pct,
                    top_tickers: top,
                },
            );
        }

        let report = SensitivityReport {
            baseline: self.baseline.name().to_string(),
            top_k: k,
            baseline_top,
            profiles,
        };
        tracing::info!(
            baseline = %report.baseline,
            top_k = k,
            stability = report.stability(),
            "Sensitivity analysis complete."
        );
        Ok(report)
    }
}

fn top_tickers(profile: &WeightProfile, metrics: &MetricTable, k: usize) -> Result<Vec<String>, AnalyzerError> {
    Ok(Analyzer::new(profile.clone())
        .rank(metrics)?
        .into_iter()
        .take(k)
        .map(|r| r.ticker)
        .collect())
}
