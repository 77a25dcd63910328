//! Drawdown and recovery analysis of a single price path.

use core_types::{PriceSeries, RecoveryDays};

/// Path-dependent loss statistics of one price series.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownAnalysis {
    /// Cumulative maximum of the price up to and including each point.
    pub running_peak: Vec<f64>,
    /// `price / running_peak - 1` at each point; always in `[-1, 0]`.
    pub drawdown: Vec<f64>,
    /// Minimum of the drawdown curve.
    pub max_drawdown: f64,
    /// Index of the deepest trough, or `None` when the series never declines.
    pub trough: Option<usize>,
    pub recovery_days: RecoveryDays,
}

/// Computes the drawdown curve, the maximum drawdown and the recovery time
/// from the deepest trough. Returns `None` for an empty series.
///
/// When the minimum is hit more than once the latest occurrence is the
/// trough. Recovery is the first later date whose price reaches the running
/// peak recorded at the trough, measured in calendar days.
pub fn analyze(series: &PriceSeries) -> Option<DrawdownAnalysis> {
    let points = series.points();
    if points.is_empty() {
        return None;
    }

    let mut running_peak = Vec::with_capacity(points.len());
    let mut drawdown = Vec::with_capacity(points.len());
    let mut peak = f64::MIN;
    for p in points {
        peak = peak.max(p.price);
        running_peak.push(peak);
        drawdown.push(p.price / peak - 1.0);
    }

    let mut max_drawdown = 0.0;
    let mut trough_idx = 0;
    for (i, dd) in drawdown.iter().enumerate() {
        // `<=` so that equal minima move the trough forward.
        if *dd <= max_drawdown {
            max_drawdown = *dd;
            trough_idx = i;
        }
    }

    if max_drawdown == 0.0 {
        return Some(DrawdownAnalysis {
            running_peak,
            drawdown,
            max_drawdown: 0.0,
            trough: None,
            recovery_days: RecoveryDays::Days(0),
        });
    }

    let target = running_peak[trough_idx];
    let trough_date = points[trough_idx].date;
    let recovery_days = points[trough_idx..]
        .iter()
        .find(|p| p.price >= target)
        .map_or(RecoveryDays::Unrecovered, |p| {
            RecoveryDays::Days((p.date - trough_date).num_days())
        });

    Some(DrawdownAnalysis {
        running_peak,
        drawdown,
        max_drawdown,
        trough: Some(trough_idx),
        recovery_days,
    })
}
