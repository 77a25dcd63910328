//! Return series derivation.
//!
//! A return series has one element per consecutive pair of prices and is
//! dated by the later observation of the pair.

use chrono::NaiveDate;
use core_types::PriceSeries;

/// A daily return tagged with the date it was realised on.
pub type DatedReturn = (NaiveDate, f64);

/// Day-over-day percentage change, `p[t] / p[t-1] - 1`.
///
/// Returns an empty vector for fewer than two prices; callers treat that as an
/// ineligible ticker.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Percentage change series keyed by date.
pub fn dated_returns(series: &PriceSeries) -> Vec<DatedReturn> {
    series
        .dates()
        .into_iter()
        .skip(1)
        .zip(pct_change(&series.prices()))
        .collect()
}

/// Clamps every return into `[-band, band]`.
pub fn clip_returns(returns: &[f64], band: f64) -> Vec<f64> {
    returns.iter().map(|r| r.clamp(-band, band)).collect()
}

/// Inner join of two dated return series on date.
///
/// Both inputs must be sorted by date, which holds for anything derived from a
/// `PriceSeries`. Output pairs are `(left, right)` in date order.
pub fn align(left: &[DatedReturn], right: &[DatedReturn]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].0.cmp(&right[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((left[i].1, right[j].1));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Annualised compound growth rate of a return series.
///
/// Uses the compounded product of `1 + r` over `periods_per_year`-day years,
/// so the growth rate covers exactly the observations every other statistic
/// is computed on. Undefined for an empty series or a non-positive total.
pub fn compound_annual_growth(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    if returns.is_empty() || periods_per_year <= 0.0 {
        return None;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    if !(growth.is_finite() && growth > 0.0) {
        return None;
    }
    let years = returns.len() as f64 / periods_per_year;
    Some(growth.powf(1.0 / years) - 1.0).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn pct_change_is_one_shorter() {
        let r = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
        assert!(pct_change(&[100.0]).is_empty());
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn dated_returns_use_the_later_date() {
        let s = PriceSeries::from_pairs([(d(1), 10.0), (d(4), 12.0)]).unwrap();
        let r = dated_returns(&s);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].0, d(4));
        assert!((r[0].1 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn clip_bounds_glitches() {
        assert_eq!(clip_returns(&[2.0, -0.9, 0.01], 0.5), vec![0.5, -0.5, 0.01]);
    }

    #[test]
    fn align_keeps_only_shared_dates() {
        let a = [(d(1), 1.0), (d(2), 2.0), (d(4), 4.0)];
        let b = [(d(2), 20.0), (d(3), 30.0), (d(4), 40.0), (d(5), 50.0)];
        assert_eq!(align(&a, &b), vec![(2.0, 20.0), (4.0, 40.0)]);
        assert!(align(&a, &[]).is_empty());
    }

    #[test]
    fn compound_growth_annualises_over_trading_years() {
        // Two trading years of 252 days each, doubling overall.
        let daily = 2f64.powf(1.0 / 504.0) - 1.0;
        let r = vec![daily; 504];
        let cagr = compound_annual_growth(&r, 252.0).unwrap();
        assert!((cagr - (2f64.sqrt() - 1.0)).abs() < 1e-9);
        assert_eq!(compound_annual_growth(&[], 252.0), None);
        assert_eq!(compound_annual_growth(&[-1.0], 252.0), None);
    }
}
