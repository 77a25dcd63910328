use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// An ordered daily price series for one ticker.
///
/// Dates are strictly increasing and every price is positive and finite.
/// The invariant is checked once at construction so downstream arithmetic
/// never has to re-validate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, CoreError> {
        for (i, p) in points.iter().enumerate() {
            if !p.price.is_finite() || p.price <= 0.0 {
                return Err(CoreError::InvalidInput(
                    "price".to_string(),
                    format!("{} on {} is not a positive finite number", p.price, p.date),
                ));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(CoreError::InvalidInput(
                    "date".to_string(),
                    format!("{} does not follow {}", p.date, points[i - 1].date),
                ));
            }
        }
        Ok(Self { points })
    }

    /// Builds a series from parallel `(date, price)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(pairs.into_iter().map(|(d, p)| PricePoint::new(d, p)).collect())
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The trailing part of the series on or after `start`.
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        let idx = self.points.partition_point(|p| p.date < start);
        PriceSeries {
            points: self.points[idx..].to_vec(),
        }
    }
}

/// Ticker-keyed collection of price series for one analysis run.
///
/// Backed by a `BTreeMap`, so iteration is always in ticker order no matter
/// how the table was assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceTable {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the series for `ticker`.
    pub fn insert(&mut self, ticker: impl Into<String>, series: PriceSeries) -> Option<PriceSeries> {
        self.series.insert(ticker.into(), series)
    }

    pub fn get(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series.get(ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The most recent date present in any series.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.series.values().filter_map(PriceSeries::last_date).max()
    }

    /// The distinct trading dates observed across all tickers in `[start, end]`.
    pub fn calendar_between(&self, start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
        self.series
            .values()
            .flat_map(|s| s.points().iter().map(|p| p.date))
            .filter(|d| *d >= start && *d <= end)
            .collect()
    }
}

impl FromIterator<(String, PriceSeries)> for PriceTable {
    fn from_iter<T: IntoIterator<Item = (String, PriceSeries)>>(iter: T) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = PriceSeries::from_pairs([(d(2024, 1, 2), 10.0), (d(2024, 1, 2), 11.0)]);
        assert!(err.is_err());
        let err = PriceSeries::from_pairs([(d(2024, 1, 3), 10.0), (d(2024, 1, 2), 11.0)]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_non_positive_and_non_finite_prices() {
        assert!(PriceSeries::from_pairs([(d(2024, 1, 2), 0.0)]).is_err());
        assert!(PriceSeries::from_pairs([(d(2024, 1, 2), -1.0)]).is_err());
        assert!(PriceSeries::from_pairs([(d(2024, 1, 2), f64::NAN)]).is_err());
    }

    #[test]
    fn since_keeps_trailing_window() {
        let s = PriceSeries::from_pairs([
            (d(2024, 1, 1), 1.0),
            (d(2024, 1, 2), 2.0),
            (d(2024, 1, 3), 3.0),
        ])
        .unwrap();
        let tail = s.since(d(2024, 1, 2));
        assert_eq!(tail.prices(), vec![2.0, 3.0]);
        assert!(s.since(d(2025, 1, 1)).is_empty());
    }

    #[test]
    fn table_iterates_in_ticker_order_and_builds_a_calendar() {
        let mut table = PriceTable::new();
        let a = PriceSeries::from_pairs([(d(2024, 1, 1), 1.0), (d(2024, 1, 3), 1.0)]).unwrap();
        let b = PriceSeries::from_pairs([(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]).unwrap();
        table.insert("ZED", a);
        table.insert("ABC", b);

        assert_eq!(table.tickers().collect::<Vec<_>>(), vec!["ABC", "ZED"]);
        assert_eq!(table.latest_date(), Some(d(2024, 1, 3)));
        assert_eq!(table.calendar_between(d(2024, 1, 2), d(2024, 1, 3)).len(), 2);
        assert_eq!(table.calendar_between(d(2024, 1, 1), d(2024, 1, 3)).len(), 3);
    }
}
