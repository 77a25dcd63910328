//! Loads wide-format daily price files into a cleaned `PriceTable`.
//!
//! The expected layout is one `Date` column followed by one column per
//! ticker. Empty cells are missing observations.

use crate::error::DataError;
use chrono::NaiveDate;
use configuration::DataSettings;
use core_types::{PriceSeries, PriceTable};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub mod error;

/// Reads and cleans the price file at `path`.
pub fn load_price_table(path: impl AsRef<Path>, settings: &DataSettings) -> Result<PriceTable, DataError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading price data.");
    let file = File::open(path)?;
    load_price_table_from_reader(file, settings)
}

/// Reads and cleans price data from any reader.
///
/// Cleaning mirrors what a market-data download needs before analysis:
/// 1. rows are sorted by date; a repeated date keeps its last row,
/// 2. columns with fewer raw observations than `min_column_coverage` of the
///    rows are dropped,
/// 3. the remaining gaps are forward-filled, then back-filled.
pub fn load_price_table_from_reader<R: Read>(reader: R, settings: &DataSettings) -> Result<PriceTable, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let first = headers.get(0).unwrap_or_default();
    if !first.eq_ignore_ascii_case("date") {
        return Err(DataError::MissingDateColumn(first.to_string()));
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    let mut rejected_cells = 0usize;
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let date = NaiveDate::parse_from_str(record.get(0).unwrap_or_default(), &settings.date_format)
            .map_err(|source| DataError::DateParse { row: i + 1, source })?;

        let values = (0..tickers.len())
            .map(|j| {
                let cell = record.get(j + 1).unwrap_or_default();
                if cell.is_empty() {
                    return None;
                }
                match cell.parse::<f64>() {
                    Ok(p) if p.is_finite() && p > 0.0 => Some(p),
                    _ => {
                        rejected_cells += 1;
                        None
                    }
                }
            })
            .collect();
        rows.push((date, values));
    }
    if rejected_cells > 0 {
        tracing::warn!(rejected_cells, "Treated unparseable or non-positive prices as missing.");
    }

    let rows = dedup_by_date(rows);
    if rows.is_empty() {
        return Err(DataError::NoData);
    }

    let min_observations = settings.min_column_coverage * rows.len() as f64;
    let mut table = PriceTable::new();
    for (j, ticker) in tickers.iter().enumerate() {
        let column: Vec<Option<f64>> = rows.iter().map(|(_, values)| values[j]).collect();
        let observed = column.iter().flatten().count();
        if observed == 0 || (observed as f64) < min_observations {
            tracing::debug!(ticker = %ticker, observed, rows = rows.len(), "Dropping sparse column.");
            continue;
        }

        let filled = fill_gaps(&column);
        let series = PriceSeries::from_pairs(rows.iter().map(|(d, _)| *d).zip(filled))?;
        table.insert(ticker.clone(), series);
    }

    if table.is_empty() {
        return Err(DataError::NoData);
    }
    tracing::info!(
        tickers = table.len(),
        dropped = tickers.len() - table.len(),
        rows = rows.len(),
        "Price data loaded."
    );
    Ok(table)
}

/// Sorts rows by date; when a date repeats, the row read last wins.
fn dedup_by_date(mut rows: Vec<(NaiveDate, Vec<Option<f64>>)>) -> Vec<(NaiveDate, Vec<Option<f64>>)> {
    rows.sort_by_key(|(d, _)| *d);
    let mut out: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::with_capacity(rows.len());
    for row in rows {
        match out.last_mut() {
            Some(last) if last.0 == row.0 => *last = row,
            _ => out.push(row),
        }
    }
    out
}

/// Forward-fills, then back-fills the leading gap. Needs at least one value.
fn fill_gaps(column: &[Option<f64>]) -> Vec<f64> {
    let first = column.iter().flatten().copied().next().unwrap_or(f64::NAN);
    let mut last = first;
    column
        .iter()
        .map(|v| {
            if let Some(v) = v {
                last = *v;
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_gaps_carries_forward_then_back() {
        let filled = fill_gaps(&[None, None, Some(2.0), None, Some(3.0), None]);
        assert_eq!(filled, vec![2.0, 2.0, 2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn duplicate_dates_keep_the_last_row() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let rows = vec![
            (d(3), vec![Some(3.0)]),
            (d(1), vec![Some(1.0)]),
            (d(3), vec![Some(33.0)]),
        ];
        let out = dedup_by_date(rows);
        assert_eq!(out, vec![(d(1), vec![Some(1.0)]), (d(3), vec![Some(33.0)])]);
    }
}
