use configuration::DataSettings;
use data_handler::error::DataError;
use data_handler::{load_price_table, load_price_table_from_reader};
use std::io::Write;

const PRICES: &str = "\
Date,AAA,BBB,SPARSE
2024-01-02,100.0,50.0,
2024-01-03,,51.0,
2024-01-04,102.0,,9.0
2024-01-05,103.0,52.0,
2024-01-08,104.0,53.0,
";

#[test]
fn loads_and_cleans_a_wide_price_file() {
    let table = load_price_table_from_reader(PRICES.as_bytes(), &DataSettings::default()).unwrap();

    assert_eq!(table.tickers().collect::<Vec<_>>(), vec!["AAA", "BBB"]);
    assert_eq!(table.get("AAA").unwrap().prices(), vec![100.0, 100.0, 102.0, 103.0, 104.0]);
    assert_eq!(table.get("BBB").unwrap().prices(), vec![50.0, 51.0, 51.0, 52.0, 53.0]);
    assert_eq!(table.get("AAA").unwrap().len(), 5);
}

#[test]
fn leading_gaps_are_back_filled() {
    let csv = "Date,LATE\n2024-01-02,\n2024-01-03,10\n2024-01-04,11\n2024-01-05,12\n2024-01-08,13\n";
    let table = load_price_table_from_reader(csv.as_bytes(), &DataSettings::default()).unwrap();
    assert_eq!(table.get("LATE").unwrap().prices(), vec![10.0, 10.0, 11.0, 12.0, 13.0]);
}

#[test]
fn unsorted_rows_and_bad_cells_are_tolerated() {
    let csv = "Date,X\n2024-01-04,12\n2024-01-02,10\n2024-01-03,-5\n2024-01-05,abc\n2024-01-08,13\n";
    let mut settings = DataSettings::default();
    settings.min_column_coverage = 0.5;
    let table = load_price_table_from_reader(csv.as_bytes(), &settings).unwrap();
    assert_eq!(table.get("X").unwrap().prices(), vec![10.0, 10.0, 12.0, 12.0, 13.0]);
}

#[test]
fn the_first_column_must_be_dates() {
    let err = load_price_table_from_reader("Ticker,A\nx,1\n".as_bytes(), &DataSettings::default()).unwrap_err();
    assert!(matches!(err, DataError::MissingDateColumn(c) if c == "Ticker"));
}

#[test]
fn malformed_dates_report_the_row() {
    let err = load_price_table_from_reader("Date,A\n2024-01-02,1\n02/01/2024,2\n".as_bytes(), &DataSettings::default())
        .unwrap_err();
    assert!(matches!(err, DataError::DateParse { row: 2, .. }));
}

#[test]
fn a_file_with_no_usable_columns_is_an_error() {
    let err = load_price_table_from_reader("Date,A\n2024-01-02,\n".as_bytes(), &DataSettings::default()).unwrap_err();
    assert!(matches!(err, DataError::NoData));
}

#[test]
fn loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PRICES.as_bytes()).unwrap();
    let table = load_price_table(file.path(), &DataSettings::default()).unwrap();
    assert_eq!(table.len(), 2);
}
