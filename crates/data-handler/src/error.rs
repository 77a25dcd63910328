use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error on row {row}: {source}")]
    DateParse {
        row: usize,
        #[source]
        source: chrono::ParseError,
    },

    #[error("The first column of the price file must be 'Date', found '{0}'")]
    MissingDateColumn(String),

    #[error("Invalid price series: {0}")]
    Series(#[from] core_types::CoreError),

    #[error("No usable price data after cleaning")]
    NoData,
}
