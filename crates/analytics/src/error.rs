use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("The price table is empty; there is nothing to analyze")]
    EmptyPriceTable,

    #[error("None of the {total} tickers had enough history in the analysis window")]
    NoEligibleTickers { total: usize },

    #[error("Invalid metrics settings: {0}")]
    InvalidSettings(String),
}
