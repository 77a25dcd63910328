use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown metric key: {0}")]
    UnknownMetric(String),
}
