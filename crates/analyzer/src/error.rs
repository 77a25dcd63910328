use configuration::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("The metric table is empty; there is nothing to rank")]
    EmptyUniverse,

    #[error("Sensitivity analysis needs a top-K of at least 1")]
    InvalidTopK,
}
