use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod profiles;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use profiles::{CanonicalProfile, ProfileRegistry, WeightProfile};
pub use settings::{DataSettings, LoggingSettings, MetricsSettings, RankingSettings};

/// The file looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_NAME: &str = "screener";

/// Loads the application configuration.
///
/// Sources, lowest precedence first:
/// 1. built-in defaults,
/// 2. `path` (required when given) or an optional `screener.toml` in the working directory,
/// 3. environment variables such as `SCREENER__METRICS__RISK_FREE_RATE=0.05`.
///
/// The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("SCREENER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Metric;
    use std::io::Write;

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[metrics]
benchmark = "SPY"
risk_free_rate = 0.04

[ranking]
profile = "defensive"

[profiles.defensive]
MaxDrawdown = 0.6
Sortino = 0.4
Momentum = 1.0
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.metrics.benchmark, "SPY");
        assert_eq!(config.metrics.trading_days_per_year, 252);
        assert_eq!(config.ranking.sensitivity_top_k, 5);

        let registry = ProfileRegistry::from_config(&config).unwrap();
        let defensive = registry.get("defensive").unwrap();
        assert_eq!(defensive.weight(Metric::MaxDrawdown), 0.6);
        assert_eq!(defensive.weight(Metric::Cagr), 0.0);
    }

    #[test]
    fn environment_variables_override_defaults() {
        // The only test touching this variable; other tests avoid asserting on it.
        unsafe { std::env::set_var("SCREENER__METRICS__RISK_FREE_RATE", "0.045") };
        let config = load_config(None);
        unsafe { std::env::remove_var("SCREENER__METRICS__RISK_FREE_RATE") };

        let config = config.unwrap();
        assert_eq!(config.metrics.risk_free_rate, 0.045);
        assert_eq!(config.metrics.benchmark, "^NSEI");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here/screener.toml")));
        assert!(matches!(err, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[metrics]\nreturn_clip = -0.5").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
