use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalyticsSettings, BatchSettings, Config, LoggingSettings, MarketDataSettings,
    default_sectors,
};

/// Prefix for environment overrides, e.g. `FINSCOPE__BATCH__MAX_CONCURRENCY=4`.
pub const ENV_PREFIX: &str = "FINSCOPE";

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional; environment variables override file values.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the application configuration from an explicit file path.
///
/// This function reads the configuration file (if it exists), layers the
/// environment on top, deserializes it into our strongly-typed `Config` struct
/// and validates it.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config = builder.try_deserialize::<Config>()?;
    if config.sectors.is_empty() {
        config.sectors = default_sectors();
    }

    validate(&config)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");

    Ok(config)
}

/// Rejects settings the scanner and engine cannot work with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.batch.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "batch.max_concurrency must be at least 1".to_string(),
        ));
    }
    if config.batch.per_symbol_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "batch.per_symbol_timeout_secs must be positive".to_string(),
        ));
    }
    if config.market_data.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "market_data.request_timeout_secs must be positive".to_string(),
        ));
    }
    if config.analytics.rsi_period < 2 {
        return Err(ConfigError::ValidationError(
            "analytics.rsi_period must be at least 2".to_string(),
        ));
    }
    if !config.analytics.risk_free_rate.is_finite() {
        return Err(ConfigError::ValidationError(
            "analytics.risk_free_rate must be a finite number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Exchange, Period};
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.batch.max_concurrency, 8);
        assert_eq!(config.analytics.rsi_period, 14);
        assert_eq!(config.market_data.default_exchange, Exchange::Nse);
        assert!(config.sectors.contains_key("IT"));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[market_data]
default_exchange = "US"
default_period = "1y"

[batch]
max_concurrency = 2

[sectors]
Tech = ["AAPL", "MSFT"]
"#
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();

        assert_eq!(config.market_data.default_exchange, Exchange::Us);
        assert_eq!(config.market_data.default_period, Period::OneYear);
        assert_eq!(config.batch.max_concurrency, 2);
        assert_eq!(config.batch.per_symbol_timeout_secs, 20);
        assert_eq!(config.sectors.len(), 1);
        assert_eq!(config.sectors["Tech"], vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[batch]\nmax_concurrency = 0").unwrap();

        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn short_rsi_period_is_rejected() {
        let mut config = Config::default();
        config.analytics.rsi_period = 1;
        assert!(validate(&config).is_err());
    }
}
