//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{ClientError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, nested with `__`)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    let app: AppConfig = config
        .try_deserialize()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    validate(&app)?;
    Ok(app)
}

fn validate(app: &AppConfig) -> Result<()> {
    let fraction = app.risk.assumed_entry_fraction;
    if fraction <= rust_decimal::Decimal::ZERO || fraction >= rust_decimal::Decimal::ONE {
        return Err(ClientError::Configuration(format!(
            "risk.assumed_entry_fraction must be between 0 and 1, got {}",
            fraction
        )));
    }
    if app.feed.max_concurrent_fetches == 0 {
        return Err(ClientError::Configuration(
            "feed.max_concurrent_fetches must be at least 1".to_string(),
        ));
    }
    Ok(())
}
