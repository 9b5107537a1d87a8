//! Configuration validation.

use super::Config;
use crate::error::{Result, TenancyError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.chunk_size == 0 {
        return Err(TenancyError::Config(
            "chunk_size must be at least 1".into(),
        ));
    }

    for (driver, cfg) in &config.drivers {
        if driver.is_empty() {
            return Err(TenancyError::Config(
                "driver name must not be empty".into(),
            ));
        }

        if let Some(database) = &cfg.database {
            if database.is_empty() {
                return Err(TenancyError::Config(format!(
                    "drivers.{}.database must not be empty when set",
                    driver
                )));
            }
        }

        if let Some(connection) = &cfg.connection {
            if connection.name.is_empty() {
                return Err(TenancyError::Config(format!(
                    "drivers.{}.connection.name is required",
                    driver
                )));
            }
        }

        if let Some(migration) = &cfg.migration {
            if migration.is_empty() {
                return Err(TenancyError::Config(format!(
                    "drivers.{}.migration must not be empty when set",
                    driver
                )));
            }
        }

        if let Some(prefix) = &cfg.prefix {
            if prefix.is_empty() {
                return Err(TenancyError::Config(format!(
                    "drivers.{}.prefix must not be empty when set",
                    driver
                )));
            }
        }

        if let Some(model) = &cfg.model {
            if model.is_empty() {
                return Err(TenancyError::Config(format!(
                    "drivers.{}.model must not be empty when set",
                    driver
                )));
            }
        }
    }

    Ok(())
}
