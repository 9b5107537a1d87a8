//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{Result, TenancyError};
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Look up the configuration for a driver, failing if it is unknown.
    pub fn driver(&self, name: &str) -> Result<&DriverConfig> {
        self.drivers
            .get(name)
            .ok_or_else(|| TenancyError::Config(format!("unknown driver: {}", name)))
    }
}
