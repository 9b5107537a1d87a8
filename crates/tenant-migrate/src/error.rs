//! Error types for tenant migration orchestration.

use thiserror::Error;

/// Main error type for orchestration operations.
#[derive(Error, Debug)]
pub enum TenancyError {
    /// Configuration error (invalid YAML, missing fields, malformed template, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tenant lookup by key found nothing in the persistence layer
    #[error("Tenant not found: {0}")]
    NotFound(String),

    /// Configured tenant model does not match the repository's entity type
    #[error("Invalid tenant model {model}: {reason}")]
    InvalidModel { model: String, reason: String },

    /// A template referenced an attribute path absent from the tenant's attributes
    #[error("Template {template:?} references missing attribute path {path:?}")]
    MissingTemplatePath { template: String, path: String },

    /// The external connection-definition resolver failed or returned garbage
    #[error("Connection synthesis failed for {connection}: {message}")]
    ConfigSynthesis { connection: String, message: String },

    /// Config-store read or write failed
    #[error("Config store error: {0}")]
    Store(String),

    /// Persistence-layer error while fetching tenants
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TenancyError {
    /// Create an InvalidModel error.
    pub fn invalid_model(model: impl Into<String>, reason: impl Into<String>) -> Self {
        TenancyError::InvalidModel {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingTemplatePath error.
    pub fn missing_path(template: impl Into<String>, path: impl Into<String>) -> Self {
        TenancyError::MissingTemplatePath {
            template: template.into(),
            path: path.into(),
        }
    }

    /// Create a ConfigSynthesis error.
    pub fn synthesis(connection: impl Into<String>, message: impl Into<String>) -> Self {
        TenancyError::ConfigSynthesis {
            connection: connection.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for orchestration operations.
pub type Result<T> = std::result::Result<T, TenancyError>;
