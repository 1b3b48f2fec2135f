//! Error types for configuration and provider construction.

/// Errors raised while reading configuration or building a provider.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("Missing configuration: {field}")]
    Missing {
        /// Name of the missing setting
        field: String,
    },

    /// A setting is present but cannot be parsed.
    #[error("Invalid value for {field}: {details}")]
    InvalidValue {
        /// Name of the setting
        field: String,
        /// Why the value was rejected
        details: String,
    },

    /// The RPC URL could not be parsed.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),
}

impl ConfigError {
    /// Create a `Missing` error for a setting.
    pub fn missing(field: impl Into<String>) -> Self {
        ConfigError::Missing {
            field: field.into(),
        }
    }

    /// Create an `InvalidValue` error for a setting.
    pub fn invalid_value(field: impl Into<String>, details: impl std::fmt::Display) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            details: details.to_string(),
        }
    }
}
