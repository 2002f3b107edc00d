//! Payment gateway configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! sandbox defaults.

use std::env;
use std::time::Duration;

/// Payment gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST API.
    pub base_url: String,

    /// Server key used for HTTP basic auth against the gateway.
    pub server_key: String,

    /// Request timeout for gateway calls.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// | variable               | default                              |
    /// |------------------------|--------------------------------------|
    /// | `GATEWAY_BASE_URL`     | `https://api.sandbox.gateway.test`   |
    /// | `GATEWAY_SERVER_KEY`   | `sandbox-server-key`                 |
    /// | `GATEWAY_TIMEOUT_SECS` | `10`                                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = GatewayConfig {
            base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.sandbox.gateway.test".to_string()),

            // In production this MUST be set via environment variable
            server_key: env::var("GATEWAY_SERVER_KEY")
                .unwrap_or_else(|_| "sandbox-server-key".to_string()),

            request_timeout: Duration::from_secs(
                env::var("GATEWAY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("GATEWAY_TIMEOUT_SECS".to_string()))?,
            ),
        };

        if config.base_url.is_empty() {
            return Err(ConfigError::MissingRequired("GATEWAY_BASE_URL".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        // No env manipulation: defaults must produce a usable config.
        let config = GatewayConfig::from_env().unwrap();
        assert!(!config.base_url.is_empty());
        assert!(!config.server_key.is_empty());
    }
}
