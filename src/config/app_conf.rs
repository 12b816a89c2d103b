use std::env;
use std::net::IpAddr;
use tracing::{error, info, warn};

use crate::config::ConfigError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address, must parse as an IP address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl AppConfig {
    /// Load the listener configuration from environment variables
    ///
    /// Expected environment variables:
    /// - APP_HOST: bind address (defaults to 127.0.0.1)
    /// - APP_PORT: listen port (defaults to 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");

        let host = env::var("APP_HOST").unwrap_or_else(|_| {
            warn!("APP_HOST not set, using default: 127.0.0.1");
            "127.0.0.1".to_string()
        });

        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| {
                warn!("APP_PORT not set, using default: 8080");
                "8080".to_string()
            })
            .parse::<u16>()
            .map_err(|_| {
                error!("Invalid APP_PORT value");
                ConfigError::InvalidValue("Invalid APP_PORT value".to_string())
            })?;

        let config = AppConfig { host, port };
        config.validate()?;
        info!("Application configuration loaded successfully");
        Ok(config)
    }

    /// Validate the listener configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.parse::<IpAddr>().is_err() {
            error!("APP_HOST is not a valid IP address: {}", self.host);
            return Err(ConfigError::ValidationError(format!(
                "APP_HOST must be a valid IP address, got '{}'",
                self.host
            )));
        }

        if self.port == 0 {
            error!("APP_PORT is 0");
            return Err(ConfigError::ValidationError(
                "APP_PORT must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
