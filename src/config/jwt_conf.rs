use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure. Tokens are issued by the external auth
/// service; this backend only needs the shared secret to validate them.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for verifying token signatures
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// JWT issuer (optional)
    pub jwt_issuer: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Shared secret for verifying JWT tokens (required)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 15)
    /// - JWT_ISSUER: JWT issuer (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;

        if jwt_secret.len() < 32 {
            error!("JWT_SECRET is too short (minimum 32 characters required)");
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| {
                warn!("JWT_ACCESS_TOKEN_EXPIRY not set, using default: 15 minutes");
                "15".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_ACCESS_TOKEN_EXPIRY value: {}", e);
                ConfigError::InvalidValue(format!("JWT_ACCESS_TOKEN_EXPIRY: {}", e))
            })?;

        if access_token_expiration <= 0 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_TOKEN_EXPIRY must be greater than 0".to_string(),
            ));
        }

        let jwt_issuer = env::var("JWT_ISSUER").ok();

        let config = JwtConfig {
            jwt_secret,
            access_token_expiration,
            jwt_issuer,
        };

        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT secret cannot be empty".to_string(),
            ));
        }

        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::ValidationError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::ValidationError(
                "Access token expiration must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Test configuration with a fixed secret, long enough to pass
/// validation.
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security"
                .to_string(),
            access_token_expiration: 15,
            jwt_issuer: Some("projecthub-backend-test".to_string()),
        }
    }
}
