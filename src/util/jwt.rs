use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT token claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role (admin, staff, client, student)
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Staff roles may review, quote, approve, reject and convert
    /// requests.
    pub fn is_staff(&self) -> bool {
        matches!(self.role.as_str(), "admin" | "staff")
    }
}

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
}

pub trait JwtTokenUtils {
    fn generate_access_token(&self, user_id: &str, email: &str, role: &str)
        -> Result<String, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    /// Token issuance lives in the external auth service; this is kept
    /// for local tooling and tests.
    fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        debug!("Generating access token for user: {} with role: {}", user_id, role);

        let now = Utc::now();
        let expiration = now + Duration::minutes(self.jwt_config.access_token_expiration);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_ref());

        encode(&header, &claims, &encoding_key).map_err(|err| {
            error!("Failed to encode JWT token: {}", err);
            JwtError::EncodingFailed(err.to_string())
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        debug!("Validating JWT token");

        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                let claims = token_data.claims;
                if claims.exp < Utc::now().timestamp() {
                    warn!("Token has expired for user: {}", claims.sub);
                    return Err(JwtError::TokenExpired);
                }
                debug!("Token validation successful for user: {}", claims.sub);
                Ok(claims)
            }
            Err(err) => {
                error!("Failed to decode JWT token: {}", err);
                Err(JwtError::DecodingFailed(err.to_string()))
            }
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        if !auth_header.starts_with("Bearer ") {
            error!("Invalid authorization header format");
            return Err(JwtError::InvalidToken);
        }

        let token = auth_header.trim_start_matches("Bearer ").trim();
        if token.is_empty() {
            error!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }

        Ok(token.to_string())
    }
}
