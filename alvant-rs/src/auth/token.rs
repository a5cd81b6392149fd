//! Signed admin session tokens (HS256 JWT)
//!
//! Tokens are not persisted. A token is trusted until its `exp`, so
//! logging out only means the client discards it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdminConfig;
use crate::error::{AppError, Result};

/// JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin record id
    pub id: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and validates admin tokens
pub struct JwtConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    session: Duration,
    remembered: Duration,
}

impl JwtConfig {
    pub fn new(secret: &str, session: Duration, remembered: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            session,
            remembered,
        }
    }

    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        let session = i64::try_from(config.session_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "admin.session_hours out of range: {}",
                    config.session_hours
                ))
            })?;
        let remembered = i64::try_from(config.remember_days)
            .ok()
            .and_then(Duration::try_days)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "admin.remember_days out of range: {}",
                    config.remember_days
                ))
            })?;

        Ok(Self::new(&config.jwt_secret, session, remembered))
    }

    /// Token lifetime for a login with or without "remember me"
    pub fn lifetime(&self, remember: bool) -> Duration {
        if remember {
            self.remembered
        } else {
            self.session
        }
    }

    /// Create a token for an admin record
    pub fn create_token(
        &self,
        id: &str,
        email: &str,
        remember: bool,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let expires = now
            .checked_add_signed(self.lifetime(remember))
            .ok_or_else(|| AppError::Config("Token lifetime out of range".to_string()))?;

        let claims = Claims {
            id: id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry of a token at `now`
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        // Expiry is checked against the caller's clock below, not the system clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AppError::InvalidToken
            })?
            .claims;

        if now.timestamp() > claims.exp {
            debug!("Token for {} expired at {}", claims.email, claims.exp);
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate an `Authorization` header value of the form `Bearer <token>`
    pub fn validate_bearer(&self, header: Option<&str>, now: DateTime<Utc>) -> Result<Claims> {
        let header = header.ok_or(AppError::Unauthorized)?;

        // Stricter than a bare two-part split: the scheme must be `Bearer`
        let parts: Vec<&str> = header.split(' ').collect();
        if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") || parts[1].is_empty() {
            return Err(AppError::Unauthorized);
        }

        self.validate_token(parts[1], now)
    }
}
