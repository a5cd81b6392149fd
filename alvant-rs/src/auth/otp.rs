//! Admin login by emailed one-time password
//!
//! Per admin identity the record moves between two states:
//! no pending code, and a pending code with an expiry. Requesting a code
//! overwrites whatever is pending; a successful verification clears it in
//! the same conditional update that checks it, so a code is accepted once.

use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::auth::token::JwtConfig;
use crate::clock::Clock;
use crate::config::{Config, RuntimeMode};
use crate::error::{AppError, Result};
use crate::notify::OtpNotifier;
use crate::storage::admin::PendingOtp;
use crate::storage::{AdminRecord, CredentialStore};

/// Generate a uniformly distributed 6-digit code
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Normalize a submitted identity for comparison with the allow-list
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct OtpSettings {
    /// The allow-listed admin identity, normalized
    pub admin_email: String,
    pub mode: RuntimeMode,
    pub otp_ttl: Duration,
    pub delivery_timeout: Duration,
}

impl OtpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            admin_email: normalize_email(&config.admin.email),
            mode: config.runtime.mode,
            otp_ttl: config.admin.otp_ttl(),
            delivery_timeout: config.admin.delivery_timeout(),
        }
    }
}

/// Issues codes, verifies them and mints admin tokens
pub struct OtpService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn OtpNotifier>,
    tokens: Arc<JwtConfig>,
    clock: Arc<dyn Clock>,
    settings: OtpSettings,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn OtpNotifier>,
        tokens: Arc<JwtConfig>,
        clock: Arc<dyn Clock>,
        settings: OtpSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
            clock,
            settings,
        }
    }

    fn check_identity(&self, email: &str) -> Result<String> {
        let email = normalize_email(email);
        if email != self.settings.admin_email {
            warn!("OTP attempt for non-admin identity: {}", email);
            return Err(AppError::InvalidIdentity);
        }
        Ok(email)
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.settings.otp_ttl)
            .map_err(|e| AppError::Config(format!("Invalid OTP lifetime: {}", e)))?;
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Config("OTP lifetime out of range".to_string()))?;
        // Millisecond precision is what the store keeps
        Ok(expires.trunc_subsecs(3))
    }

    /// Generate, store and deliver a fresh code for the admin
    pub async fn request_otp(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        let email = self.check_identity(email)?;

        let now = self.clock.now();
        let mut record = self
            .store
            .find_by_email(&email)
            .await?
            .unwrap_or_else(|| AdminRecord::new(&email, now));

        let code = generate_code();
        record.pending = Some(PendingOtp {
            code: code.clone(),
            expires_at: self.expiry_from(now)?,
        });
        record.updated_at = now;

        // Stored before delivery so a slow mail relay never holds the record
        self.store.upsert(&record).await?;
        info!("OTP issued for {}", email);

        self.deliver(&email, &code).await
    }

    async fn deliver(&self, email: &str, code: &str) -> Result<()> {
        let outcome =
            match tokio::time::timeout(self.settings.delivery_timeout, self.notifier.send(email, code))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::Delivery("email send timeout".to_string())),
            };

        match outcome {
            Ok(()) => Ok(()),
            Err(e) if self.settings.mode.is_production() => {
                error!("Failed to send OTP email to {}: {}", email, e);
                Err(match e {
                    AppError::Delivery(_) => e,
                    other => AppError::Delivery(other.to_string()),
                })
            }
            Err(e) => {
                warn!("Failed to send OTP email to {} ({}), development OTP: {}", email, e, code);
                Ok(())
            }
        }
    }

    /// Check a submitted code and, on success, consume it and return a signed token
    pub async fn verify_otp(&self, email: &str, code: &str, remember: bool) -> Result<String> {
        let code = code.trim();
        if email.trim().is_empty() || code.is_empty() {
            return Err(AppError::Validation(
                "Email and OTP are required".to_string(),
            ));
        }
        let email = self.check_identity(email)?;

        let record = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AppError::NotRequested)?;

        let now = self.clock.now();
        let pending = match &record.pending {
            Some(p) if !p.is_expired_at(now) => p,
            _ => return Err(AppError::Expired),
        };

        if pending.code != code {
            warn!("Invalid OTP submitted for {}", email);
            return Err(AppError::Mismatch);
        }

        // Another verification may have consumed the code since it was read
        if !self.store.consume_otp(&email, code, now).await? {
            return Err(AppError::Expired);
        }

        let token = self
            .tokens
            .create_token(&record.id, &record.email, remember, now)?;

        info!("Admin {} logged in (remember: {})", email, remember);
        Ok(token)
    }
}
