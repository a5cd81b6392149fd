//! OTP delivery channels
//!
//! - [`smtp`]: email delivery over SMTP
//! - [`DisabledNotifier`]: used when no mail transport is configured

pub mod smtp;

pub use smtp::SmtpNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::config::MailConfig;
use crate::error::{AppError, Result};

/// Sends a one-time code to a destination address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send(&self, destination: &str, code: &str) -> Result<()>;
}

/// Channel that refuses every delivery
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl OtpNotifier for DisabledNotifier {
    async fn send(&self, _destination: &str, _code: &str) -> Result<()> {
        Err(AppError::Delivery("email service not configured".to_string()))
    }
}

/// Build the delivery channel for the given mail configuration
pub fn from_config(mail: Option<&MailConfig>) -> Result<Arc<dyn OtpNotifier>> {
    match mail {
        Some(mail) => Ok(Arc::new(SmtpNotifier::new(mail)?)),
        None => {
            warn!("Email credentials not configured. OTP delivery will fail.");
            Ok(Arc::new(DisabledNotifier))
        }
    }
}
