//! SMTP delivery of admin login codes

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::OtpNotifier;
use crate::config::MailConfig;
use crate::error::{AppError, Result};

/// Port on which the relay speaks implicit TLS; every other port upgrades with STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

pub const OTP_SUBJECT: &str = "Admin Dashboard Login OTP";

/// Pooled SMTP transport, built once and shared
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .map_err(|e| AppError::Config(format!("Invalid SMTP host: {}", e)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ))
            .build();

        let from = config
            .sender()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid sender address: {}", e)))?;

        info!(
            "SMTP delivery via {}:{}",
            config.smtp_host, config.smtp_port
        );
        Ok(Self { transport, from })
    }
}

/// Build the OTP email
pub fn otp_message(from: Mailbox, to: &str, code: &str) -> Result<Message> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| AppError::Delivery(format!("Invalid recipient: {}", e)))?;

    let text = format!(
        "Your OTP code for admin dashboard login is: {}. This OTP is valid for 5 minutes.",
        code
    );
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Admin Dashboard Login</h2>
  <p>Your OTP code for admin dashboard login is:</p>
  <div style="background-color: #f4f4f4; padding: 20px; text-align: center; margin: 20px 0;">
    <h1 style="color: #007bff; font-size: 32px; margin: 0; letter-spacing: 5px;">{}</h1>
  </div>
  <p style="color: #666;">This OTP is valid for 5 minutes.</p>
  <p style="color: #666;">If you didn't request this OTP, please ignore this email.</p>
</div>"#,
        code
    );

    Message::builder()
        .from(from)
        .to(to)
        .subject(OTP_SUBJECT)
        .multipart(MultiPart::alternative_plain_html(text, html))
        .map_err(|e| AppError::Delivery(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl OtpNotifier for SmtpNotifier {
    async fn send(&self, destination: &str, code: &str) -> Result<()> {
        let message = otp_message(self.from.clone(), destination, code)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        info!(
            "OTP email sent to {} ({})",
            destination,
            response.code()
        );
        Ok(())
    }
}
