//! Configuration for alvant-rs
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `ALVANT__SECTION__KEY` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, Result};

/// JWT secret used when none is configured. Refused in production.
pub const DEV_JWT_SECRET: &str = "dev_admin_secret";

pub const MAX_OTP_TTL_SECS: u64 = 24 * 3600;
pub const MAX_DELIVERY_TIMEOUT_SECS: u64 = 300;
pub const MAX_SESSION_HOURS: u64 = 24 * 365;
pub const MAX_REMEMBER_DAYS: u64 = 10 * 365;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub runtime: RuntimeConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Allowed CORS origins; empty mirrors the request origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeMode::Production)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    pub mode: RuntimeMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// The single allow-listed admin identity
    pub email: String,
    pub jwt_secret: String,
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: u64,
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,
    #[serde(default = "default_session_hours")]
    pub session_hours: u64,
    #[serde(default = "default_remember_days")]
    pub remember_days: u64,
}

impl AdminConfig {
    pub fn otp_ttl(&self) -> Duration {
        Duration::from_secs(self.otp_ttl_secs)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    /// Sender address; falls back to `smtp_user`
    pub from: Option<String>,
}

impl MailConfig {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.smtp_user)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

fn default_otp_ttl() -> u64 {
    300
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_session_hours() -> u64 {
    6
}

fn default_remember_days() -> u64 {
    30
}

fn default_smtp_port() -> u16 {
    587
}

fn default_max_connections() -> u32 {
    10
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        } else {
            builder = builder.add_source(config::File::with_name("config").required(false));
        }

        let config: Config = builder
            .add_source(
                config::Environment::with_prefix("ALVANT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.admin.email.trim().is_empty() {
            return Err(AppError::Config("admin.email is required".to_string()));
        }

        if self.admin.jwt_secret.is_empty() {
            return Err(AppError::Config("admin.jwt_secret is required".to_string()));
        }

        if self.runtime.mode.is_production() && self.admin.jwt_secret == DEV_JWT_SECRET {
            return Err(AppError::Config(
                "admin.jwt_secret must be changed in production".to_string(),
            ));
        }

        let admin = &self.admin;
        for (key, value, max) in [
            ("otp_ttl_secs", admin.otp_ttl_secs, MAX_OTP_TTL_SECS),
            ("delivery_timeout_secs", admin.delivery_timeout_secs, MAX_DELIVERY_TIMEOUT_SECS),
            ("session_hours", admin.session_hours, MAX_SESSION_HOURS),
            ("remember_days", admin.remember_days, MAX_REMEMBER_DAYS),
        ] {
            if value == 0 || value > max {
                return Err(AppError::Config(format!(
                    "admin.{} must be between 1 and {}, got {}",
                    key, max, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:5000".to_string(),
                cors_origins: Vec::new(),
            },
            runtime: RuntimeConfig {
                mode: RuntimeMode::Development,
            },
            admin: AdminConfig {
                email: "admin@example.com".to_string(),
                jwt_secret: DEV_JWT_SECRET.to_string(),
                otp_ttl_secs: default_otp_ttl(),
                delivery_timeout_secs: default_delivery_timeout(),
                session_hours: default_session_hours(),
                remember_days: default_remember_days(),
            },
            mail: None,
            storage: StorageConfig {
                database_url: "sqlite://alvant.db".to_string(),
                max_connections: default_max_connections(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
