//! Document storage
//!
//! SQLite-backed collections:
//! - [`admin`]: the admin credential record (email, pending OTP, expiry)
//! - [`contact`]: contact form submissions
//! - [`interest`]: interest registrations

pub mod admin;
pub mod contact;
pub mod interest;

pub use admin::{AdminRecord, CredentialStore, SqliteCredentialStore};
pub use contact::{Contact, ContactRepository, NewContact};
pub use interest::{NewRegisterInterest, RegisterInterest, RegisterInterestRepository};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::StorageConfig;
use crate::error::Result;

/// Owned handle to the connection pool. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect using the storage configuration and create the schema
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        info!("Connecting to database {}", config.database_url);

        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Private in-memory database on a single connection
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Verify database connectivity
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                otp TEXT,
                otp_expires_at INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK ((otp IS NULL) = (otp_expires_at IS NULL))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                message TEXT NOT NULL,
                categories TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS register_interests (
                id TEXT PRIMARY KEY,
                company_name TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                job_title TEXT NOT NULL,
                phone TEXT NOT NULL,
                email TEXT NOT NULL,
                has_uae TEXT NOT NULL,
                multi_country TEXT NOT NULL,
                line_of_business TEXT NOT NULL,
                categories TEXT NOT NULL,
                product_interest TEXT NOT NULL,
                markets TEXT NOT NULL,
                services TEXT NOT NULL,
                captcha TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_created ON contacts(created_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_register_created ON register_interests(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Parse an RFC 3339 column written by this module
pub(crate) fn parse_timestamp(value: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&chrono::Utc))
        .unwrap_or_default()
}

/// Timestamp format used for ordered text columns
pub(crate) fn format_timestamp(value: chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
