//! Admin credential record
//!
//! One row per admin identity. The pending OTP code and its expiry live in
//! two nullable columns that are always written together; a table CHECK
//! rejects a row holding only one of them.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::Result;

/// An issued, not yet consumed OTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    /// Expiry is inclusive: the code is still accepted at `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminRecord {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub pending: Option<PendingOtp>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl AdminRecord {
    pub fn new(email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Email-keyed store for admin credential records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>>;

    /// Insert the record, or overwrite the OTP fields of the record with the same email
    async fn upsert(&self, record: &AdminRecord) -> Result<()>;

    /// Clear the pending OTP if it equals `code` and has not expired at `now`.
    ///
    /// Returns `true` only for the single caller whose update cleared it.
    async fn consume_otp(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<bool>;
}

type AdminRow = (String, String, Option<String>, Option<i64>, String, String);

fn row_to_record((id, email, otp, expires, created_at, updated_at): AdminRow) -> AdminRecord {
    let pending = match (otp, expires) {
        (Some(code), Some(millis)) => Utc
            .timestamp_millis_opt(millis)
            .single()
            .map(|expires_at| PendingOtp { code, expires_at }),
        _ => None,
    };

    AdminRecord {
        id,
        email,
        pending,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    }
}

/// SQLite implementation of [`CredentialStore`]
#[derive(Clone, Debug)]
pub struct SqliteCredentialStore {
    db: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.pool().clone(),
        }
    }

    /// Create a record for `email` unless one exists. Returns whether it was created.
    pub async fn create_if_absent(&self, email: &str, now: DateTime<Utc>) -> Result<bool> {
        let record = AdminRecord::new(email, now);
        let result = sqlx::query(
            r#"
            INSERT INTO admins (id, email, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.email)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&self.db)
        .await?;

        let created = result.rows_affected() == 1;
        if created {
            info!("Admin record created: {}", email);
        }
        Ok(created)
    }

    /// List all records, oldest first
    pub async fn list(&self) -> Result<Vec<AdminRecord>> {
        let rows = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, email, otp, otp_expires_at, created_at, updated_at
            FROM admins
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Delete a record. Returns whether a row was removed.
    pub async fn delete(&self, email: &str) -> Result<bool> {
        info!("Deleting admin record: {}", email);

        let result = sqlx::query("DELETE FROM admins WHERE email = ?")
            .bind(email)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>> {
        let row = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, email, otp, otp_expires_at, created_at, updated_at
            FROM admins
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(row_to_record))
    }

    async fn upsert(&self, record: &AdminRecord) -> Result<()> {
        let (otp, expires) = match &record.pending {
            Some(p) => (Some(p.code.as_str()), Some(p.expires_at.timestamp_millis())),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO admins (id, email, otp, otp_expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                otp = excluded.otp,
                otp_expires_at = excluded.otp_expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.email)
        .bind(otp)
        .bind(expires)
        .bind(format_timestamp(record.created_at))
        .bind(format_timestamp(record.updated_at))
        .execute(&self.db)
        .await?;

        debug!("Admin record stored: {}", record.email);
        Ok(())
    }

    async fn consume_otp(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE admins
            SET otp = NULL, otp_expires_at = NULL, updated_at = ?
            WHERE email = ? AND otp = ? AND otp_expires_at >= ?
            "#,
        )
        .bind(format_timestamp(now))
        .bind(email)
        .bind(code)
        .bind(now.timestamp_millis())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn store() -> SqliteCredentialStore {
        let db = Database::in_memory().await.unwrap();
        SqliteCredentialStore::new(&db)
    }

    fn pending(code: &str, expires_at: DateTime<Utc>) -> Option<PendingOtp> {
        Some(PendingOtp {
            code: code.to_string(),
            expires_at,
        })
    }

    #[tokio::test]
    async fn test_find_missing_record() {
        let store = store().await;
        assert!(store.find_by_email("admin@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites_otp() {
        let store = store().await;
        let now = Utc::now();

        let mut record = AdminRecord::new("admin@example.com", now);
        record.pending = pending("123456", now + Duration::minutes(5));
        store.upsert(&record).await.unwrap();

        let stored = store.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.pending.as_ref().unwrap().code, "123456");

        // A second upsert with a fresh id keeps the original row identity
        let mut again = AdminRecord::new("admin@example.com", now);
        again.pending = pending("654321", now + Duration::minutes(5));
        store.upsert(&again).await.unwrap();

        let stored = store.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.pending.unwrap().code, "654321");
    }

    #[tokio::test]
    async fn test_consume_otp_is_single_use() {
        let store = store().await;
        let now = Utc::now();

        let mut record = AdminRecord::new("admin@example.com", now);
        record.pending = pending("111222", now + Duration::minutes(5));
        store.upsert(&record).await.unwrap();

        assert!(store.consume_otp("admin@example.com", "111222", now).await.unwrap());
        assert!(!store.consume_otp("admin@example.com", "111222", now).await.unwrap());

        let stored = store.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert!(stored.pending.is_none());
    }

    #[tokio::test]
    async fn test_consume_otp_rejects_wrong_or_expired_code() {
        let store = store().await;
        let now = Utc::now();
        let expires_at = now + Duration::minutes(5);

        let mut record = AdminRecord::new("admin@example.com", now);
        record.pending = pending("111222", expires_at);
        store.upsert(&record).await.unwrap();

        assert!(!store.consume_otp("admin@example.com", "999999", now).await.unwrap());
        let later = expires_at + Duration::seconds(1);
        assert!(!store.consume_otp("admin@example.com", "111222", later).await.unwrap());

        // Nothing was cleared by the failed attempts
        let stored = store.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert!(stored.pending.is_some());
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = store().await;
        let now = Utc::now();

        assert!(store.create_if_absent("admin@example.com", now).await.unwrap());
        assert!(!store.create_if_absent("admin@example.com", now).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(store.delete("admin@example.com").await.unwrap());
        assert!(!store.delete("admin@example.com").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_pending_expiry_is_inclusive() {
        let now = Utc::now();
        let otp = PendingOtp {
            code: "123456".to_string(),
            expires_at: now,
        };
        assert!(!otp.is_expired_at(now));
        assert!(otp.is_expired_at(now + Duration::milliseconds(1)));
    }
}
