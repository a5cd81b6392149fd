//! Interest registrations

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::Result;

/// Maximum number of registrations returned by [`RegisterInterestRepository::list`]
pub const LIST_LIMIT: i64 = 200;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInterest {
    #[serde(rename = "_id")]
    pub id: String,
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "hasUAE")]
    pub has_uae: String,
    pub multi_country: String,
    pub line_of_business: Vec<String>,
    pub categories: Vec<String>,
    pub product_interest: Vec<String>,
    pub markets: Vec<String>,
    pub services: Vec<String>,
    pub captcha: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized, validated input for a new registration
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegisterInterest {
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub phone: String,
    pub email: String,
    pub has_uae: String,
    pub multi_country: String,
    pub line_of_business: Vec<String>,
    pub categories: Vec<String>,
    pub product_interest: Vec<String>,
    pub markets: Vec<String>,
    pub services: Vec<String>,
    pub captcha: String,
}

fn json_list(row: &SqliteRow, column: &str) -> Result<Vec<String>> {
    let raw: String = row.try_get(column)?;
    Ok(serde_json::from_str(&raw)?)
}

fn from_row(row: &SqliteRow) -> Result<RegisterInterest> {
    Ok(RegisterInterest {
        id: row.try_get("id")?,
        company_name: row.try_get("company_name")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        job_title: row.try_get("job_title")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        has_uae: row.try_get("has_uae")?,
        multi_country: row.try_get("multi_country")?,
        line_of_business: json_list(row, "line_of_business")?,
        categories: json_list(row, "categories")?,
        product_interest: json_list(row, "product_interest")?,
        markets: json_list(row, "markets")?,
        services: json_list(row, "services")?,
        captcha: row.try_get("captcha")?,
        created_at: parse_timestamp(row.try_get("created_at")?),
        updated_at: parse_timestamp(row.try_get("updated_at")?),
    })
}

#[derive(Clone, Debug)]
pub struct RegisterInterestRepository {
    db: SqlitePool,
}

impl RegisterInterestRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.pool().clone(),
        }
    }

    pub async fn insert(
        &self,
        new: NewRegisterInterest,
        now: DateTime<Utc>,
    ) -> Result<RegisterInterest> {
        let record = RegisterInterest {
            id: Uuid::new_v4().to_string(),
            company_name: new.company_name,
            first_name: new.first_name,
            last_name: new.last_name,
            job_title: new.job_title,
            phone: new.phone,
            email: new.email,
            has_uae: new.has_uae,
            multi_country: new.multi_country,
            line_of_business: new.line_of_business,
            categories: new.categories,
            product_interest: new.product_interest,
            markets: new.markets,
            services: new.services,
            captcha: new.captcha,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO register_interests (
                id, company_name, first_name, last_name, job_title, phone, email,
                has_uae, multi_country, line_of_business, categories, product_interest,
                markets, services, captcha, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.company_name)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.job_title)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(&record.has_uae)
        .bind(&record.multi_country)
        .bind(serde_json::to_string(&record.line_of_business)?)
        .bind(serde_json::to_string(&record.categories)?)
        .bind(serde_json::to_string(&record.product_interest)?)
        .bind(serde_json::to_string(&record.markets)?)
        .bind(serde_json::to_string(&record.services)?)
        .bind(&record.captcha)
        .bind(format_timestamp(record.created_at))
        .bind(format_timestamp(record.updated_at))
        .execute(&self.db)
        .await?;

        info!(
            "Registration saved: {} ({} {})",
            record.company_name, record.first_name, record.last_name
        );
        Ok(record)
    }

    /// Newest registrations first, capped at [`LIST_LIMIT`]
    pub async fn list(&self) -> Result<Vec<RegisterInterest>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM register_interests
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(LIST_LIMIT)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(from_row).collect()
    }
}
