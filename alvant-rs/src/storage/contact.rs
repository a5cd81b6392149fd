//! Contact form submissions

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::Result;

/// A stored contact submission. Field names match what the dashboard reads.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Normalized, validated input for a new contact
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub categories: Vec<String>,
}

type ContactRow = (String, String, String, String, String, String, String);

#[derive(Clone, Debug)]
pub struct ContactRepository {
    db: SqlitePool,
}

impl ContactRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.pool().clone(),
        }
    }

    pub async fn insert(&self, new: NewContact, now: DateTime<Utc>) -> Result<Contact> {
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            message: new.message,
            categories: new.categories,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO contacts (id, name, email, phone, message, categories, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.message)
        .bind(serde_json::to_string(&contact.categories)?)
        .bind(format_timestamp(contact.created_at))
        .execute(&self.db)
        .await?;

        info!("Contact saved: {} <{}>", contact.name, contact.email);
        Ok(contact)
    }

    /// All submissions, newest first
    pub async fn list(&self) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, name, email, phone, message, categories, created_at
            FROM contacts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(id, name, email, phone, message, categories, created_at)| -> Result<Contact> {
                Ok(Contact {
                    id,
                    name,
                    email,
                    phone,
                    message,
                    categories: serde_json::from_str(&categories)?,
                    created_at: parse_timestamp(&created_at),
                })
            })
            .collect()
    }
}
