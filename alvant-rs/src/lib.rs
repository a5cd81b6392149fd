//! alvant-rs: contact, interest registration and admin API
//!
//! A small JSON backend for a marketing site and its admin dashboard.
//!
//! # Features
//!
//! - **Forms**: validated contact and interest registration submissions
//! - **Admin login**: a single allow-listed admin signs in with an emailed
//!   one-time password and receives a signed session token
//! - **Storage**: SQLite through `sqlx`
//! - **Delivery**: login codes sent over SMTP
//!
//! # Example
//!
//! ```no_run
//! use alvant_rs::api::{ApiServer, AppState};
//! use alvant_rs::clock::SystemClock;
//! use alvant_rs::config::Config;
//! use alvant_rs::notify;
//! use alvant_rs::storage::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let db = Database::connect(&config.storage).await?;
//!     let notifier = notify::from_config(config.mail.as_ref())?;
//!
//!     let state = AppState::new(&config, db, notifier, Arc::new(SystemClock))?;
//!     ApiServer::new(state, &config.server).run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod forms;
pub mod notify;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
