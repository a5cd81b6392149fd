//! CLI tool for managing admin credential records
//!
//! # Usage
//!
//! ```bash
//! # Create the configured admin record if it does not exist
//! alvant-admin --config config.toml seed
//!
//! # List admin records
//! alvant-admin list
//!
//! # Remove a record
//! alvant-admin delete admin@example.com
//! ```

use alvant_rs::auth::otp::normalize_email;
use alvant_rs::config::Config;
use alvant_rs::storage::{Database, SqliteCredentialStore};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alvant-admin")]
#[command(about = "Manage admin login records", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configured admin record if absent
    Seed,
    /// List admin records
    List,
    /// Delete an admin record
    Delete {
        /// Admin email address
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let db = Database::connect(&config.storage).await?;
    let store = SqliteCredentialStore::new(&db);

    match cli.command {
        Commands::Seed => {
            let email = normalize_email(&config.admin.email);
            if store.create_if_absent(&email, Utc::now()).await? {
                println!("✓ Admin {} created", email);
            } else {
                println!("Admin {} already exists", email);
            }
        }
        Commands::List => {
            let records = store.list().await?;

            if records.is_empty() {
                println!("No admin records found.");
            } else {
                println!("{:<36} {:<26} {:<12}", "Email", "Created At", "Pending OTP");
                println!("{:-<74}", "");
                for record in &records {
                    println!(
                        "{:<36} {:<26} {:<12}",
                        record.email,
                        record.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        if record.pending.is_some() { "yes" } else { "no" }
                    );
                }
                println!("\nTotal: {} record(s)", records.len());
            }
        }
        Commands::Delete { email } => {
            let email = normalize_email(&email);
            if !store.delete(&email).await? {
                eprintln!("Error: Admin {} does not exist", email);
                std::process::exit(1);
            }
            println!("✓ Admin {} deleted", email);
        }
    }

    Ok(())
}
