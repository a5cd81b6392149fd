//! alvant-rs: API server
//!
//! Usage: `alvant-rs [config.toml]`. Settings can also come from
//! `ALVANT__SECTION__KEY` environment variables.

use alvant_rs::api::{ApiServer, AppState};
use alvant_rs::clock::SystemClock;
use alvant_rs::config::{Config, LoggingConfig};
use alvant_rs::notify;
use alvant_rs::storage::Database;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("alvant_rs={0},tower_http={0}", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    init_logging(&config.logging);

    info!("Starting alvant-rs v{}", env!("CARGO_PKG_VERSION"));
    info!("Runtime mode: {:?}", config.runtime.mode);
    if let Some(path) = &config_path {
        info!("Configuration loaded from {}", path.display());
    }

    let db = Database::connect(&config.storage).await?;
    let notifier = notify::from_config(config.mail.as_ref())?;

    let state = AppState::new(&config, db, notifier, Arc::new(SystemClock))?;
    let server = ApiServer::new(state, &config.server);

    server.run().await?;

    Ok(())
}
