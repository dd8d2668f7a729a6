//! observer-server binary.
//!
//! Reads `observer.toml` (or the path given with `--config`) layered under
//! environment variables, opens the SQLite visit ledger, and serves the
//! telemetry API over HTTP.
//!
//! ```text
//! PORT=8080 DATABASE_URL=/var/lib/observer.db observer-server
//! ```

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use observer_server::ServerConfig;
use observer_store_sqlite::SqliteLedger;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Observer telemetry backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "observer.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let env = std::env::vars().collect::<HashMap<_, _>>();
  let server_cfg = ServerConfig::load(&cli.config, &env)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let ledger = match server_cfg.database_path() {
    Some(path) => SqliteLedger::open(&path)
      .await
      .with_context(|| format!("failed to open ledger at {path:?}"))?,
    None => {
      tracing::warn!("using an in-memory ledger; visits will not survive a restart");
      SqliteLedger::open_in_memory()
        .await
        .context("failed to open in-memory ledger")?
    }
  };
  tracing::info!(database = %server_cfg.database_url, "ledger connected");

  let app = observer_server::app(Arc::new(ledger));
  let address = server_cfg.address();

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
