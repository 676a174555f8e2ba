//! oyken-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the CSV
//! tables in the configured data directory, and serves the JSON API under
//! `/api`.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use oyken_api::{ApiState, api_router};
use oyken_core::clock::SystemClock;
use oyken_store_csv::CsvStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Oyken operations dashboard server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let data_dir = &server_cfg.data_dir;
  let store = CsvStore::open(data_dir)
    .await
    .with_context(|| format!("failed to open data directory {data_dir:?}"))?;
  tracing::info!(dir = %store.dir().display(), "opened CSV store");

  let state = ApiState::new(
    Arc::new(store),
    Arc::new(SystemClock),
    server_cfg.statement.clone(),
  );

  let app = Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
