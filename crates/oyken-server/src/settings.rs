//! Server configuration.
//!
//! Layered from an optional TOML file and `OYKEN_*` environment variables.
//! Nested keys use a double underscore, e.g.
//! `OYKEN_STATEMENT__SOCIAL_SECURITY_RATE=0.3`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use oyken_core::statement::StatementConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:      String,
  pub port:      u16,
  /// Directory holding the CSV tables. A leading `~/` is expanded by the store.
  pub data_dir:  PathBuf,
  pub statement: StatementConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:      "127.0.0.1".to_owned(),
      port:      8080,
      data_dir:  PathBuf::from("data"),
      statement: StatementConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("OYKEN")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
