//! Settings from the optional TOML file, overridden by flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use oyken_core::statement::StatementConfig;
use serde::Deserialize;

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct ConfigFile {
  data_dir:  Option<PathBuf>,
  statement: StatementConfig,
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub data_dir:  PathBuf,
  pub statement: StatementConfig,
}

impl Settings {
  /// Flags override the config file, which overrides defaults.
  pub fn resolve(config: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
    let file: ConfigFile = match config {
      Some(path) => {
        let raw = std::fs::read_to_string(path)
          .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).context("parsing config file")?
      }
      None => ConfigFile::default(),
    };

    let data_dir = data_dir
      .or(file.data_dir)
      .unwrap_or_else(|| PathBuf::from("data"));

    Ok(Self {
      data_dir,
      statement: file.statement,
    })
  }
}
