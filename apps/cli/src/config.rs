//! Optional YAML configuration for the CLI.
//!
//! ```yaml
//! data_dir: ./ledger-data
//! slot: farm-ledger
//! id_seed: 42
//! currency:
//!   symbol: Rp
//!   thousands_sep: "."
//!   decimal_sep: ","
//! ```

use anyhow::{Context, Result};
use ledger_core::EngineConfig;
use ledger_econ::format::CurrencyFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = ".farm-ledger";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub engine: EngineConfig,
    pub currency: CurrencyFormat,
}

impl CliConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `--data-dir` wins over the file, which wins over the default.
    pub fn resolve_data_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}
