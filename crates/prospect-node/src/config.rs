//! Miner runtime configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for the mining loop and its policies. Every field has a
/// default, so a partial config file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Public key the coinbase output pays.
    pub miner_key: String,
    /// Seconds to wait between mine cycles.
    pub cycle_interval_secs: u64,
    /// Required leading zero hex digits of a winning block hash.
    pub difficulty: u32,
    /// Coinbase award at height 0, in base units.
    pub base_award: u64,
    /// Blocks between award halvings.
    pub halving_interval: u64,
    /// Whether the miner starts active.
    pub start_active: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            miner_key: "miner".to_string(),
            cycle_interval_secs: 300,
            difficulty: 4,
            base_award: 5_000_000_000,
            halving_interval: 210_000,
            start_active: true,
        }
    }
}

impl MinerConfig {
    /// Load from a JSON file, falling back to defaults for absent
    /// fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
