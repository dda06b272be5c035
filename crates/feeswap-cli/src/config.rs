//! Simulation configuration loading and management.

use anyhow::Context;
use feeswap_core::{Address, LedgerSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full configuration for a local feeswap simulation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeeswapConfig {
    /// Ledger construction settings and its owner.
    #[serde(default)]
    pub ledger: LedgerSection,

    /// Initial router settings.
    #[serde(default)]
    pub router: RouterSection,

    /// In-memory chain clock.
    #[serde(default)]
    pub chain: ChainSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Liquidity pools seeded into every deployed router.
    #[serde(default)]
    pub pools: Vec<PoolConfig>,

    /// Funded accounts.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    #[serde(flatten)]
    pub settings: LedgerSettings,
    /// Sole account allowed to call privileged operations.
    #[serde(default = "default_owner")]
    pub owner: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSection {
    /// Address of the constant-product router deployed at startup.
    #[serde(default = "default_router")]
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSection {
    #[serde(default = "default_height")]
    pub height: u64,
    /// Unix seconds.
    #[serde(default = "default_timestamp")]
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// A token pair and the reserves each router's pool is seeded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub token_a: Address,
    pub token_b: Address,
    pub reserve_a: u64,
    pub reserve_b: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub address: Address,
    pub token: Address,
    pub balance: u64,
    /// Grant the ledger an unlimited allowance on `token`.
    #[serde(default = "default_true")]
    pub approve_ledger: bool,
}

fn default_owner() -> Address {
    Address::from_low_u64(0xad)
}
fn default_router() -> Address {
    Address::from_low_u64(0x90)
}
fn default_height() -> u64 {
    1
}
fn default_timestamp() -> u64 {
    1_700_000_000
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            settings: LedgerSettings::default(),
            owner: default_owner(),
        }
    }
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            address: default_router(),
        }
    }
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            height: default_height(),
            timestamp: default_timestamp(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl FeeswapConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: FeeswapConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Starter configuration: three tokens, two pools and one funded trader.
    pub fn sample() -> Self {
        let weth = Address::from_low_u64(0x1);
        let tka = Address::from_low_u64(0xa);
        let tkb = Address::from_low_u64(0xb);
        Self {
            pools: vec![
                PoolConfig {
                    token_a: tka,
                    token_b: weth,
                    reserve_a: 1_000_000_000_000,
                    reserve_b: 500_000_000_000,
                },
                PoolConfig {
                    token_a: weth,
                    token_b: tkb,
                    reserve_a: 500_000_000_000,
                    reserve_b: 2_000_000_000_000,
                },
            ],
            accounts: vec![AccountConfig {
                address: Address::from_low_u64(0x77),
                token: tka,
                balance: 100_000_000_000,
                approve_ledger: true,
            }],
            ..Self::default()
        }
    }
}
