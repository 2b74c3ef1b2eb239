// Copyright (c) 2026 Lottery Harness Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Harness configuration and the network table.
//!
//! ## Network table (TOML)
//!
//! ```text
//! development_chains = ["hardhat", "localhost"]
//!
//! [default]
//! name = "hardhat"
//!
//! [chains.11155111]
//! name = "sepolia"
//! block_confirmations = 6
//!
//! [chains.11155111.vrf]
//! subscription_id = 1
//! vrf_coordinator = "0x8103b0a8a00be2ddc778e6e7eaa21791cd364625"
//! key_hash = "0x474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c"
//! ```
//!
//! The table is installed at most once per process. Lookups before any install
//! see the built-in table.

use crate::core::types::{ether, parse_ether, Address, Wei, H256};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Cannot read a config file.
    #[error("read config {0}")]
    Read(String),
    /// Cannot parse TOML.
    #[error("parse config: {0}")]
    Parse(String),
    /// A `[chains.<id>]` key is not a chain id.
    #[error("invalid chain id {0:?}")]
    InvalidChainId(String),
    /// Two entries share a network name.
    #[error("duplicate network name {0:?}")]
    DuplicateNetwork(String),
    /// Name or chain id not in the table.
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
    /// A network table was already installed.
    #[error("network table already installed")]
    AlreadyInstalled,
    /// A decimal ether amount is malformed.
    #[error("invalid ether amount {0:?}")]
    InvalidAmount(String),
    /// An environment override has a malformed value.
    #[error("invalid value for {key}")]
    InvalidOverride {
        /// Variable name.
        key: &'static str,
    },
}

/// Oracle parameters of a live network.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VrfParameters {
    /// Coordinator subscription funding the requests.
    pub subscription_id: u64,
    /// Coordinator contract.
    pub vrf_coordinator: Address,
    /// Gas lane.
    pub key_hash: H256,
}

/// One network of the table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkEntry {
    /// Network name.
    pub name: String,
    /// Confirmations to wait for after each deployment (default 1).
    #[serde(default)]
    pub block_confirmations: Option<u64>,
    /// Oracle parameters; required for deployments on live networks.
    #[serde(default)]
    pub vrf: Option<VrfParameters>,
}

impl NetworkEntry {
    /// Entry with only a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            block_confirmations: None,
            vrf: None,
        }
    }

    /// Confirmations per deployment.
    pub fn block_confirmations(&self) -> u64 {
        self.block_confirmations.unwrap_or(1)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkTableFile {
    default: NetworkEntry,
    #[serde(default)]
    chains: BTreeMap<String, NetworkEntry>,
    #[serde(default)]
    development_chains: Vec<String>,
}

/// Result of resolving a network by name or chain id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNetwork {
    /// Chain id; `None` for the default network.
    pub chain_id: Option<u64>,
    /// Table entry.
    pub entry: NetworkEntry,
    /// Whether mocks are deployed on this network.
    pub development: bool,
}

/// Chain id to network lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkTable {
    default: NetworkEntry,
    chains: BTreeMap<u64, NetworkEntry>,
    development_chains: Vec<String>,
}

static INSTALLED: OnceLock<NetworkTable> = OnceLock::new();
static BUILTIN: OnceLock<NetworkTable> = OnceLock::new();

impl NetworkTable {
    /// Built-in table.
    pub fn builtin() -> Self {
        let chains = [
            (31337, "localhost"),
            (5, "goerli"),
            (1, "mainnet"),
            (11155111, "sepolia"),
            (80001, "polygon-mumbai"),
        ]
        .into_iter()
        .map(|(id, name)| (id, NetworkEntry::named(name)))
        .collect();
        Self {
            default: NetworkEntry::named("hardhat"),
            chains,
            development_chains: vec!["hardhat".to_string(), "localhost".to_string()],
        }
    }

    /// Parse a TOML table.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: NetworkTableFile =
            toml::from_str(raw).map_err(|e| ConfigError::Parse(e.message().to_string()))?;

        let mut chains = BTreeMap::new();
        let mut names = vec![file.default.name.clone()];
        for (key, entry) in file.chains {
            let id: u64 = key
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidChainId(key.clone()))?;
            if names.contains(&entry.name) {
                return Err(ConfigError::DuplicateNetwork(entry.name));
            }
            names.push(entry.name.clone());
            chains.insert(id, entry);
        }
        Ok(Self {
            default: file.default,
            chains,
            development_chains: file.development_chains,
        })
    }

    /// Read and parse a TOML table from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw =
            fs::read_to_string(path).map_err(|_| ConfigError::Read(path.display().to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Entry used when no network is selected.
    pub fn default_network(&self) -> &NetworkEntry {
        &self.default
    }

    /// Entry for `chain_id`.
    pub fn by_chain_id(&self, chain_id: u64) -> Option<&NetworkEntry> {
        self.chains.get(&chain_id)
    }

    /// Chain id and entry for `name`. The default network has no chain id.
    pub fn by_name(&self, name: &str) -> Option<(Option<u64>, &NetworkEntry)> {
        if self.default.name == name {
            return Some((None, &self.default));
        }
        self.chains
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(id, e)| (Some(*id), e))
    }

    /// Whether `name` is a development chain.
    pub fn is_development(&self, name: &str) -> bool {
        self.development_chains.iter().any(|n| n == name)
    }

    /// Development chain names.
    pub fn development_chains(&self) -> &[String] {
        &self.development_chains
    }

    /// All chain ids with their entries.
    pub fn chains(&self) -> impl Iterator<Item = (u64, &NetworkEntry)> {
        self.chains.iter().map(|(id, e)| (*id, e))
    }

    /// Resolve a network name or a decimal chain id.
    pub fn resolve(&self, name_or_id: &str) -> Result<ResolvedNetwork, ConfigError> {
        let found = match name_or_id.parse::<u64>() {
            Ok(id) => self.by_chain_id(id).map(|e| (Some(id), e)),
            Err(_) => self.by_name(name_or_id),
        };
        let (chain_id, entry) =
            found.ok_or_else(|| ConfigError::UnknownNetwork(name_or_id.to_string()))?;
        Ok(ResolvedNetwork {
            chain_id,
            entry: entry.clone(),
            development: self.is_development(&entry.name),
        })
    }
}

/// Install the process-wide network table. Only the first install succeeds.
pub fn install_network_table(table: NetworkTable) -> Result<(), ConfigError> {
    INSTALLED.set(table).map_err(|_| ConfigError::AlreadyInstalled)
}

/// Process-wide network table: the installed one, else the built-in one.
pub fn network_table() -> &'static NetworkTable {
    match INSTALLED.get() {
        Some(t) => t,
        None => BUILTIN.get_or_init(NetworkTable::builtin),
    }
}

/// Devnet section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevnetSection {
    /// Pre-funded accounts.
    pub accounts: u32,
    /// Balance of each account, in whole ether.
    pub initial_balance_ether: u64,
    /// Genesis block timestamp.
    pub genesis_timestamp: u64,
}

impl Default for DevnetSection {
    fn default() -> Self {
        Self {
            accounts: 20,
            initial_balance_ether: 10_000,
            genesis_timestamp: 1_700_000_000,
        }
    }
}

impl DevnetSection {
    /// Initial balance in wei.
    pub fn initial_balance(&self) -> Wei {
        ether(u128::from(self.initial_balance_ether))
    }
}

/// Deployment section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploySection {
    /// Script tags to run at startup.
    pub tags: Vec<String>,
    /// Seconds after a randomness request before the owner may recover the round.
    pub recovery_delay_secs: u64,
    /// Directory of the deployment store.
    pub store_dir: PathBuf,
    /// Minimum stake on development chains, in decimal ether.
    pub min_stake_ether: String,
    /// Development subscription funding, in decimal ether.
    pub subscription_fund_ether: String,
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            tags: vec!["all".to_string()],
            recovery_delay_secs: 3_600,
            store_dir: PathBuf::from("./data/deployments"),
            min_stake_ether: "1.0".to_string(),
            subscription_fund_ether: "1.0".to_string(),
        }
    }
}

impl DeploySection {
    /// Minimum stake in wei.
    pub fn min_stake(&self) -> Result<Wei, ConfigError> {
        parse_ether(&self.min_stake_ether)
            .map_err(|_| ConfigError::InvalidAmount(self.min_stake_ether.clone()))
    }

    /// Subscription funding in wei.
    pub fn subscription_fund(&self) -> Result<Wei, ConfigError> {
        parse_ether(&self.subscription_fund_ether)
            .map_err(|_| ConfigError::InvalidAmount(self.subscription_fund_ether.clone()))
    }
}

/// Automation section. Accounts are development account indices.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutomationSection {
    /// Keeper poll period.
    pub keeper_interval_ms: u64,
    /// Interval mining period; 0 disables the miner.
    pub block_interval_ms: u64,
    /// Oracle confirmation poll period.
    pub oracle_poll_ms: u64,
    /// Account submitting upkeeps.
    pub keeper_account: u32,
    /// Account answering randomness requests.
    pub oracle_account: u32,
}

impl Default for AutomationSection {
    fn default() -> Self {
        Self {
            keeper_interval_ms: 1_000,
            block_interval_ms: 1_000,
            oracle_poll_ms: 200,
            keeper_account: 1,
            oracle_account: 2,
        }
    }
}

/// Node configuration (`config/harness.toml`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Network name or chain id.
    pub network: String,
    /// Network table file; the built-in table is used when absent.
    pub networks_file: Option<PathBuf>,
    /// Metrics/health listener.
    pub metrics_addr: SocketAddr,
    /// Devnet parameters.
    pub devnet: DevnetSection,
    /// Deployment parameters.
    pub deploy: DeploySection,
    /// Keeper, oracle and miner parameters.
    pub automation: AutomationSection,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            network: "hardhat".to_string(),
            networks_file: None,
            metrics_addr: SocketAddr::from(([127, 0, 0, 1], 9464)),
            devnet: DevnetSection::default(),
            deploy: DeploySection::default(),
            automation: AutomationSection::default(),
        }
    }
}

/// Selects the config file path.
pub const ENV_CONFIG: &str = "LOTTERY_CONFIG";
/// Overrides `network`.
pub const ENV_NETWORK: &str = "LOTTERY_NETWORK";
/// Overrides `metrics_addr`.
pub const ENV_METRICS_ADDR: &str = "LOTTERY_METRICS_ADDR";

impl HarnessConfig {
    /// Parse TOML; missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.message().to_string()))
    }

    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw =
            fs::read_to_string(path).map_err(|_| ConfigError::Read(path.display().to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(n) = lookup(ENV_NETWORK) {
            let n = n.trim();
            if n.is_empty() {
                return Err(ConfigError::InvalidOverride { key: ENV_NETWORK });
            }
            self.network = n.to_string();
        }
        if let Some(a) = lookup(ENV_METRICS_ADDR) {
            self.metrics_addr = a
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { key: ENV_METRICS_ADDR })?;
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|k| std::env::var(k).ok())
    }
}
