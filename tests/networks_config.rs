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

use lottery_harness::core::config::{
    install_network_table, network_table, ConfigError, HarnessConfig, NetworkTable,
};
use lottery_harness::core::types::ether;
use std::io::Write;
use std::path::PathBuf;

fn repo_file(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

#[test]
fn shipped_network_table_matches_builtin_names() {
    let file = NetworkTable::load(&repo_file("config/networks.toml")).unwrap();
    let builtin = NetworkTable::builtin();
    for (id, entry) in builtin.chains() {
        assert_eq!(file.by_chain_id(id).unwrap().name, entry.name);
    }
    assert_eq!(file.default_network().name, "hardhat");
    assert_eq!(file.development_chains(), builtin.development_chains());

    let sepolia = file.resolve("sepolia").unwrap();
    assert_eq!(sepolia.chain_id, Some(11155111));
    assert_eq!(sepolia.entry.block_confirmations(), 6);
    assert!(sepolia.entry.vrf.is_some());
    assert_eq!(file.resolve("31337").unwrap().entry.block_confirmations(), 1);
}

#[test]
fn shipped_harness_config_parses() {
    let cfg = HarnessConfig::load(&repo_file("config/harness.toml")).unwrap();
    assert_eq!(cfg.network, "hardhat");
    assert_eq!(cfg.devnet.accounts, 20);
    assert_eq!(cfg.deploy.tags, vec!["all".to_string()]);
    assert_eq!(cfg.metrics_addr.port(), 9464);
    assert_eq!(cfg.deploy.min_stake().unwrap(), ether(1));
    assert_eq!(cfg.deploy.subscription_fund().unwrap(), ether(1));
}

#[test]
fn deploy_amounts_accept_decimal_ether() {
    let raw = "[deploy]\nmin_stake_ether = \"0.25\"\nsubscription_fund_ether = \"1e3\"";
    let cfg = HarnessConfig::from_toml_str(raw).unwrap();
    assert_eq!(cfg.deploy.min_stake().unwrap(), ether(1) / 4);
    assert_eq!(
        cfg.deploy.subscription_fund(),
        Err(ConfigError::InvalidAmount("1e3".to_string()))
    );
}

#[test]
fn partial_harness_config_takes_defaults() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "network = \"localhost\"\n[automation]\nblock_interval_ms = 0").unwrap();
    let cfg = HarnessConfig::load(f.path()).unwrap();
    let defaults = HarnessConfig::default();
    assert_eq!(cfg.network, "localhost");
    assert_eq!(cfg.automation.block_interval_ms, 0);
    assert_eq!(cfg.automation.keeper_interval_ms, defaults.automation.keeper_interval_ms);
    assert_eq!(cfg.devnet, defaults.devnet);

    assert!(matches!(
        HarnessConfig::from_toml_str("netwrok = \"x\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn malformed_tables_are_rejected() {
    let bad_id = "[default]\nname = \"hardhat\"\n[chains.sepolia]\nname = \"sepolia\"\n";
    assert_eq!(
        NetworkTable::from_toml_str(bad_id),
        Err(ConfigError::InvalidChainId("sepolia".to_string()))
    );

    let dup = "[default]\nname = \"hardhat\"\n[chains.1]\nname = \"hardhat\"\n";
    assert_eq!(
        NetworkTable::from_toml_str(dup),
        Err(ConfigError::DuplicateNetwork("hardhat".to_string()))
    );

    let bad_hash = r#"
[default]
name = "hardhat"
[chains.1]
name = "mainnet"
[chains.1.vrf]
subscription_id = 1
vrf_coordinator = "0x00"
key_hash = "0x00"
"#;
    assert!(matches!(NetworkTable::from_toml_str(bad_hash), Err(ConfigError::Parse(_))));
}

// The only test in this binary that touches the process-wide table.
#[test]
fn first_install_wins() {
    let raw = r#"
development_chains = ["devchain"]
[default]
name = "devchain"
[chains.777]
name = "custom"
"#;
    install_network_table(NetworkTable::from_toml_str(raw).unwrap()).unwrap();
    assert_eq!(network_table().by_chain_id(777).unwrap().name, "custom");
    assert!(network_table().by_chain_id(31337).is_none());
    assert!(network_table().is_development("devchain"));

    assert_eq!(
        install_network_table(NetworkTable::builtin()),
        Err(ConfigError::AlreadyInstalled)
    );
    assert_eq!(network_table().by_chain_id(777).unwrap().name, "custom");
}
