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

//! `lottery-deploy <network> [tags] [store-dir]`
//!
//! Runs the deploy scripts selected by the comma-separated `tags` (default
//! `all`) against a fresh development chain configured as `network`, records
//! the deployments in `store-dir` and prints them.

use anyhow::{Context, Result};
use lottery_harness::core::config::{
    install_network_table, network_table, HarnessConfig, NetworkTable, ENV_CONFIG,
};
use lottery_harness::core::runtime::devnet::{Devnet, DevnetConfig};
use lottery_harness::core::state::persistent_state::DeploymentStore;
use lottery_harness::deploy::{DeployOptions, Deployer};
use lottery_harness::monitoring::logging;
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init(logging::json_requested());

    let mut args = std::env::args().skip(1);
    let network_arg = args
        .next()
        .context("usage: lottery-deploy <network> [tags] [store-dir]")?;
    let tags: Vec<String> = args
        .next()
        .unwrap_or_else(|| "all".to_string())
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let cfg = match std::env::var(ENV_CONFIG) {
        Ok(p) => HarnessConfig::load(&PathBuf::from(&p)).with_context(|| format!("loading {p}"))?,
        Err(_) => HarnessConfig::default(),
    };
    let store_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.deploy.store_dir.clone());
    if let Some(f) = &cfg.networks_file {
        install_network_table(NetworkTable::load(f)?)?;
    }

    let network = network_table().resolve(&network_arg)?;
    let store = DeploymentStore::open(&store_dir)?;
    let devnet = Devnet::new(DevnetConfig {
        accounts: cfg.devnet.accounts,
        initial_balance: cfg.devnet.initial_balance(),
        genesis_timestamp: cfg.devnet.genesis_timestamp,
    });
    let opts = DeployOptions {
        recovery_delay: cfg.deploy.recovery_delay_secs,
        min_stake: cfg.deploy.min_stake()?,
        subscription_fund: cfg.deploy.subscription_fund()?,
    };
    let mut deployer = Deployer::new(devnet, network.clone(), opts)?.with_store(store.clone());
    deployer.run(tags.as_slice())?;
    store.flush()?;

    for rec in store.list(&network.entry.name)? {
        println!("{}\t{}\t[{}]", rec.name, rec.address, rec.args.join(", "));
    }
    Ok(())
}
