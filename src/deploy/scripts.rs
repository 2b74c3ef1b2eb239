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
#![warn(missing_docs)]

//! Tagged deploy scripts and fixtures.
//!
//! Scripts run in id order. A script runs when one of its tags was requested;
//! mock scripts only run on development chains. On development chains the
//! lottery gets a fresh, funded coordinator subscription and is registered as
//! its consumer; on live networks the oracle parameters come from the network
//! table and each deployment is submitted for verification.

use crate::core::config::ResolvedNetwork;
use crate::core::lottery::round::LotteryParams;
use crate::core::runtime::devnet::{
    Devnet, DevnetError, Receipt, SnapshotId, AGGREGATOR_NAME, COORDINATOR_NAME, LOTTERY_NAME,
};
use crate::core::state::persistent_state::{DeploymentRecord, DeploymentStore, StoreError};
use crate::core::types::{ether, Address, Wei, H256};
use crate::deploy::verify::{LogVerifier, Verifier, VerifyError};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Coordinator mock base fee.
pub const COORDINATOR_BASE_FEE: Wei = 100_000;
/// Coordinator mock gas price in LINK.
pub const COORDINATOR_GAS_PRICE_LINK: Wei = 100_000;
/// Price feed mock decimals.
pub const AGGREGATOR_DECIMALS: u8 = 18;
/// Price feed mock initial answer.
pub const AGGREGATOR_INITIAL_ANSWER: i128 = 207_810_000_000;
/// Round length in seconds.
pub const EVENT_DURATION: u64 = 60 * 4;
/// Gas lane used with the coordinator mock.
pub const DEV_KEY_HASH: &str = "0xd89b2bf150e3b9e13446986e571fb9cab24b13cea0a43ea20a6049a85cc807cc";

/// Deployment errors.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Devnet(#[from] DevnetError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no VRF parameters for network {0}")]
    MissingVrfParameters(String),
    #[error("{0} is not deployed")]
    NotDeployed(String),
    #[error("invalid key hash")]
    InvalidKeyHash,
    #[error("devnet has no accounts")]
    NoDeployer,
}

/// Deployment knobs not covered by the network table.
#[derive(Clone, Copy, Debug)]
pub struct DeployOptions {
    /// Seconds after a randomness request before the owner may recover the round.
    pub recovery_delay: u64,
    /// Minimum stake on development chains. Live deployments use zero.
    pub min_stake: Wei,
    /// Amount credited to the development subscription.
    pub subscription_fund: Wei,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            recovery_delay: 3_600,
            min_stake: ether(1),
            subscription_fund: ether(1),
        }
    }
}

/// One deploy script.
pub struct DeployScript {
    /// Script id; scripts run in this order.
    pub id: &'static str,
    /// Tags selecting the script.
    pub tags: &'static [&'static str],
    /// Deploys a mock; skipped on live networks.
    pub mock: bool,
    run: fn(&mut Deployer) -> Result<(), DeployError>,
}

/// Every script, in run order.
pub const SCRIPTS: &[DeployScript] = &[
    DeployScript {
        id: "00-deploy-vrf-coordinator-mock",
        tags: &["all", "coordinator"],
        mock: true,
        run: deploy_vrf_coordinator_mock,
    },
    DeployScript {
        id: "01-deploy-mock-aggregator",
        // "aggrigator" is the spelling older fixtures select.
        tags: &["all", "aggregator", "aggrigator"],
        mock: true,
        run: deploy_mock_aggregator,
    },
    DeployScript {
        id: "02-deploy-lottery",
        tags: &["all", "lottery"],
        mock: false,
        run: deploy_lottery,
    },
];

fn deploy_vrf_coordinator_mock(d: &mut Deployer) -> Result<(), DeployError> {
    let receipt = d.devnet.deploy_vrf_coordinator_mock(
        d.deployer,
        COORDINATOR_BASE_FEE,
        COORDINATOR_GAS_PRICE_LINK,
    )?;
    let args = vec![
        COORDINATOR_BASE_FEE.to_string(),
        COORDINATOR_GAS_PRICE_LINK.to_string(),
    ];
    d.finish(COORDINATOR_NAME, receipt, args)?;
    Ok(())
}

fn deploy_mock_aggregator(d: &mut Deployer) -> Result<(), DeployError> {
    let receipt = d.devnet.deploy_mock_aggregator(
        d.deployer,
        AGGREGATOR_DECIMALS,
        AGGREGATOR_INITIAL_ANSWER,
    )?;
    let args = vec![
        AGGREGATOR_DECIMALS.to_string(),
        AGGREGATOR_INITIAL_ANSWER.to_string(),
    ];
    d.finish(AGGREGATOR_NAME, receipt, args)?;
    Ok(())
}

fn deploy_lottery(d: &mut Deployer) -> Result<(), DeployError> {
    let from = d.deployer;
    if !d.network.development {
        let vrf = d
            .network
            .entry
            .vrf
            .clone()
            .ok_or_else(|| DeployError::MissingVrfParameters(d.network.entry.name.clone()))?;
        let params = LotteryParams {
            min_stake: 0,
            subscription_id: vrf.subscription_id,
            coordinator: vrf.vrf_coordinator,
            key_hash: vrf.key_hash,
            event_duration: EVENT_DURATION,
            recovery_delay: d.opts.recovery_delay,
        };
        let args = params.constructor_args();
        let receipt = d.devnet.deploy_lottery(from, params)?;
        d.finish(LOTTERY_NAME, receipt, args)?;
        return Ok(());
    }

    let coordinator = d.address(COORDINATOR_NAME)?;
    let key_hash: H256 = DEV_KEY_HASH.parse().map_err(|_| DeployError::InvalidKeyHash)?;
    let sub_id = d.devnet.create_subscription(coordinator, from)?.output;
    d.devnet
        .fund_subscription(coordinator, from, sub_id, d.opts.subscription_fund)?;
    debug!(sub_id, %coordinator, "subscription created and funded");

    let params = LotteryParams {
        min_stake: d.opts.min_stake,
        subscription_id: sub_id,
        coordinator,
        key_hash,
        event_duration: EVENT_DURATION,
        recovery_delay: d.opts.recovery_delay,
    };
    let args = params.constructor_args();
    let receipt = d.devnet.deploy_lottery(from, params)?;
    let lottery = d.finish(LOTTERY_NAME, receipt, args)?;
    d.devnet.add_consumer(coordinator, from, sub_id, lottery)?;
    info!(sub_id, consumer = %lottery, "lottery registered as consumer");
    Ok(())
}

/// Runs deploy scripts against a devnet and keeps the resulting records.
pub struct Deployer {
    devnet: Devnet,
    network: ResolvedNetwork,
    deployer: Address,
    opts: DeployOptions,
    store: Option<DeploymentStore>,
    verifier: Box<dyn Verifier + Send>,
    deployments: BTreeMap<String, DeploymentRecord>,
    fixtures: BTreeMap<Vec<String>, (SnapshotId, BTreeMap<String, DeploymentRecord>)>,
}

impl Deployer {
    /// Deployer for `network`; development account 0 deploys.
    pub fn new(
        devnet: Devnet,
        network: ResolvedNetwork,
        opts: DeployOptions,
    ) -> Result<Self, DeployError> {
        let deployer = *devnet.accounts().first().ok_or(DeployError::NoDeployer)?;
        Ok(Self {
            devnet,
            network,
            deployer,
            opts,
            store: None,
            verifier: Box::new(LogVerifier),
            deployments: BTreeMap::new(),
            fixtures: BTreeMap::new(),
        })
    }

    /// Persist every deployment into `store`.
    pub fn with_store(mut self, store: DeploymentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `verifier` on live networks.
    pub fn with_verifier(mut self, verifier: Box<dyn Verifier + Send>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Run every script selected by `tags`. Returns the ids that ran.
    pub fn run<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<Vec<&'static str>, DeployError> {
        let mut ran = Vec::new();
        for script in SCRIPTS {
            if !script.tags.iter().any(|t| tags.iter().any(|s| s.as_ref() == *t)) {
                continue;
            }
            if script.mock && !self.network.development {
                info!(
                    script = script.id,
                    network = %self.network.entry.name,
                    "live network; skipping mock"
                );
                continue;
            }
            info!(script = script.id, network = %self.network.entry.name, "running deploy script");
            (script.run)(self)?;
            ran.push(script.id);
        }
        Ok(ran)
    }

    /// Deploy once, then restore the same state on every later call with the same tags.
    pub fn fixture<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<(), DeployError> {
        let mut key: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        key.sort();
        key.dedup();

        if let Some((id, saved)) = self.fixtures.remove(&key) {
            if self.devnet.revert(id) {
                let id = self.devnet.snapshot();
                self.deployments = saved.clone();
                self.fixtures.insert(key, (id, saved));
                debug!(snapshot = id, "fixture restored");
                return Ok(());
            }
            debug!(snapshot = id, "fixture snapshot gone; redeploying");
        }

        self.run(key.as_slice())?;
        let id = self.devnet.snapshot();
        self.fixtures.insert(key, (id, self.deployments.clone()));
        Ok(())
    }

    fn finish(
        &mut self,
        name: &'static str,
        receipt: Receipt<Address>,
        args: Vec<String>,
    ) -> Result<Address, DeployError> {
        let address = receipt.output;
        let extra = self.network.entry.block_confirmations().saturating_sub(1);
        for _ in 0..extra {
            self.devnet.mine();
        }

        let record = DeploymentRecord {
            name: name.to_string(),
            address,
            args,
            deployer: self.deployer,
            block_number: receipt.block.number,
        };
        if let Some(store) = &self.store {
            store.record(&self.network.entry.name, &record)?;
        }
        info!(
            contract = name,
            %address,
            block = receipt.block.number,
            confirmations = extra + 1,
            "deployment recorded"
        );

        if !self.network.development {
            match self
                .verifier
                .verify(&self.network.entry.name, name, &address, &record.args)
            {
                Ok(()) => info!(contract = name, %address, "verified"),
                Err(VerifyError::AlreadyVerified) => {
                    info!(contract = name, %address, "already verified")
                }
                Err(e) => warn!(contract = name, %address, error = %e, "verification failed"),
            }
        }

        self.deployments.insert(name.to_string(), record);
        Ok(address)
    }

    /// Address of the deployed `name`.
    pub fn address(&self, name: &str) -> Result<Address, DeployError> {
        self.deployments
            .get(name)
            .map(|r| r.address)
            .ok_or_else(|| DeployError::NotDeployed(name.to_string()))
    }

    /// Record of the deployed `name`.
    pub fn deployment(&self, name: &str) -> Option<&DeploymentRecord> {
        self.deployments.get(name)
    }

    /// Every deployment, by name.
    pub fn deployments(&self) -> impl Iterator<Item = &DeploymentRecord> {
        self.deployments.values()
    }

    /// Deploying account.
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    /// Target network.
    pub fn network(&self) -> &ResolvedNetwork {
        &self.network
    }

    /// Underlying devnet.
    pub fn devnet(&self) -> &Devnet {
        &self.devnet
    }

    /// Underlying devnet, mutable.
    pub fn devnet_mut(&mut self) -> &mut Devnet {
        &mut self.devnet
    }

    /// Hand the devnet over (e.g. to share it with the node's tasks).
    pub fn into_devnet(self) -> Devnet {
        self.devnet
    }
}
