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

use lottery_harness::core::config::{network_table, NetworkTable};
use lottery_harness::core::runtime::devnet::{
    Devnet, DevnetConfig, AGGREGATOR_NAME, COORDINATOR_NAME, LOTTERY_NAME,
};
use lottery_harness::core::types::{ether, Address, H256};
use lottery_harness::deploy::scripts::{DEV_KEY_HASH, EVENT_DURATION};
use lottery_harness::deploy::{DeployError, DeployOptions, Deployer, Verifier, VerifyError};
use std::sync::{Arc, Mutex};

const LIVE_TABLE: &str = r#"
development_chains = ["hardhat", "localhost"]

[default]
name = "hardhat"

[chains.11155111]
name = "sepolia"
block_confirmations = 6

[chains.11155111.vrf]
subscription_id = 42
vrf_coordinator = "0x8103b0a8a00be2ddc778e6e7eaa21791cd364625"
key_hash = "0x474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c"

[chains.5]
name = "goerli"
"#;

type Submissions = Arc<Mutex<Vec<(String, String, Address, Vec<String>)>>>;

struct RecordingVerifier {
    seen: Submissions,
}

impl Verifier for RecordingVerifier {
    fn verify(
        &mut self,
        network: &str,
        name: &str,
        address: &Address,
        args: &[String],
    ) -> Result<(), VerifyError> {
        self.seen
            .lock()
            .unwrap()
            .push((network.to_string(), name.to_string(), *address, args.to_vec()));
        Err(VerifyError::AlreadyVerified)
    }
}

fn dev_deployer() -> Deployer {
    let network = network_table().resolve("hardhat").unwrap();
    Deployer::new(Devnet::new(DevnetConfig::default()), network, DeployOptions::default()).unwrap()
}

#[test]
fn development_deploy_wires_mocks_and_subscription() {
    let mut d = dev_deployer();
    let ran = d.run(&["all"]).unwrap();
    assert_eq!(
        ran,
        vec!["00-deploy-vrf-coordinator-mock", "01-deploy-mock-aggregator", "02-deploy-lottery"]
    );

    let coordinator = d.address(COORDINATOR_NAME).unwrap();
    let lottery = d.address(LOTTERY_NAME).unwrap();
    assert_eq!(coordinator, Address::contract(&d.deployer(), 0));
    assert_eq!(d.devnet().contract_name(&coordinator), Some(COORDINATOR_NAME));

    let l = d.devnet().lottery(&lottery).unwrap();
    assert_eq!(l.min_stake(), ether(1));
    assert_eq!(l.event_duration(), EVENT_DURATION);
    assert_eq!(l.owner(), d.deployer());
    assert_eq!(l.params().coordinator, coordinator);
    assert_eq!(l.params().key_hash, DEV_KEY_HASH.parse::<H256>().unwrap());

    let c = d.devnet().coordinator(&coordinator).unwrap();
    let sub = c.subscription(l.params().subscription_id).unwrap();
    assert_eq!(sub.balance, ether(1));
    assert_eq!(sub.consumers, vec![lottery]);

    let agg = d.devnet().aggregator(&d.address(AGGREGATOR_NAME).unwrap()).unwrap();
    assert_eq!(agg.decimals(), 18);
    assert_eq!(agg.latest_answer().unwrap(), 207_810_000_000);
}

#[test]
fn tags_select_scripts() {
    let mut d = dev_deployer();
    assert_eq!(d.run(&["aggregator"]).unwrap(), vec!["01-deploy-mock-aggregator"]);
    assert!(d.address(COORDINATOR_NAME).is_err());

    // The lottery needs the coordinator mock on development chains.
    let err = d.run(&["lottery"]).unwrap_err();
    assert!(matches!(err, DeployError::NotDeployed(ref n) if n == COORDINATOR_NAME));
    assert!(d.run(&["unknown"]).unwrap().is_empty());
}

#[test]
fn aggregator_tag_accepts_both_spellings() {
    for tag in ["aggregator", "aggrigator"] {
        let mut d = dev_deployer();
        assert_eq!(d.run(&[tag]).unwrap(), vec!["01-deploy-mock-aggregator"]);
        assert!(d.address(AGGREGATOR_NAME).is_ok());
    }
}

#[test]
fn live_network_skips_mocks_and_verifies() {
    let table = NetworkTable::from_toml_str(LIVE_TABLE).unwrap();
    let network = table.resolve("sepolia").unwrap();
    assert!(!network.development);

    let seen: Submissions = Arc::default();
    let devnet = Devnet::new(DevnetConfig::default());
    let mut d = Deployer::new(devnet, network, DeployOptions::default())
        .unwrap()
        .with_verifier(Box::new(RecordingVerifier { seen: seen.clone() }));
    let head = d.devnet().head();
    assert_eq!(d.run(&["all"]).unwrap(), vec!["02-deploy-lottery"]);

    let lottery = d.address(LOTTERY_NAME).unwrap();
    let record = d.deployment(LOTTERY_NAME).unwrap().clone();
    let l = d.devnet().lottery(&lottery).unwrap();
    assert_eq!(l.min_stake(), 0);
    assert_eq!(l.params().subscription_id, 42);
    assert_eq!(
        l.params().coordinator,
        "0x8103b0a8a00be2ddc778e6e7eaa21791cd364625".parse::<Address>().unwrap()
    );

    // One block for the deployment plus five extra confirmations.
    assert_eq!(record.block_number, head.number + 1);
    assert_eq!(d.devnet().head().number, head.number + 6);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "sepolia");
    assert_eq!(seen[0].1, LOTTERY_NAME);
    assert_eq!(seen[0].2, lottery);
    assert_eq!(seen[0].3, record.args);
}

#[test]
fn live_network_without_vrf_parameters_fails() {
    let table = NetworkTable::from_toml_str(LIVE_TABLE).unwrap();
    let network = table.resolve("goerli").unwrap();
    let devnet = Devnet::new(DevnetConfig::default());
    let mut d = Deployer::new(devnet, network, DeployOptions::default()).unwrap();
    let err = d.run(&["all"]).unwrap_err();
    assert!(matches!(err, DeployError::MissingVrfParameters(ref n) if n == "goerli"));
}

#[test]
fn fixture_runs_scripts_once() {
    let mut d = dev_deployer();
    d.fixture(&["all"]).unwrap();
    let nonce = d.devnet().nonce_of(&d.deployer());
    let logs = d.devnet().logs().len();

    d.fixture(&["all"]).unwrap();
    assert_eq!(d.devnet().nonce_of(&d.deployer()), nonce);
    assert_eq!(d.devnet().logs().len(), logs);
}
