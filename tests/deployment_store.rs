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

use lottery_harness::core::config::network_table;
use lottery_harness::core::runtime::devnet::{
    Devnet, DevnetConfig, AGGREGATOR_NAME, COORDINATOR_NAME, LOTTERY_NAME,
};
use lottery_harness::core::state::persistent_state::{DeploymentRecord, DeploymentStore};
use lottery_harness::core::types::Address;
use lottery_harness::deploy::{DeployOptions, Deployer};

fn record(name: &str, nonce: u64) -> DeploymentRecord {
    DeploymentRecord {
        name: name.to_string(),
        address: Address::contract(&Address::dev_account(0), nonce),
        args: vec!["1".to_string(), "2".to_string()],
        deployer: Address::dev_account(0),
        block_number: nonce + 1,
    }
}

#[test]
fn records_are_scoped_per_network() {
    let dir = tempfile::tempdir().unwrap();
    let store = DeploymentStore::open(dir.path()).unwrap();

    store.record("hardhat", &record("Lottery", 2)).unwrap();
    store.record("hardhat", &record("MockV3Aggregator", 1)).unwrap();
    store.record("sepolia", &record("Lottery", 0)).unwrap();

    let names: Vec<String> = store.list("hardhat").unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Lottery".to_string(), "MockV3Aggregator".to_string()]);
    assert_eq!(store.get("sepolia", "Lottery").unwrap(), Some(record("Lottery", 0)));
    assert_eq!(store.get("sepolia", "MockV3Aggregator").unwrap(), None);

    // Redeploying replaces the record.
    store.record("hardhat", &record("Lottery", 7)).unwrap();
    assert_eq!(store.get("hardhat", "Lottery").unwrap().unwrap().block_number, 8);

    assert_eq!(store.reset("hardhat").unwrap(), 2);
    assert!(store.list("hardhat").unwrap().is_empty());
    assert_eq!(store.list("sepolia").unwrap().len(), 1);
}

#[test]
fn deployments_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let expected = {
        let store = DeploymentStore::open(dir.path()).unwrap();
        let network = network_table().resolve("hardhat").unwrap();
        let devnet = Devnet::new(DevnetConfig::default());
        let mut d = Deployer::new(devnet, network, DeployOptions::default())
            .unwrap()
            .with_store(store.clone());
        d.run(&["all"]).unwrap();
        store.flush().unwrap();
        let mut v: Vec<DeploymentRecord> = d.deployments().cloned().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    };

    let store = DeploymentStore::open(dir.path()).unwrap();
    let got = store.list("hardhat").unwrap();
    assert_eq!(got, expected);
    let names: Vec<&str> = got.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec![LOTTERY_NAME, AGGREGATOR_NAME, COORDINATOR_NAME]);
    assert_eq!(got[2].args, vec!["100000".to_string(), "100000".to_string()]);
}
