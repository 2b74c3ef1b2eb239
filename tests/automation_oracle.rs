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

use lottery_harness::core::automation::{spawn_keeper, spawn_miner, Keeper};
use lottery_harness::core::config::network_table;
use lottery_harness::core::lottery::LotteryState;
use lottery_harness::core::oracle::service::{
    spawn_oracle_service, Fulfillment, OracleConfig, OracleService,
};
use lottery_harness::core::runtime::devnet::{Devnet, DevnetConfig, COORDINATOR_NAME, LOTTERY_NAME};
use lottery_harness::core::types::{ether, Address};
use lottery_harness::deploy::{DeployOptions, Deployer};
use lottery_harness::monitoring::metrics::Metrics;
use std::sync::Arc;
use std::time::Duration;

fn fast() -> OracleConfig {
    OracleConfig {
        poll_interval: Duration::from_millis(5),
    }
}

/// Deployed devnet with two players staked and the round time elapsed.
fn ready_round() -> (Deployer, Address, Address) {
    let network = network_table().resolve("hardhat").unwrap();
    let devnet = Devnet::new(DevnetConfig::default());
    let mut d = Deployer::new(devnet, network, DeployOptions::default()).unwrap();
    d.run(&["all"]).unwrap();
    let lottery = d.address(LOTTERY_NAME).unwrap();
    let coordinator = d.address(COORDINATOR_NAME).unwrap();
    let accounts = d.devnet().accounts().to_vec();
    d.devnet_mut().stake(lottery, accounts[1], ether(1)).unwrap();
    d.devnet_mut().stake(lottery, accounts[2], ether(1)).unwrap();
    let duration = d.devnet().lottery(&lottery).unwrap().event_duration();
    d.devnet_mut().increase_time(duration + 1);
    d.devnet_mut().mine();
    (d, lottery, coordinator)
}

#[tokio::test]
async fn keeper_performs_upkeep_once_per_round() {
    let (d, lottery, _) = ready_round();
    let keeper_account = d.devnet().accounts()[3];
    let shared = d.into_devnet().into_shared();
    let keeper = Keeper::new(shared.clone(), lottery, keeper_account);

    assert_eq!(keeper.tick().await.unwrap(), Some(1));
    assert_eq!(keeper.tick().await.unwrap(), None);
    assert_eq!(
        shared.lock().await.lottery(&lottery).unwrap().state(),
        LotteryState::Calculating
    );
}

#[tokio::test]
async fn oracle_waits_for_confirmations_then_answers() {
    let (mut d, lottery, coordinator) = ready_round();
    let mut notices = d.devnet_mut().subscribe_requests();
    let keeper_account = d.devnet().accounts()[3];
    let oracle_account = d.devnet().accounts()[4];
    let shared = d.into_devnet().into_shared();

    Keeper::new(shared.clone(), lottery, keeper_account).tick().await.unwrap();
    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.request_id, 1);
    assert_eq!(notice.consumer, lottery);
    assert_eq!(notice.coordinator, coordinator);
    assert_eq!(notice.min_confirmations, 3);
    assert_eq!(OracleService::ready_at(&notice), notice.block_number + 3);

    let svc = OracleService::new(shared.clone(), oracle_account, fast());
    let miner = spawn_miner(shared.clone(), Duration::from_millis(5));
    let out = tokio::time::timeout(Duration::from_secs(10), svc.handle(notice.clone()))
        .await
        .unwrap()
        .unwrap();
    miner.abort();
    assert_eq!(out, Fulfillment::Delivered { success: true });

    {
        let dev = shared.lock().await;
        assert!(dev.head().number >= OracleService::ready_at(&notice) + 1);
        let l = dev.lottery(&lottery).unwrap();
        assert_eq!(l.state(), LotteryState::Open);
        assert_eq!(l.rounds_resolved(), 1);
    }

    // A second answer for the same id is dropped, not an error.
    assert_eq!(svc.handle(notice).await.unwrap(), Fulfillment::Dropped);
}

#[tokio::test]
async fn spawned_tasks_resolve_a_round_end_to_end() {
    let (mut d, lottery, _) = ready_round();
    let metrics = Arc::new(Metrics::new().unwrap());
    d.devnet_mut().set_metrics(metrics.clone());
    let notices = d.devnet_mut().subscribe_requests();
    let keeper_account = d.devnet().accounts()[3];
    let oracle_account = d.devnet().accounts()[4];
    let shared = d.into_devnet().into_shared();

    let keeper = spawn_keeper(
        Keeper::new(shared.clone(), lottery, keeper_account),
        Duration::from_millis(5),
    );
    let service = OracleService::new(shared.clone(), oracle_account, fast());
    let oracle = spawn_oracle_service(service, notices);
    let miner = spawn_miner(shared.clone(), Duration::from_millis(5));

    let resolved = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if shared.lock().await.lottery(&lottery).unwrap().rounds_resolved() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    keeper.abort();
    oracle.abort();
    miner.abort();
    assert!(resolved.is_ok(), "round was not resolved in time");

    assert_eq!(metrics.rounds_resolved_total.get(), 1);
    assert_eq!(metrics.upkeeps_total.get(), 1);
    assert_eq!(metrics.oracle_pending_requests.get(), 0);
    let text = metrics.render().unwrap();
    assert!(text.contains("lottery_rounds_resolved_total 1"));
}
