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

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lottery_harness::core::config::network_table;
use lottery_harness::core::lottery::LotteryState;
use lottery_harness::core::runtime::devnet::{Devnet, DevnetConfig, COORDINATOR_NAME, LOTTERY_NAME};
use lottery_harness::core::types::{Wei, H256};
use lottery_harness::deploy::{DeployOptions, Deployer};

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Stake { who: u8, extra: u16 },
    Warp(u16),
    Perform { who: u8 },
    Fulfill { who: u8, word: Option<u64> },
    Recover { who: u8 },
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(network) = network_table().resolve("hardhat") else { return };
    let cfg = DevnetConfig {
        accounts: 8,
        ..DevnetConfig::default()
    };
    let opts = DeployOptions {
        recovery_delay: 600,
        ..DeployOptions::default()
    };
    let Ok(mut d) = Deployer::new(Devnet::new(cfg), network, opts) else { return };
    if d.run(&["all"]).is_err() {
        return;
    }
    let (Ok(lottery), Ok(coordinator)) = (d.address(LOTTERY_NAME), d.address(COORDINATOR_NAME))
    else {
        return;
    };
    let owner = d.deployer();
    let accounts = d.devnet().accounts().to_vec();
    let dev = d.devnet_mut();
    if dev.start_lottery(lottery, owner).is_err() {
        return;
    }
    let pick = |i: u8| accounts[i as usize % accounts.len()];
    let min_stake = match dev.lottery(&lottery) {
        Ok(l) => l.min_stake(),
        Err(_) => return,
    };
    let mut pot: Wei = 0;

    for op in ops.into_iter().take(64) {
        let head = dev.head().number;
        let ok = match op {
            Op::Stake { who, extra } => {
                let value = min_stake + Wei::from(extra);
                let ok = dev.stake(lottery, pick(who), value).is_ok();
                if ok {
                    pot += value;
                }
                ok
            }
            Op::Warp(secs) => {
                dev.increase_time(u64::from(secs));
                dev.mine();
                continue;
            }
            Op::Perform { who } => dev.perform_upkeep(lottery, pick(who)).is_ok(),
            Op::Fulfill { who, word } => {
                let pending = dev.lottery(&lottery).ok().and_then(|l| l.pending_request_id());
                let Some(id) = pending else { continue };
                let res = match word {
                    Some(w) => {
                        let (from, words) = (pick(who), vec![H256::from_u64(w)]);
                        dev.fulfill_random_words_with_override(
                            coordinator,
                            from,
                            id,
                            lottery,
                            words,
                        )
                    }
                    None => dev.fulfill_random_words(coordinator, pick(who), id, lottery),
                };
                match res {
                    Ok(r) => {
                        assert!(r.output, "payout to an externally owned account failed");
                        pot = 0;
                        true
                    }
                    Err(_) => false,
                }
            }
            Op::Recover { who } => dev.recover_stuck_round(lottery, pick(who)).is_ok(),
        };

        // Reverted calls never mine.
        if !ok {
            assert_eq!(dev.head().number, head);
        }
        let Ok(l) = dev.lottery(&lottery) else { return };
        assert_eq!(l.state() == LotteryState::Calculating, l.pending_request_id().is_some());
        assert_eq!(dev.balance_of(&lottery), pot);
        if l.number_of_players() == 0 {
            assert_eq!(pot, 0);
        }
    }
});
