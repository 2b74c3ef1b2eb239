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

use lottery_harness::core::lottery::{LotteryError, LotteryParams, LotteryState, RoundManager};
use lottery_harness::core::oracle::{OracleError, RandomnessOracle, RandomnessRequest};
use lottery_harness::core::runtime::chain::{CallContext, Log};
use lottery_harness::core::types::{Address, RequestId, Wei, H256};
use proptest::prelude::*;

const START: u64 = 1_000_000;
const MIN_STAKE: Wei = 1_000;

struct CountingOracle {
    next: RequestId,
}

impl RandomnessOracle for CountingOracle {
    fn address(&self) -> Address {
        Address::dev_account(99)
    }

    fn request_random_words(
        &mut self,
        _ctx: &CallContext,
        _request: RandomnessRequest,
        _logs: &mut Vec<Log>,
    ) -> Result<RequestId, OracleError> {
        self.next += 1;
        Ok(self.next)
    }
}

fn lottery(duration: u64) -> RoundManager {
    let params = LotteryParams {
        min_stake: MIN_STAKE,
        subscription_id: 1,
        coordinator: Address::dev_account(99),
        key_hash: H256::ZERO,
        event_duration: duration,
        recovery_delay: 60,
    };
    RoundManager::new(Address::dev_account(50), Address::dev_account(0), params, START)
}

fn ctx(sender: Address, value: Wei, timestamp: u64) -> CallContext {
    CallContext {
        sender,
        value,
        timestamp,
        block_number: 1,
    }
}

proptest! {
    #[test]
    fn prop_players_follow_stake_order(
        stakes in prop::collection::vec((0u32..20, MIN_STAKE..MIN_STAKE * 10), 0..40)
    ) {
        let mut l = lottery(240);
        let mut logs = Vec::new();
        let mut expected = Vec::new();
        for (i, (who, amount)) in stakes.iter().enumerate() {
            let a = Address::dev_account(*who);
            l.stake(&ctx(a, *amount, START + i as u64), &mut logs).unwrap();
            expected.push(a);
        }
        prop_assert_eq!(l.players(), expected.as_slice());
        prop_assert_eq!(logs.len(), expected.len());
    }

    #[test]
    fn prop_check_upkeep_matches_conditions(
        duration in 1u64..10_000,
        elapsed in 0u64..20_000,
        players in 0usize..5,
        balance in 0u128..10,
    ) {
        let mut l = lottery(duration);
        let mut logs = Vec::new();
        for i in 0..players {
            l.stake(&ctx(Address::dev_account(i as u32), MIN_STAKE, START), &mut logs).unwrap();
        }
        let now = START + elapsed;
        let needed = l.check_upkeep(now, balance);
        prop_assert_eq!(needed, players > 0 && elapsed >= duration && balance > 0);
        if players == 0 || elapsed < duration {
            prop_assert!(!needed);
        }
    }

    #[test]
    fn prop_perform_upkeep_only_when_needed(
        duration in 1u64..1_000,
        elapsed in 0u64..2_000,
        players in 0usize..4,
    ) {
        let mut l = lottery(duration);
        let mut logs = Vec::new();
        for i in 0..players {
            l.stake(&ctx(Address::dev_account(i as u32), MIN_STAKE, START), &mut logs).unwrap();
        }
        let balance = MIN_STAKE * players as Wei;
        let now = START + elapsed;
        let needed = l.check_upkeep(now, balance);
        let mut oracle = CountingOracle { next: 0 };
        let keeper = ctx(Address::dev_account(7), 0, now);
        let res = l.perform_upkeep(&keeper, balance, &mut oracle, &mut logs);
        if needed {
            prop_assert_eq!(res, Ok(1));
            prop_assert_eq!(l.state(), LotteryState::Calculating);
            // Closed rounds refuse both upkeep and new stakes.
            prop_assert!(!l.check_upkeep(now + duration, balance));
            prop_assert_eq!(
                l.stake(&ctx(Address::dev_account(1), MIN_STAKE, now), &mut logs),
                Err(LotteryError::StakingNotOpen)
            );
        } else {
            let is_upkeep_not_needed = matches!(res, Err(LotteryError::UpkeepNotNeeded { .. }));
            prop_assert!(is_upkeep_not_needed);
            prop_assert_eq!(l.state(), LotteryState::Open);
            prop_assert_eq!(oracle.next, 0);
        }
    }

    #[test]
    fn prop_winner_index_is_word_mod_players(word in any::<u64>(), players in 1usize..30) {
        let idx = H256::from_u64(word).mod_usize(players).unwrap();
        prop_assert_eq!(idx as u64, word % players as u64);
    }
}
