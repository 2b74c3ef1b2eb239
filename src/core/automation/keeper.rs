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

//! Upkeep keeper and interval miner.
//!
//! The keeper polls `checkUpkeep` and submits `performUpkeep` when the gate is
//! open. A failed upkeep is logged; the next tick simply tries again.

use crate::core::runtime::devnet::{DevnetError, SharedDevnet};
use crate::core::types::{Address, RequestId};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Upkeep automation for one lottery.
#[derive(Clone)]
pub struct Keeper {
    devnet: SharedDevnet,
    lottery: Address,
    account: Address,
}

impl Keeper {
    /// Keeper for `lottery`, submitting transactions from `account`.
    pub fn new(devnet: SharedDevnet, lottery: Address, account: Address) -> Self {
        Self {
            devnet,
            lottery,
            account,
        }
    }

    /// Lottery watched by this keeper.
    pub fn lottery(&self) -> Address {
        self.lottery
    }

    /// One check/act cycle. Returns the request id when an upkeep was performed.
    pub async fn tick(&self) -> Result<Option<RequestId>, DevnetError> {
        let mut devnet = self.devnet.lock().await;
        let status = devnet.upkeep_status(&self.lottery)?;
        if !status.needed() {
            debug!(lottery = %self.lottery, ?status, "upkeep not needed");
            return Ok(None);
        }
        let receipt = devnet.perform_upkeep(self.lottery, self.account)?;
        info!(
            lottery = %self.lottery,
            request_id = receipt.output,
            block = receipt.block.number,
            "upkeep performed"
        );
        Ok(Some(receipt.output))
    }
}

/// Run `keeper` every `period` until the task is aborted.
pub fn spawn_keeper(keeper: Keeper, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = keeper.tick().await {
                warn!(lottery = %keeper.lottery, error = %e, "upkeep failed; retrying next tick");
            }
        }
    })
}

/// Mine an empty block every `period` so the clock and confirmations advance.
pub fn spawn_miner(devnet: SharedDevnet, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let head = devnet.lock().await.mine();
            debug!(block = head.number, timestamp = head.timestamp, "mined interval block");
        }
    })
}
