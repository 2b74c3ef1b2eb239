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

//! In-process development chain.
//!
//! Every state-changing call runs as a transaction: it mines one block
//! (automine), moves the attached value, runs the contract and commits. If
//! anything fails the whole world (ledger, contracts, logs, clock) is restored
//! and no block is mined. Committed randomness requests are forwarded to an
//! attached oracle service as one-shot notices.

use crate::core::lottery::round::{LotteryParams, RoundManager, UpkeepStatus};
use crate::core::lottery::LotteryError;
use crate::core::oracle::aggregator::{AggregatorError, MockV3Aggregator};
use crate::core::oracle::coordinator::{CoordinatorEvent, PreparedFulfillment, VrfCoordinatorMock};
use crate::core::oracle::OracleError;
use crate::core::runtime::chain::{
    AccountVault, BlockHeader, CallContext, ChainError, Event, LocalChain, Log,
};
use crate::core::types::{ether, Address, RequestId, SubscriptionId, Wei, H256};
use crate::monitoring::metrics::Metrics;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Devnet shared between async tasks; the lock serializes transactions.
pub type SharedDevnet = Arc<Mutex<Devnet>>;

/// Snapshot handle.
pub type SnapshotId = u64;

/// Contract name used for the coordinator mock in records and errors.
pub const COORDINATOR_NAME: &str = "VRFCoordinatorV2Mock";
/// Contract name used for the price feed mock.
pub const AGGREGATOR_NAME: &str = "MockV3Aggregator";
/// Contract name used for the lottery.
pub const LOTTERY_NAME: &str = "Lottery";

/// Devnet errors. Contract errors pass through unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DevnetError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Lottery(#[from] LotteryError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
    #[error("no {expected} at {address}")]
    NoContract {
        address: Address,
        expected: &'static str,
    },
}

/// Devnet parameters.
#[derive(Clone, Debug)]
pub struct DevnetConfig {
    /// Number of pre-funded development accounts.
    pub accounts: u32,
    /// Balance of each development account.
    pub initial_balance: Wei,
    /// Timestamp of block 0.
    pub genesis_timestamp: u64,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            accounts: 20,
            initial_balance: ether(10_000),
            genesis_timestamp: 1_700_000_000,
        }
    }
}

/// Deployed contract.
#[derive(Clone, Debug)]
pub enum Contract {
    /// VRF coordinator mock.
    Coordinator(VrfCoordinatorMock),
    /// Price feed mock.
    Aggregator(MockV3Aggregator),
    /// Lottery.
    Lottery(RoundManager),
}

impl Contract {
    /// Contract name.
    pub fn name(&self) -> &'static str {
        match self {
            Contract::Coordinator(_) => COORDINATOR_NAME,
            Contract::Aggregator(_) => AGGREGATOR_NAME,
            Contract::Lottery(_) => LOTTERY_NAME,
        }
    }
}

/// Randomness request committed on chain, forwarded to the oracle service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestNotice {
    /// Coordinator that holds the request.
    pub coordinator: Address,
    /// Request identifier.
    pub request_id: RequestId,
    /// Contract awaiting the answer.
    pub consumer: Address,
    /// Block that included the request.
    pub block_number: u64,
    /// Blocks to wait before answering.
    pub min_confirmations: u16,
}

/// Result of a committed transaction.
#[derive(Clone, Debug)]
pub struct Receipt<T> {
    /// Block that included the transaction.
    pub block: BlockHeader,
    /// Logs emitted by the transaction.
    pub logs: Vec<Log>,
    /// Return value.
    pub output: T,
}

#[derive(Clone, Debug)]
struct World {
    chain: LocalChain,
    contracts: BTreeMap<Address, Contract>,
}

fn lottery_mut<'a>(
    contracts: &'a mut BTreeMap<Address, Contract>,
    address: &Address,
) -> Result<&'a mut RoundManager, DevnetError> {
    match contracts.get_mut(address) {
        Some(Contract::Lottery(l)) => Ok(l),
        _ => Err(DevnetError::NoContract {
            address: *address,
            expected: LOTTERY_NAME,
        }),
    }
}

fn coordinator_mut<'a>(
    contracts: &'a mut BTreeMap<Address, Contract>,
    address: &Address,
) -> Result<&'a mut VrfCoordinatorMock, DevnetError> {
    match contracts.get_mut(address) {
        Some(Contract::Coordinator(c)) => Ok(c),
        _ => Err(DevnetError::NoContract {
            address: *address,
            expected: COORDINATOR_NAME,
        }),
    }
}

fn aggregator_mut<'a>(
    contracts: &'a mut BTreeMap<Address, Contract>,
    address: &Address,
) -> Result<&'a mut MockV3Aggregator, DevnetError> {
    match contracts.get_mut(address) {
        Some(Contract::Aggregator(a)) => Ok(a),
        _ => Err(DevnetError::NoContract {
            address: *address,
            expected: AGGREGATOR_NAME,
        }),
    }
}

/// Run the consumer callback of a fulfilment. Returns whether it succeeded;
/// a failed callback leaves the consumer, ledger and log untouched.
fn call_consumer(
    world: &mut World,
    ctx: &CallContext,
    consumer: Address,
    prepared: &PreparedFulfillment,
) -> bool {
    let World { chain, contracts } = world;
    let request_id = prepared.request.request_id;
    let lottery = match contracts.get_mut(&consumer) {
        Some(Contract::Lottery(l)) => l,
        _ => {
            warn!(%consumer, request_id, "fulfilment target is not a randomness consumer");
            return false;
        }
    };

    let backup = lottery.clone();
    let log_mark = chain.logs.len();
    let mut vault = AccountVault::new(&mut chain.ledger, consumer);
    let words = &prepared.words;
    match lottery.fulfill_random_words(ctx, request_id, words, &mut vault, &mut chain.logs) {
        Ok(draw) => {
            info!(
                round = draw.round,
                request_id,
                winner = %draw.winner,
                prize = %draw.prize,
                "winner picked"
            );
            true
        }
        Err(e) => {
            warn!(%consumer, request_id, error = %e, "consumer callback reverted");
            *lottery = backup;
            chain.logs.truncate(log_mark);
            false
        }
    }
}

/// In-process development chain with the lottery contracts.
pub struct Devnet {
    world: World,
    accounts: Vec<Address>,
    snapshots: Vec<(SnapshotId, World)>,
    next_snapshot: SnapshotId,
    notices: Option<mpsc::UnboundedSender<RequestNotice>>,
    metrics: Option<Arc<Metrics>>,
}

impl Devnet {
    /// Create a chain with pre-funded development accounts.
    pub fn new(cfg: DevnetConfig) -> Self {
        let mut chain = LocalChain::new(cfg.genesis_timestamp);
        let accounts: Vec<Address> = (0..cfg.accounts).map(Address::dev_account).collect();
        for a in accounts.iter() {
            chain.ledger.set_balance(*a, cfg.initial_balance);
        }
        Self {
            world: World {
                chain,
                contracts: BTreeMap::new(),
            },
            accounts,
            snapshots: Vec::new(),
            next_snapshot: 1,
            notices: None,
            metrics: None,
        }
    }

    /// Wrap into the shared handle used by async tasks.
    pub fn into_shared(self) -> SharedDevnet {
        Arc::new(Mutex::new(self))
    }

    /// Report committed activity to `metrics`.
    pub fn set_metrics(&mut self, metrics: Arc<Metrics>) {
        self.metrics = Some(metrics);
        self.sync_gauges();
    }

    /// Recompute gauges from the current world.
    fn sync_gauges(&self) {
        let Some(m) = &self.metrics else { return };
        let mut players = 0usize;
        let mut pending = 0usize;
        for c in self.world.contracts.values() {
            match c {
                Contract::Lottery(l) => players += l.number_of_players(),
                Contract::Coordinator(c) => pending += c.pending_requests().count(),
                Contract::Aggregator(_) => {}
            }
        }
        m.block_height.set(self.world.chain.head().number as i64);
        m.players.set(players as i64);
        m.oracle_pending_requests.set(pending as i64);
    }

    /// Start forwarding committed randomness requests. Replaces any previous subscriber.
    pub fn subscribe_requests(&mut self) -> mpsc::UnboundedReceiver<RequestNotice> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.notices = Some(tx);
        rx
    }

    /// Development accounts; index 0 is the deployer.
    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Latest mined block.
    pub fn head(&self) -> BlockHeader {
        self.world.chain.head()
    }

    /// Timestamp of the latest mined block.
    pub fn timestamp(&self) -> u64 {
        self.world.chain.head().timestamp
    }

    /// Balance of `a`.
    pub fn balance_of(&self, a: &Address) -> Wei {
        self.world.chain.ledger.balance_of(a)
    }

    /// Nonce of `a`.
    pub fn nonce_of(&self, a: &Address) -> u64 {
        self.world.chain.ledger.nonce_of(a)
    }

    /// Overwrite the balance of `a`.
    pub fn set_balance(&mut self, a: Address, balance: Wei) {
        self.world.chain.ledger.set_balance(a, balance);
    }

    /// Make `a` accept or reject incoming transfers.
    pub fn set_payable(&mut self, a: Address, payable: bool) {
        self.world.chain.ledger.set_payable(a, payable);
    }

    /// Every committed log, oldest first.
    pub fn logs(&self) -> &[Log] {
        &self.world.chain.logs
    }

    /// Shift the next block's timestamp forward by `secs`. Returns the accumulated offset.
    pub fn increase_time(&mut self, secs: u64) -> u64 {
        self.world.chain.increase_time(secs)
    }

    /// Mine an empty block.
    pub fn mine(&mut self) -> BlockHeader {
        let head = self.world.chain.mine();
        if let Some(m) = &self.metrics {
            m.block_height.set(head.number as i64);
        }
        head
    }

    /// Capture the full state.
    pub fn snapshot(&mut self) -> SnapshotId {
        let id = self.next_snapshot;
        self.next_snapshot = self.next_snapshot.saturating_add(1);
        self.snapshots.push((id, self.world.clone()));
        debug!(id, block = self.head().number, "snapshot taken");
        id
    }

    /// Restore snapshot `id`, discarding it and every later snapshot.
    /// Returns false if `id` is unknown.
    pub fn revert(&mut self, id: SnapshotId) -> bool {
        let Some(pos) = self.snapshots.iter().position(|(sid, _)| *sid == id) else {
            return false;
        };
        let (_, world) = self.snapshots.swap_remove(pos);
        self.snapshots.truncate(pos);
        self.world = world;
        self.sync_gauges();
        debug!(id, block = self.head().number, "reverted to snapshot");
        true
    }

    fn transact<T>(
        &mut self,
        from: Address,
        to: Address,
        value: Wei,
        f: impl FnOnce(&mut World, &CallContext) -> Result<T, DevnetError>,
    ) -> Result<Receipt<T>, DevnetError> {
        let checkpoint = self.world.clone();
        let log_mark = self.world.chain.logs.len();

        let block = self.world.chain.mine();
        self.world.chain.ledger.bump_nonce(&from);
        let ctx = CallContext {
            sender: from,
            value,
            timestamp: block.timestamp,
            block_number: block.number,
        };

        let result = match self.world.chain.ledger.transfer(&from, &to, value) {
            Ok(()) => f(&mut self.world, &ctx),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(output) => {
                let logs = self.world.chain.logs[log_mark..].to_vec();
                self.after_commit(block, &logs);
                Ok(Receipt {
                    block,
                    logs,
                    output,
                })
            }
            Err(e) => {
                self.world = checkpoint;
                if let Some(m) = &self.metrics {
                    m.transactions_reverted_total.inc();
                }
                debug!(%from, %to, error = %e, "transaction reverted");
                Err(e)
            }
        }
    }

    fn after_commit(&mut self, block: BlockHeader, logs: &[Log]) {
        if let Some(m) = &self.metrics {
            m.transactions_total.inc();
            m.observe_logs(logs);
        }
        self.sync_gauges();
        for log in logs {
            let Event::Coordinator(CoordinatorEvent::RandomWordsRequested {
                request_id,
                min_confirmations,
                sender,
                ..
            }) = &log.event
            else {
                continue;
            };
            let Some(tx) = &self.notices else { break };
            let notice = RequestNotice {
                coordinator: log.address,
                request_id: *request_id,
                consumer: *sender,
                block_number: log.block_number,
                min_confirmations: *min_confirmations,
            };
            if tx.send(notice).is_err() {
                warn!("oracle notice channel closed; stop forwarding requests");
                self.notices = None;
                break;
            }
        }
    }

    fn deploy(
        &mut self,
        from: Address,
        build: impl FnOnce(Address, &CallContext, &mut Vec<Log>) -> Contract,
    ) -> Result<Receipt<Address>, DevnetError> {
        let address = Address::contract(&from, self.nonce_of(&from));
        let receipt = self.transact(from, address, 0, |w, ctx| {
            let contract = build(address, ctx, &mut w.chain.logs);
            w.contracts.insert(address, contract);
            Ok(address)
        })?;
        if let Some(c) = self.world.contracts.get(&address) {
            info!(contract = c.name(), %address, block = receipt.block.number, "deployed");
        }
        Ok(receipt)
    }

    /// Deploy the VRF coordinator mock.
    pub fn deploy_vrf_coordinator_mock(
        &mut self,
        from: Address,
        base_fee: Wei,
        gas_price_link: Wei,
    ) -> Result<Receipt<Address>, DevnetError> {
        self.deploy(from, |address, _, _| {
            Contract::Coordinator(VrfCoordinatorMock::new(address, base_fee, gas_price_link))
        })
    }

    /// Deploy the price feed mock.
    pub fn deploy_mock_aggregator(
        &mut self,
        from: Address,
        decimals: u8,
        initial_answer: i128,
    ) -> Result<Receipt<Address>, DevnetError> {
        self.deploy(from, |address, ctx, logs| {
            let feed = MockV3Aggregator::new(address, decimals, initial_answer, ctx, logs);
            Contract::Aggregator(feed)
        })
    }

    /// Deploy the lottery; `from` becomes its owner.
    pub fn deploy_lottery(
        &mut self,
        from: Address,
        params: LotteryParams,
    ) -> Result<Receipt<Address>, DevnetError> {
        self.deploy(from, |address, ctx, _| {
            Contract::Lottery(RoundManager::new(address, ctx.sender, params, ctx.timestamp))
        })
    }

    /// Name of the contract at `address`, if any.
    pub fn contract_name(&self, address: &Address) -> Option<&'static str> {
        self.world.contracts.get(address).map(Contract::name)
    }

    /// Read-only view of a lottery.
    pub fn lottery(&self, address: &Address) -> Result<&RoundManager, DevnetError> {
        match self.world.contracts.get(address) {
            Some(Contract::Lottery(l)) => Ok(l),
            _ => Err(DevnetError::NoContract {
                address: *address,
                expected: LOTTERY_NAME,
            }),
        }
    }

    /// Read-only view of a coordinator mock.
    pub fn coordinator(&self, address: &Address) -> Result<&VrfCoordinatorMock, DevnetError> {
        match self.world.contracts.get(address) {
            Some(Contract::Coordinator(c)) => Ok(c),
            _ => Err(DevnetError::NoContract {
                address: *address,
                expected: COORDINATOR_NAME,
            }),
        }
    }

    /// Read-only view of a price feed mock.
    pub fn aggregator(&self, address: &Address) -> Result<&MockV3Aggregator, DevnetError> {
        match self.world.contracts.get(address) {
            Some(Contract::Aggregator(a)) => Ok(a),
            _ => Err(DevnetError::NoContract {
                address: *address,
                expected: AGGREGATOR_NAME,
            }),
        }
    }

    /// `createSubscription` on the coordinator mock.
    pub fn create_subscription(
        &mut self,
        coordinator: Address,
        from: Address,
    ) -> Result<Receipt<SubscriptionId>, DevnetError> {
        self.transact(from, coordinator, 0, |w, ctx| {
            let c = coordinator_mut(&mut w.contracts, &coordinator)?;
            Ok(c.create_subscription(ctx, &mut w.chain.logs))
        })
    }

    /// `fundSubscription` on the coordinator mock. Returns the new balance.
    pub fn fund_subscription(
        &mut self,
        coordinator: Address,
        from: Address,
        sub_id: SubscriptionId,
        amount: Wei,
    ) -> Result<Receipt<Wei>, DevnetError> {
        self.transact(from, coordinator, 0, |w, ctx| {
            let c = coordinator_mut(&mut w.contracts, &coordinator)?;
            Ok(c.fund_subscription(ctx, sub_id, amount, &mut w.chain.logs)?)
        })
    }

    /// `addConsumer` on the coordinator mock.
    pub fn add_consumer(
        &mut self,
        coordinator: Address,
        from: Address,
        sub_id: SubscriptionId,
        consumer: Address,
    ) -> Result<Receipt<()>, DevnetError> {
        self.transact(from, coordinator, 0, |w, ctx| {
            let c = coordinator_mut(&mut w.contracts, &coordinator)?;
            Ok(c.add_consumer(ctx, sub_id, consumer, &mut w.chain.logs)?)
        })
    }

    /// `removeConsumer` on the coordinator mock.
    pub fn remove_consumer(
        &mut self,
        coordinator: Address,
        from: Address,
        sub_id: SubscriptionId,
        consumer: Address,
    ) -> Result<Receipt<()>, DevnetError> {
        self.transact(from, coordinator, 0, |w, ctx| {
            let c = coordinator_mut(&mut w.contracts, &coordinator)?;
            Ok(c.remove_consumer(ctx, sub_id, consumer, &mut w.chain.logs)?)
        })
    }

    /// `cancelSubscription` on the coordinator mock. Returns the refunded balance.
    pub fn cancel_subscription(
        &mut self,
        coordinator: Address,
        from: Address,
        sub_id: SubscriptionId,
        to: Address,
    ) -> Result<Receipt<Wei>, DevnetError> {
        self.transact(from, coordinator, 0, |w, ctx| {
            let c = coordinator_mut(&mut w.contracts, &coordinator)?;
            Ok(c.cancel_subscription(ctx, sub_id, to, &mut w.chain.logs)?)
        })
    }

    /// `fulfillRandomWords(requestId, consumer)`. Returns whether the consumer callback succeeded.
    pub fn fulfill_random_words(
        &mut self,
        coordinator: Address,
        from: Address,
        request_id: RequestId,
        consumer: Address,
    ) -> Result<Receipt<bool>, DevnetError> {
        self.fulfill(coordinator, from, request_id, consumer, None)
    }

    /// `fulfillRandomWordsWithOverride(requestId, consumer, words)`.
    pub fn fulfill_random_words_with_override(
        &mut self,
        coordinator: Address,
        from: Address,
        request_id: RequestId,
        consumer: Address,
        words: Vec<H256>,
    ) -> Result<Receipt<bool>, DevnetError> {
        self.fulfill(coordinator, from, request_id, consumer, Some(words))
    }

    fn fulfill(
        &mut self,
        coordinator: Address,
        from: Address,
        request_id: RequestId,
        consumer: Address,
        words: Option<Vec<H256>>,
    ) -> Result<Receipt<bool>, DevnetError> {
        self.transact(from, coordinator, 0, |w, ctx| {
            let prepared = coordinator_mut(&mut w.contracts, &coordinator)?
                .begin_fulfillment(request_id, words)?;
            let success = call_consumer(w, &ctx.nested(coordinator), consumer, &prepared);
            let c = coordinator_mut(&mut w.contracts, &coordinator)?;
            c.finish_fulfillment(ctx, &prepared, success, &mut w.chain.logs);
            Ok(success)
        })
    }

    /// `startLottery` (owner only).
    pub fn start_lottery(
        &mut self,
        lottery: Address,
        from: Address,
    ) -> Result<Receipt<()>, DevnetError> {
        self.transact(from, lottery, 0, |w, ctx| {
            Ok(lottery_mut(&mut w.contracts, &lottery)?.start_lottery(ctx, &mut w.chain.logs)?)
        })
    }

    /// `stake{value}`.
    pub fn stake(
        &mut self,
        lottery: Address,
        from: Address,
        value: Wei,
    ) -> Result<Receipt<()>, DevnetError> {
        self.transact(from, lottery, value, |w, ctx| {
            Ok(lottery_mut(&mut w.contracts, &lottery)?.stake(ctx, &mut w.chain.logs)?)
        })
    }

    /// `checkUpkeep` evaluated against the pending block, where `perform_upkeep` would run.
    pub fn check_upkeep(&self, lottery: &Address) -> Result<bool, DevnetError> {
        Ok(self.upkeep_status(lottery)?.needed())
    }

    /// Per-condition upkeep gate against the pending block.
    pub fn upkeep_status(&self, lottery: &Address) -> Result<UpkeepStatus, DevnetError> {
        let l = self.lottery(lottery)?;
        Ok(l.upkeep_status(self.world.chain.pending_timestamp(), self.balance_of(lottery)))
    }

    /// `performUpkeep`. Returns the randomness request id.
    pub fn perform_upkeep(
        &mut self,
        lottery: Address,
        from: Address,
    ) -> Result<Receipt<RequestId>, DevnetError> {
        self.transact(from, lottery, 0, |w, ctx| {
            let balance = w.chain.ledger.balance_of(&lottery);
            let coordinator = lottery_mut(&mut w.contracts, &lottery)?.params().coordinator;
            // Take the lottery out so the coordinator can be borrowed alongside it.
            let mut l = match w.contracts.remove(&lottery) {
                Some(Contract::Lottery(l)) => l,
                _ => {
                    return Err(DevnetError::NoContract {
                        address: lottery,
                        expected: LOTTERY_NAME,
                    })
                }
            };
            let result = match coordinator_mut(&mut w.contracts, &coordinator) {
                Ok(c) => l
                    .perform_upkeep(ctx, balance, c, &mut w.chain.logs)
                    .map_err(DevnetError::from),
                Err(e) => Err(e),
            };
            w.contracts.insert(lottery, Contract::Lottery(l));
            result
        })
    }

    /// `recoverStuckRound` (owner only). Returns the abandoned request id.
    pub fn recover_stuck_round(
        &mut self,
        lottery: Address,
        from: Address,
    ) -> Result<Receipt<RequestId>, DevnetError> {
        self.transact(from, lottery, 0, |w, ctx| {
            let l = lottery_mut(&mut w.contracts, &lottery)?;
            Ok(l.recover_stuck_round(ctx, &mut w.chain.logs)?)
        })
    }

    /// `updateAnswer` on the price feed mock. Returns the new round id.
    pub fn update_answer(
        &mut self,
        aggregator: Address,
        from: Address,
        answer: i128,
    ) -> Result<Receipt<u64>, DevnetError> {
        self.transact(from, aggregator, 0, |w, ctx| {
            let feed = aggregator_mut(&mut w.contracts, &aggregator)?;
            Ok(feed.update_answer(ctx, answer, &mut w.chain.logs))
        })
    }

    /// `updateRoundData` on the price feed mock.
    pub fn update_round_data(
        &mut self,
        aggregator: Address,
        from: Address,
        round_id: u64,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) -> Result<Receipt<()>, DevnetError> {
        self.transact(from, aggregator, 0, |w, _| {
            let feed = aggregator_mut(&mut w.contracts, &aggregator)?;
            feed.update_round_data(round_id, answer, timestamp, started_at);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverted_transaction_mines_nothing() {
        let mut d = Devnet::new(DevnetConfig::default());
        let from = d.accounts()[1];
        let head = d.head();
        let nonce = d.nonce_of(&from);
        let err = d.stake(Address::dev_account(500), from, 1).unwrap_err();
        assert!(matches!(err, DevnetError::NoContract { .. }));
        assert_eq!(d.head(), head);
        assert_eq!(d.nonce_of(&from), nonce);
        assert_eq!(d.balance_of(&from), ether(10_000));
    }

    #[test]
    fn snapshot_revert_restores_and_discards_later_ids() {
        let mut d = Devnet::new(DevnetConfig::default());
        let deployer = d.accounts()[0];
        let s1 = d.snapshot();
        d.deploy_vrf_coordinator_mock(deployer, 1, 1).unwrap();
        let s2 = d.snapshot();
        d.increase_time(100);
        d.mine();

        assert!(d.revert(s1));
        assert_eq!(d.head().number, 0);
        assert!(d.logs().is_empty());
        assert_eq!(d.nonce_of(&deployer), 0);
        assert!(!d.revert(s2));
        assert!(!d.revert(s1));
    }
}
