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

//! Simulated chain state: block clock, account ledger and event log.
//!
//! Everything here is plain data so the whole chain can be cloned for
//! transaction rollback and snapshots.

use crate::core::lottery::round::{LotteryEvent, PayoutError, Vault};
use crate::core::oracle::aggregator::AggregatorEvent;
use crate::core::oracle::coordinator::CoordinatorEvent;
use crate::core::types::{Address, Wei};
use std::collections::BTreeMap;
use thiserror::Error;

/// Ledger errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("insufficient funds: {account} has {balance}, needs {needed}")]
    InsufficientFunds {
        account: Address,
        balance: Wei,
        needed: Wei,
    },
    #[error("transfer rejected by {0}")]
    TransferRejected(Address),
    #[error("balance overflow")]
    Overflow,
}

/// Execution context of a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller (`msg.sender`).
    pub sender: Address,
    /// Attached value (`msg.value`).
    pub value: Wei,
    /// Timestamp of the block executing the call.
    pub timestamp: u64,
    /// Number of the block executing the call.
    pub block_number: u64,
}

impl CallContext {
    /// Same block, different caller and no value (nested call).
    pub fn nested(&self, sender: Address) -> Self {
        Self {
            sender,
            value: 0,
            ..*self
        }
    }
}

/// Typed contract event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Emitted by the lottery.
    Lottery(LotteryEvent),
    /// Emitted by the VRF coordinator mock.
    Coordinator(CoordinatorEvent),
    /// Emitted by the price feed mock.
    Aggregator(AggregatorEvent),
}

impl From<LotteryEvent> for Event {
    fn from(e: LotteryEvent) -> Self {
        Event::Lottery(e)
    }
}

impl From<CoordinatorEvent> for Event {
    fn from(e: CoordinatorEvent) -> Self {
        Event::Coordinator(e)
    }
}

impl From<AggregatorEvent> for Event {
    fn from(e: AggregatorEvent) -> Self {
        Event::Aggregator(e)
    }
}

/// Log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,
    /// Block that included the emitting transaction.
    pub block_number: u64,
    /// Decoded event.
    pub event: Event,
}

impl Log {
    /// Build a log for `address` in the block of `ctx`.
    pub fn new(address: Address, ctx: &CallContext, event: impl Into<Event>) -> Self {
        Self {
            address,
            block_number: ctx.block_number,
            event: event.into(),
        }
    }
}

/// Account record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Balance in wei.
    pub balance: Wei,
    /// Number of transactions (and contract creations) sent.
    pub nonce: u64,
    /// If false, incoming transfers are rejected.
    pub payable: bool,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            balance: 0,
            nonce: 0,
            payable: true,
        }
    }
}

/// Account ledger.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    accounts: BTreeMap<Address, Account>,
}

impl Ledger {
    /// Balance of `a` (zero for unknown accounts).
    pub fn balance_of(&self, a: &Address) -> Wei {
        self.accounts.get(a).map(|acc| acc.balance).unwrap_or(0)
    }

    /// Nonce of `a`.
    pub fn nonce_of(&self, a: &Address) -> u64 {
        self.accounts.get(a).map(|acc| acc.nonce).unwrap_or(0)
    }

    /// Whether `a` accepts incoming transfers.
    pub fn is_payable(&self, a: &Address) -> bool {
        self.accounts.get(a).map(|acc| acc.payable).unwrap_or(true)
    }

    /// Set balance directly (genesis allocation, `setBalance`).
    pub fn set_balance(&mut self, a: Address, balance: Wei) {
        self.accounts.entry(a).or_default().balance = balance;
    }

    /// Mark `a` as accepting or rejecting incoming transfers.
    pub fn set_payable(&mut self, a: Address, payable: bool) {
        self.accounts.entry(a).or_default().payable = payable;
    }

    /// Increment and return the previous nonce of `a`.
    pub fn bump_nonce(&mut self, a: &Address) -> u64 {
        let acc = self.accounts.entry(*a).or_default();
        let n = acc.nonce;
        acc.nonce = acc.nonce.saturating_add(1);
        n
    }

    /// Move `amount` from `from` to `to`. Either both sides change or neither does.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Wei,
    ) -> Result<(), ChainError> {
        if !self.is_payable(to) && amount > 0 {
            return Err(ChainError::TransferRejected(*to));
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(ChainError::InsufficientFunds {
                account: *from,
                balance,
                needed: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ChainError::Overflow)?;
        self.accounts.entry(*from).or_default().balance = balance - amount;
        self.accounts.entry(*to).or_default().balance = to_balance;
        Ok(())
    }
}

/// Vault view over one ledger account, handed to contracts that pay out.
pub struct AccountVault<'a> {
    ledger: &'a mut Ledger,
    account: Address,
}

impl<'a> AccountVault<'a> {
    /// Wrap `account` of `ledger`.
    pub fn new(ledger: &'a mut Ledger, account: Address) -> Self {
        Self { ledger, account }
    }
}

impl Vault for AccountVault<'_> {
    fn balance(&self) -> Wei {
        self.ledger.balance_of(&self.account)
    }

    fn payout(&mut self, to: &Address, amount: Wei) -> Result<(), PayoutError> {
        self.ledger
            .transfer(&self.account, to, amount)
            .map_err(|e| match e {
                ChainError::TransferRejected(a) => PayoutError::Rejected(a),
                _ => PayoutError::Insufficient,
            })
    }
}

/// Block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Height.
    pub number: u64,
    /// Seconds since UNIX epoch.
    pub timestamp: u64,
}

/// Simulated chain.
#[derive(Clone, Debug)]
pub struct LocalChain {
    /// Accounts.
    pub ledger: Ledger,
    /// Emitted logs, in order.
    pub logs: Vec<Log>,
    head: BlockHeader,
    pending_offset: u64,
}

impl LocalChain {
    /// Start a chain whose genesis block has `genesis_timestamp`.
    pub fn new(genesis_timestamp: u64) -> Self {
        Self {
            ledger: Ledger::default(),
            logs: Vec::new(),
            head: BlockHeader {
                number: 0,
                timestamp: genesis_timestamp,
            },
            pending_offset: 0,
        }
    }

    /// Latest mined block.
    pub fn head(&self) -> BlockHeader {
        self.head
    }

    /// Seconds that will be added to the next block's timestamp.
    pub fn pending_offset(&self) -> u64 {
        self.pending_offset
    }

    /// Timestamp the next mined block will carry. Read-only calls run against it.
    pub fn pending_timestamp(&self) -> u64 {
        self.head
            .timestamp
            .saturating_add(1)
            .saturating_add(self.pending_offset)
    }

    /// Shift the clock of the next block forward. Returns the accumulated offset.
    pub fn increase_time(&mut self, secs: u64) -> u64 {
        self.pending_offset = self.pending_offset.saturating_add(secs);
        self.pending_offset
    }

    /// Mine one block: `timestamp = previous + 1 + pending offset`.
    pub fn mine(&mut self) -> BlockHeader {
        let timestamp = self.pending_timestamp();
        self.pending_offset = 0;
        self.head = BlockHeader {
            number: self.head.number.saturating_add(1),
            timestamp,
        };
        self.head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increase_time_applies_to_next_block_only() {
        let mut c = LocalChain::new(1_000);
        assert_eq!(c.increase_time(10), 10);
        assert_eq!(c.increase_time(5), 15);
        assert_eq!(c.head().timestamp, 1_000);
        assert_eq!(c.pending_timestamp(), 1_016);
        let b = c.mine();
        assert_eq!(b, BlockHeader { number: 1, timestamp: 1_016 });
        assert_eq!(c.mine().timestamp, 1_017);
    }

    #[test]
    fn transfer_is_all_or_nothing() {
        let a = Address::dev_account(0);
        let b = Address::dev_account(1);
        let mut l = Ledger::default();
        l.set_balance(a, 100);

        assert!(matches!(l.transfer(&a, &b, 101), Err(ChainError::InsufficientFunds { .. })));
        l.set_payable(b, false);
        assert_eq!(l.transfer(&a, &b, 50), Err(ChainError::TransferRejected(b)));
        assert_eq!(l.balance_of(&a), 100);

        l.set_payable(b, true);
        l.transfer(&a, &b, 40).unwrap();
        assert_eq!((l.balance_of(&a), l.balance_of(&b)), (60, 40));
    }
}
