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
#![allow(missing_docs)]

//! VRF coordinator mock for development chains.
//!
//! Subscriptions pay for requests; consumers must be registered on the
//! subscription. Fulfilment is driven externally (tests, the oracle service)
//! and is split in two phases so the execution environment can run the
//! consumer callback in between:
//!
//! 1. [`VrfCoordinatorMock::begin_fulfillment`] consumes the request, derives the
//!    words and charges the subscription.
//! 2. [`VrfCoordinatorMock::finish_fulfillment`] records whether the callback
//!    succeeded. A failed callback does not undo phase 1.

use crate::core::oracle::{OracleError, RandomnessOracle, RandomnessRequest};
use crate::core::runtime::chain::{CallContext, Log};
use crate::core::types::{sha256, Address, RequestId, SubscriptionId, Wei, H256};
use std::collections::BTreeMap;
use tracing::debug;

/// Max consumers per subscription.
pub const MAX_CONSUMERS: usize = 100;

const FIRST_REQUEST_ID: RequestId = 1;
const FIRST_PRE_SEED: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorEvent {
    SubscriptionCreated {
        sub_id: SubscriptionId,
        owner: Address,
    },
    SubscriptionFunded {
        sub_id: SubscriptionId,
        old_balance: Wei,
        new_balance: Wei,
    },
    SubscriptionCanceled {
        sub_id: SubscriptionId,
        to: Address,
        amount: Wei,
    },
    ConsumerAdded {
        sub_id: SubscriptionId,
        consumer: Address,
    },
    ConsumerRemoved {
        sub_id: SubscriptionId,
        consumer: Address,
    },
    RandomWordsRequested {
        key_hash: H256,
        request_id: RequestId,
        pre_seed: u64,
        sub_id: SubscriptionId,
        min_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
        sender: Address,
    },
    RandomWordsFulfilled {
        request_id: RequestId,
        output_seed: u64,
        payment: Wei,
        success: bool,
    },
}

/// Subscription account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub owner: Address,
    pub balance: Wei,
    /// Registration order.
    pub consumers: Vec<Address>,
}

/// Request awaiting fulfilment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: RequestId,
    pub consumer: Address,
    pub sub_id: SubscriptionId,
    pub min_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    /// Block that included the request.
    pub block_number: u64,
}

/// Result of looking a request up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Request is pending and can be answered.
    Ready(PendingRequest),
    /// No such request (never issued or already answered).
    Unknown(RequestId),
}

/// Phase-one output of a fulfilment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedFulfillment {
    pub request: PendingRequest,
    pub words: Vec<H256>,
    pub payment: Wei,
}

/// Coordinator mock state.
#[derive(Clone, Debug)]
pub struct VrfCoordinatorMock {
    address: Address,
    base_fee: Wei,
    gas_price_link: Wei,
    current_sub_id: SubscriptionId,
    next_request_id: RequestId,
    next_pre_seed: u64,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    requests: BTreeMap<RequestId, PendingRequest>,
}

impl VrfCoordinatorMock {
    pub fn new(address: Address, base_fee: Wei, gas_price_link: Wei) -> Self {
        Self {
            address,
            base_fee,
            gas_price_link,
            current_sub_id: 0,
            next_request_id: FIRST_REQUEST_ID,
            next_pre_seed: FIRST_PRE_SEED,
            subscriptions: BTreeMap::new(),
            requests: BTreeMap::new(),
        }
    }

    pub fn base_fee(&self) -> Wei {
        self.base_fee
    }

    pub fn gas_price_link(&self) -> Wei {
        self.gas_price_link
    }

    pub fn create_subscription(
        &mut self,
        ctx: &CallContext,
        logs: &mut Vec<Log>,
    ) -> SubscriptionId {
        self.current_sub_id = self.current_sub_id.saturating_add(1);
        let sub_id = self.current_sub_id;
        self.subscriptions.insert(
            sub_id,
            Subscription {
                owner: ctx.sender,
                balance: 0,
                consumers: Vec::new(),
            },
        );
        logs.push(Log::new(
            self.address,
            ctx,
            CoordinatorEvent::SubscriptionCreated {
                sub_id,
                owner: ctx.sender,
            },
        ));
        sub_id
    }

    /// Credit `amount` to a subscription. Anyone may fund.
    pub fn fund_subscription(
        &mut self,
        ctx: &CallContext,
        sub_id: SubscriptionId,
        amount: Wei,
        logs: &mut Vec<Log>,
    ) -> Result<Wei, OracleError> {
        let sub = self
            .subscriptions
            .get_mut(&sub_id)
            .ok_or(OracleError::InvalidSubscription(sub_id))?;
        let old_balance = sub.balance;
        sub.balance = sub.balance.saturating_add(amount);
        logs.push(Log::new(
            self.address,
            ctx,
            CoordinatorEvent::SubscriptionFunded {
                sub_id,
                old_balance,
                new_balance: sub.balance,
            },
        ));
        Ok(sub.balance)
    }

    fn owned_subscription(
        &mut self,
        ctx: &CallContext,
        sub_id: SubscriptionId,
    ) -> Result<&mut Subscription, OracleError> {
        let sub = self
            .subscriptions
            .get_mut(&sub_id)
            .ok_or(OracleError::InvalidSubscription(sub_id))?;
        if sub.owner != ctx.sender {
            return Err(OracleError::MustBeSubOwner { owner: sub.owner });
        }
        Ok(sub)
    }

    /// Register `consumer`. Adding an existing consumer is a no-op.
    pub fn add_consumer(
        &mut self,
        ctx: &CallContext,
        sub_id: SubscriptionId,
        consumer: Address,
        logs: &mut Vec<Log>,
    ) -> Result<(), OracleError> {
        let address = self.address;
        let sub = self.owned_subscription(ctx, sub_id)?;
        if sub.consumers.contains(&consumer) {
            return Ok(());
        }
        if sub.consumers.len() >= MAX_CONSUMERS {
            return Err(OracleError::TooManyConsumers);
        }
        sub.consumers.push(consumer);
        logs.push(Log::new(
            address,
            ctx,
            CoordinatorEvent::ConsumerAdded { sub_id, consumer },
        ));
        Ok(())
    }

    pub fn remove_consumer(
        &mut self,
        ctx: &CallContext,
        sub_id: SubscriptionId,
        consumer: Address,
        logs: &mut Vec<Log>,
    ) -> Result<(), OracleError> {
        let address = self.address;
        let sub = self.owned_subscription(ctx, sub_id)?;
        let pos = sub
            .consumers
            .iter()
            .position(|c| *c == consumer)
            .ok_or(OracleError::InvalidConsumer { sub_id, consumer })?;
        sub.consumers.remove(pos);
        logs.push(Log::new(
            address,
            ctx,
            CoordinatorEvent::ConsumerRemoved { sub_id, consumer },
        ));
        Ok(())
    }

    /// Remove a subscription and return its remaining balance (credited to `to`).
    pub fn cancel_subscription(
        &mut self,
        ctx: &CallContext,
        sub_id: SubscriptionId,
        to: Address,
        logs: &mut Vec<Log>,
    ) -> Result<Wei, OracleError> {
        let amount = self.owned_subscription(ctx, sub_id)?.balance;
        self.subscriptions.remove(&sub_id);
        logs.push(Log::new(
            self.address,
            ctx,
            CoordinatorEvent::SubscriptionCanceled { sub_id, to, amount },
        ));
        Ok(amount)
    }

    pub fn subscription(&self, sub_id: SubscriptionId) -> Result<&Subscription, OracleError> {
        self.subscriptions
            .get(&sub_id)
            .ok_or(OracleError::InvalidSubscription(sub_id))
    }

    /// Tagged lookup; never fails.
    pub fn lookup(&self, request_id: RequestId) -> Delivery {
        match self.requests.get(&request_id) {
            Some(r) => Delivery::Ready(r.clone()),
            None => Delivery::Unknown(request_id),
        }
    }

    /// Requests still waiting for an answer, by id.
    pub fn pending_requests(&self) -> impl Iterator<Item = &PendingRequest> {
        self.requests.values()
    }

    /// Price of answering a request with `callback_gas_limit`.
    ///
    /// Execution is not metered, so the whole callback budget is charged.
    pub fn fee(&self, callback_gas_limit: u32) -> Wei {
        self.base_fee
            .saturating_add(self.gas_price_link.saturating_mul(callback_gas_limit as Wei))
    }

    /// Deterministic words for `request_id`: `sha256(id || index)`, both as 32-byte words.
    pub fn derive_words(request_id: RequestId, num_words: u32) -> Vec<H256> {
        (0..num_words as u64)
            .map(|i| {
                H256::from_bytes(sha256(&[
                    H256::from_u64(request_id).as_bytes(),
                    H256::from_u64(i).as_bytes(),
                ]))
            })
            .collect()
    }

    /// Phase one: consume the request, derive (or accept) words and charge the subscription.
    ///
    /// Nothing changes on error.
    pub fn begin_fulfillment(
        &mut self,
        request_id: RequestId,
        words_override: Option<Vec<H256>>,
    ) -> Result<PreparedFulfillment, OracleError> {
        let request = match self.lookup(request_id) {
            Delivery::Ready(r) => r,
            Delivery::Unknown(id) => return Err(OracleError::NonexistentRequest(id)),
        };
        let words = match words_override {
            Some(w) => {
                if w.len() != request.num_words as usize {
                    return Err(OracleError::InvalidRandomWords {
                        expected: request.num_words,
                        got: w.len(),
                    });
                }
                w
            }
            None => Self::derive_words(request_id, request.num_words),
        };
        let payment = self.fee(request.callback_gas_limit);
        let sub = self
            .subscriptions
            .get_mut(&request.sub_id)
            .ok_or(OracleError::InvalidSubscription(request.sub_id))?;
        if sub.balance < payment {
            return Err(OracleError::InsufficientBalance {
                balance: sub.balance,
                payment,
            });
        }
        sub.balance -= payment;
        self.requests.remove(&request_id);
        Ok(PreparedFulfillment {
            request,
            words,
            payment,
        })
    }

    /// Phase two: record the callback outcome.
    pub fn finish_fulfillment(
        &mut self,
        ctx: &CallContext,
        prepared: &PreparedFulfillment,
        success: bool,
        logs: &mut Vec<Log>,
    ) {
        let request_id = prepared.request.request_id;
        debug!(request_id, success, payment = %prepared.payment, "random words fulfilled");
        logs.push(Log::new(
            self.address,
            ctx,
            CoordinatorEvent::RandomWordsFulfilled {
                request_id,
                output_seed: request_id,
                payment: prepared.payment,
                success,
            },
        ));
    }
}

impl RandomnessOracle for VrfCoordinatorMock {
    fn address(&self) -> Address {
        self.address
    }

    fn request_random_words(
        &mut self,
        ctx: &CallContext,
        request: RandomnessRequest,
        logs: &mut Vec<Log>,
    ) -> Result<RequestId, OracleError> {
        let sub = self
            .subscriptions
            .get(&request.sub_id)
            .ok_or(OracleError::InvalidSubscription(request.sub_id))?;
        if !sub.consumers.contains(&ctx.sender) {
            return Err(OracleError::InvalidConsumer {
                sub_id: request.sub_id,
                consumer: ctx.sender,
            });
        }

        let request_id = self.next_request_id;
        let pre_seed = self.next_pre_seed;
        self.next_request_id = self.next_request_id.saturating_add(1);
        self.next_pre_seed = self.next_pre_seed.saturating_add(1);

        self.requests.insert(
            request_id,
            PendingRequest {
                request_id,
                consumer: ctx.sender,
                sub_id: request.sub_id,
                min_confirmations: request.min_confirmations,
                callback_gas_limit: request.callback_gas_limit,
                num_words: request.num_words,
                block_number: ctx.block_number,
            },
        );
        logs.push(Log::new(
            self.address,
            ctx,
            CoordinatorEvent::RandomWordsRequested {
                key_hash: request.key_hash,
                request_id,
                pre_seed,
                sub_id: request.sub_id,
                min_confirmations: request.min_confirmations,
                callback_gas_limit: request.callback_gas_limit,
                num_words: request.num_words,
                sender: ctx.sender,
            },
        ));
        Ok(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(sender: Address) -> CallContext {
        CallContext {
            sender,
            value: 0,
            timestamp: 10,
            block_number: 2,
        }
    }

    fn request(sub_id: SubscriptionId) -> RandomnessRequest {
        RandomnessRequest {
            key_hash: H256::ZERO,
            sub_id,
            min_confirmations: 3,
            callback_gas_limit: 500_000,
            num_words: 1,
        }
    }

    #[test]
    fn ids_start_at_one() {
        let owner = Address::dev_account(0);
        let consumer = Address::dev_account(5);
        let mut c = VrfCoordinatorMock::new(Address::dev_account(9), 100_000, 100_000);
        let mut logs = Vec::new();

        assert_eq!(c.lookup(0), Delivery::Unknown(0));
        assert_eq!(c.lookup(1), Delivery::Unknown(1));

        let sub = c.create_subscription(&ctx(owner), &mut logs);
        assert_eq!(sub, 1);
        c.add_consumer(&ctx(owner), sub, consumer, &mut logs).unwrap();
        let id = c.request_random_words(&ctx(consumer), request(sub), &mut logs).unwrap();
        assert_eq!(id, 1);
        assert!(matches!(c.lookup(1), Delivery::Ready(r) if r.consumer == consumer));
    }

    #[test]
    fn unregistered_consumer_is_rejected() {
        let owner = Address::dev_account(0);
        let mut c = VrfCoordinatorMock::new(Address::dev_account(9), 1, 1);
        let mut logs = Vec::new();
        let sub = c.create_subscription(&ctx(owner), &mut logs);
        let err = c
            .request_random_words(&ctx(Address::dev_account(4)), request(sub), &mut logs)
            .unwrap_err();
        assert!(matches!(err, OracleError::InvalidConsumer { .. }));
        assert_eq!(
            c.request_random_words(&ctx(owner), request(sub + 1), &mut logs),
            Err(OracleError::InvalidSubscription(sub + 1))
        );
    }

    #[test]
    fn only_owner_manages_consumers() {
        let owner = Address::dev_account(0);
        let mut c = VrfCoordinatorMock::new(Address::dev_account(9), 1, 1);
        let mut logs = Vec::new();
        let sub = c.create_subscription(&ctx(owner), &mut logs);
        let err = c
            .add_consumer(&ctx(Address::dev_account(1)), sub, Address::dev_account(2), &mut logs)
            .unwrap_err();
        assert_eq!(err, OracleError::MustBeSubOwner { owner });
    }

    #[test]
    fn underfunded_subscription_keeps_request() {
        let owner = Address::dev_account(0);
        let consumer = Address::dev_account(5);
        let mut c = VrfCoordinatorMock::new(Address::dev_account(9), 100_000, 100_000);
        let mut logs = Vec::new();
        let sub = c.create_subscription(&ctx(owner), &mut logs);
        c.add_consumer(&ctx(owner), sub, consumer, &mut logs).unwrap();
        let id = c.request_random_words(&ctx(consumer), request(sub), &mut logs).unwrap();

        let err = c.begin_fulfillment(id, None).unwrap_err();
        assert!(matches!(err, OracleError::InsufficientBalance { balance: 0, .. }));
        assert!(matches!(c.lookup(id), Delivery::Ready(_)));

        let fee = c.fee(500_000);
        c.fund_subscription(&ctx(owner), sub, fee, &mut logs).unwrap();
        let prepared = c.begin_fulfillment(id, None).unwrap();
        assert_eq!(prepared.words, VrfCoordinatorMock::derive_words(id, 1));
        assert_eq!(c.subscription(sub).unwrap().balance, 0);
        assert_eq!(c.lookup(id), Delivery::Unknown(id));
        assert_eq!(c.begin_fulfillment(id, None), Err(OracleError::NonexistentRequest(id)));
    }
}
