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

use crate::core::lottery::LotteryEvent;
use crate::core::oracle::coordinator::CoordinatorEvent;
use crate::core::runtime::chain::{Event, Log};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
    #[error("encode")]
    Encode,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Chain head height.
    pub block_height: IntGauge,
    /// Committed transactions.
    pub transactions_total: IntCounter,
    /// Reverted transactions.
    pub transactions_reverted_total: IntCounter,

    /// Accepted stakes.
    pub stakes_total: IntCounter,
    /// Players across deployed lotteries. Set by the devnet from its state.
    pub players: IntGauge,
    /// Successful upkeeps (rounds closed).
    pub upkeeps_total: IntCounter,
    /// Rounds paid out.
    pub rounds_resolved_total: IntCounter,
    /// Oracle callbacks that failed inside the consumer.
    pub callback_failures_total: IntCounter,

    /// Randomness requests issued.
    pub oracle_requests_total: IntCounter,
    /// Randomness requests answered.
    pub oracle_fulfillments_total: IntCounter,
    /// Requests issued but not yet answered. Set by the devnet from its state.
    pub oracle_pending_requests: IntGauge,
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let block_height = IntGauge::new("lottery_chain_block_height", "Current block height")
            .map_err(|_| MetricsError::Prom)?;
        let transactions_total =
            IntCounter::new("lottery_chain_transactions_total", "Committed transactions")
                .map_err(|_| MetricsError::Prom)?;
        let transactions_reverted_total = IntCounter::new(
            "lottery_chain_transactions_reverted_total",
            "Reverted transactions",
        )
        .map_err(|_| MetricsError::Prom)?;

        let stakes_total = IntCounter::new("lottery_stakes_total", "Accepted stakes")
            .map_err(|_| MetricsError::Prom)?;
        let players = IntGauge::new("lottery_players", "Players in the current round")
            .map_err(|_| MetricsError::Prom)?;
        let upkeeps_total = IntCounter::new("lottery_upkeeps_total", "Rounds closed by upkeep")
            .map_err(|_| MetricsError::Prom)?;
        let rounds_resolved_total =
            IntCounter::new("lottery_rounds_resolved_total", "Rounds paid out")
                .map_err(|_| MetricsError::Prom)?;
        let callback_failures_total = IntCounter::new(
            "lottery_callback_failures_total",
            "Randomness callbacks that reverted in the consumer",
        )
        .map_err(|_| MetricsError::Prom)?;

        let oracle_requests_total =
            IntCounter::new("lottery_oracle_requests_total", "Randomness requests issued")
                .map_err(|_| MetricsError::Prom)?;
        let oracle_fulfillments_total = IntCounter::new(
            "lottery_oracle_fulfillments_total",
            "Randomness requests answered",
        )
        .map_err(|_| MetricsError::Prom)?;
        let oracle_pending_requests = IntGauge::new(
            "lottery_oracle_pending_requests",
            "Randomness requests awaiting an answer",
        )
        .map_err(|_| MetricsError::Prom)?;

        registry
            .register(Box::new(block_height.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(transactions_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(transactions_reverted_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(stakes_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(players.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(upkeeps_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(rounds_resolved_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(callback_failures_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(oracle_requests_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(oracle_fulfillments_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(oracle_pending_requests.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            block_height,
            transactions_total,
            transactions_reverted_total,
            stakes_total,
            players,
            upkeeps_total,
            rounds_resolved_total,
            callback_failures_total,
            oracle_requests_total,
            oracle_fulfillments_total,
            oracle_pending_requests,
        })
    }

    /// Count the events in the logs of one committed transaction.
    pub fn observe_logs(&self, logs: &[Log]) {
        for log in logs {
            match &log.event {
                Event::Lottery(LotteryEvent::PlayerStaked { .. }) => self.stakes_total.inc(),
                Event::Lottery(LotteryEvent::RequestedLotteryWinner { .. }) => {
                    self.upkeeps_total.inc()
                }
                Event::Lottery(LotteryEvent::WinnerPicked { .. }) => {
                    self.rounds_resolved_total.inc()
                }
                Event::Coordinator(CoordinatorEvent::RandomWordsRequested { .. }) => {
                    self.oracle_requests_total.inc()
                }
                Event::Coordinator(CoordinatorEvent::RandomWordsFulfilled { success, .. }) => {
                    self.oracle_fulfillments_total.inc();
                    if !success {
                        self.callback_failures_total.inc();
                    }
                }
                _ => {}
            }
        }
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Encode)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Encode)
    }
}
