// Copyright (c) 2026 Lottery Harness Authors
// Licensed under the Apache License, Version 2.0

//! Price feed mock with round history.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

use crate::core::runtime::chain::{CallContext, Log};
use crate::core::types::Address;
use std::collections::BTreeMap;
use thiserror::Error;

pub const DESCRIPTION: &str = "v0.8/tests/MockV3Aggregator.sol";
pub const VERSION: u32 = 0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("No data present")]
    NoDataPresent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregatorEvent {
    AnswerUpdated {
        current: i128,
        round_id: u64,
        updated_at: u64,
    },
    NewRound {
        round_id: u64,
        started_by: Address,
        started_at: u64,
    },
}

/// One price round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

#[derive(Clone, Debug)]
pub struct MockV3Aggregator {
    address: Address,
    decimals: u8,
    latest_round: u64,
    rounds: BTreeMap<u64, RoundData>,
}

impl MockV3Aggregator {
    /// Deploy with round 1 holding `initial_answer`.
    pub fn new(
        address: Address,
        decimals: u8,
        initial_answer: i128,
        ctx: &CallContext,
        logs: &mut Vec<Log>,
    ) -> Self {
        let mut agg = Self {
            address,
            decimals,
            latest_round: 0,
            rounds: BTreeMap::new(),
        };
        agg.update_answer(ctx, initial_answer, logs);
        agg
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn description(&self) -> &'static str {
        DESCRIPTION
    }

    pub fn version(&self) -> u32 {
        VERSION
    }

    /// Start a new round with `answer` at the call's timestamp.
    pub fn update_answer(&mut self, ctx: &CallContext, answer: i128, logs: &mut Vec<Log>) -> u64 {
        self.latest_round = self.latest_round.saturating_add(1);
        let round_id = self.latest_round;
        self.rounds.insert(
            round_id,
            RoundData {
                round_id,
                answer,
                started_at: ctx.timestamp,
                updated_at: ctx.timestamp,
                answered_in_round: round_id,
            },
        );
        logs.push(Log::new(
            self.address,
            ctx,
            AggregatorEvent::AnswerUpdated {
                current: answer,
                round_id,
                updated_at: ctx.timestamp,
            },
        ));
        logs.push(Log::new(
            self.address,
            ctx,
            AggregatorEvent::NewRound {
                round_id,
                started_by: ctx.sender,
                started_at: ctx.timestamp,
            },
        ));
        round_id
    }

    /// Overwrite `round_id` and make it the latest round.
    pub fn update_round_data(
        &mut self,
        round_id: u64,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) {
        self.latest_round = round_id;
        self.rounds.insert(
            round_id,
            RoundData {
                round_id,
                answer,
                started_at,
                updated_at: timestamp,
                answered_in_round: round_id,
            },
        );
    }

    pub fn round_data(&self, round_id: u64) -> Result<RoundData, AggregatorError> {
        self.rounds
            .get(&round_id)
            .copied()
            .ok_or(AggregatorError::NoDataPresent)
    }

    pub fn latest_round_data(&self) -> Result<RoundData, AggregatorError> {
        self.round_data(self.latest_round)
    }

    pub fn latest_answer(&self) -> Result<i128, AggregatorError> {
        self.latest_round_data().map(|r| r.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_advance_on_update() {
        let ctx = CallContext {
            sender: Address::dev_account(0),
            value: 0,
            timestamp: 50,
            block_number: 1,
        };
        let mut logs = Vec::new();
        let feed = Address::dev_account(8);
        let mut agg = MockV3Aggregator::new(feed, 18, 207_810_000_000, &ctx, &mut logs);
        assert_eq!(agg.latest_answer().unwrap(), 207_810_000_000);
        assert_eq!(logs.len(), 2);

        let later = CallContext { timestamp: 60, ..ctx };
        assert_eq!(agg.update_answer(&later, 1, &mut logs), 2);
        let r = agg.latest_round_data().unwrap();
        assert_eq!((r.round_id, r.answer, r.updated_at), (2, 1, 60));
        assert_eq!(agg.round_data(1).unwrap().answer, 207_810_000_000);
        assert_eq!(agg.round_data(7), Err(AggregatorError::NoDataPresent));
    }
}
