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

//! Lottery round manager: time-boxed staking with externally fulfilled randomness.
//!
//! `Open --perform_upkeep--> Calculating --fulfill_random_words--> Open (next round)`.
//! The owner may also move a stuck `Calculating` round back to `Open` after
//! `recovery_delay` seconds.

use crate::core::oracle::{OracleError, RandomnessOracle, RandomnessRequest};
use crate::core::runtime::chain::{CallContext, Log};
use crate::core::types::{Address, RequestId, SubscriptionId, Wei, H256};
use thiserror::Error;

/// Confirmations the oracle waits before answering.
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Gas budget for the fulfilment callback.
pub const CALLBACK_GAS_LIMIT: u32 = 500_000;
/// One word picks one winner.
pub const NUM_WORDS: u32 = 1;

/// Round state. The numeric codes are the contract's public encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LotteryState {
    Open = 0,
    Calculating = 1,
}

impl LotteryState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Payout failures reported by a [`Vault`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),
    #[error("vault balance too low")]
    Insufficient,
}

/// Funds held by the lottery.
pub trait Vault {
    /// Current balance.
    fn balance(&self) -> Wei;
    /// Transfer `amount` to `to`. Must leave the balance untouched on error.
    fn payout(&mut self, to: &Address, amount: Wei) -> Result<(), PayoutError>;
}

/// Lottery errors. Display strings are the contract's revert reasons.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("Lottery__NotOwner")]
    NotOwner,
    #[error("Lottery__RoundInProgress")]
    RoundInProgress,
    #[error("Lottery__StakingNotOpen")]
    StakingNotOpen,
    #[error("Lottery__InsufficientStake(sent {sent}, min {min})")]
    InsufficientStake { sent: Wei, min: Wei },
    #[error("Lottery__UpKeepNotNeeded(balance {balance}, players {players}, state {state})")]
    UpkeepNotNeeded { balance: Wei, players: usize, state: u8 },
    #[error("OnlyCoordinatorCanFulfill(have {have}, want {want})")]
    OnlyCoordinatorCanFulfill { have: Address, want: Address },
    #[error("nonexistent request")]
    UnknownRequest(RequestId),
    #[error("Lottery__NoRandomWords")]
    MissingRandomWords,
    #[error("Lottery__NoPlayers")]
    NoPlayers,
    #[error("Lottery__TransferFailed: {0}")]
    TransferFailed(PayoutError),
    #[error("Lottery__RecoveryNotAllowed")]
    RecoveryNotAllowed,
    #[error("player index {index} out of range ({len} players)")]
    PlayerIndexOutOfRange { index: usize, len: usize },
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),
}

/// Observable lottery events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LotteryEvent {
    LotteryStarted { start_time: u64 },
    PlayerStaked { player: Address },
    RequestedLotteryWinner { request_id: RequestId },
    WinnerPicked { winner: Address },
    RoundRecovered { request_id: RequestId },
}

/// Construction parameters, immutable after deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LotteryParams {
    /// Minimum value per stake.
    pub min_stake: Wei,
    /// Coordinator subscription paying for randomness.
    pub subscription_id: SubscriptionId,
    /// Coordinator address, the only accepted fulfiller.
    pub coordinator: Address,
    /// Oracle gas lane.
    pub key_hash: H256,
    /// Seconds a round stays open before upkeep may close it.
    pub event_duration: u64,
    /// Seconds after a request before the owner may recover a stuck round.
    pub recovery_delay: u64,
}

impl LotteryParams {
    /// Constructor arguments as passed to deployment records and verification.
    pub fn constructor_args(&self) -> Vec<String> {
        vec![
            self.min_stake.to_string(),
            self.subscription_id.to_string(),
            self.coordinator.to_string(),
            self.key_hash.to_string(),
            self.event_duration.to_string(),
            self.recovery_delay.to_string(),
        ]
    }
}

/// The four conditions of the upkeep gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
}

impl UpkeepStatus {
    /// True iff every condition holds.
    pub fn needed(&self) -> bool {
        self.is_open && self.time_passed && self.has_players && self.has_balance
    }
}

/// Outcome of a resolved round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    /// Round number that was resolved (1-based).
    pub round: u64,
    pub request_id: RequestId,
    pub winner: Address,
    pub prize: Wei,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingDraw {
    request_id: RequestId,
    requested_at: u64,
}

/// Lottery contract state.
#[derive(Clone, Debug)]
pub struct RoundManager {
    address: Address,
    owner: Address,
    params: LotteryParams,
    state: LotteryState,
    players: Vec<Address>,
    start_time: u64,
    pending: Option<PendingDraw>,
    recent_winner: Option<Address>,
    rounds_resolved: u64,
}

impl RoundManager {
    /// Deploy at `address`; the deployer becomes owner and the first round opens at `now`.
    pub fn new(address: Address, owner: Address, params: LotteryParams, now: u64) -> Self {
        Self {
            address,
            owner,
            params,
            state: LotteryState::Open,
            players: Vec::new(),
            start_time: now,
            pending: None,
            recent_winner: None,
            rounds_resolved: 0,
        }
    }

    /// (Re)start the round clock. Owner only, and only before anyone staked.
    pub fn start_lottery(
        &mut self,
        ctx: &CallContext,
        logs: &mut Vec<Log>,
    ) -> Result<(), LotteryError> {
        if ctx.sender != self.owner {
            return Err(LotteryError::NotOwner);
        }
        if self.state != LotteryState::Open || !self.players.is_empty() {
            return Err(LotteryError::RoundInProgress);
        }
        self.start_time = ctx.timestamp;
        logs.push(Log::new(
            self.address,
            ctx,
            LotteryEvent::LotteryStarted {
                start_time: ctx.timestamp,
            },
        ));
        Ok(())
    }

    /// Enter the current round with `ctx.value`.
    pub fn stake(&mut self, ctx: &CallContext, logs: &mut Vec<Log>) -> Result<(), LotteryError> {
        if self.state != LotteryState::Open {
            return Err(LotteryError::StakingNotOpen);
        }
        if ctx.value < self.params.min_stake {
            return Err(LotteryError::InsufficientStake {
                sent: ctx.value,
                min: self.params.min_stake,
            });
        }
        self.players.push(ctx.sender);
        logs.push(Log::new(
            self.address,
            ctx,
            LotteryEvent::PlayerStaked { player: ctx.sender },
        ));
        Ok(())
    }

    /// Evaluate each gate condition at `now` with the lottery holding `balance`.
    pub fn upkeep_status(&self, now: u64, balance: Wei) -> UpkeepStatus {
        UpkeepStatus {
            is_open: self.state == LotteryState::Open,
            time_passed: now.saturating_sub(self.start_time) >= self.params.event_duration,
            has_players: !self.players.is_empty(),
            has_balance: balance > 0,
        }
    }

    /// Read-only upkeep gate.
    pub fn check_upkeep(&self, now: u64, balance: Wei) -> bool {
        self.upkeep_status(now, balance).needed()
    }

    /// Close the round and request randomness. `balance` is the lottery's current balance.
    pub fn perform_upkeep(
        &mut self,
        ctx: &CallContext,
        balance: Wei,
        oracle: &mut dyn RandomnessOracle,
        logs: &mut Vec<Log>,
    ) -> Result<RequestId, LotteryError> {
        if !self.check_upkeep(ctx.timestamp, balance) {
            return Err(LotteryError::UpkeepNotNeeded {
                balance,
                players: self.players.len(),
                state: self.state.code(),
            });
        }

        let request = RandomnessRequest {
            key_hash: self.params.key_hash,
            sub_id: self.params.subscription_id,
            min_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit: CALLBACK_GAS_LIMIT,
            num_words: NUM_WORDS,
        };
        let request_id = oracle.request_random_words(&ctx.nested(self.address), request, logs)?;

        self.state = LotteryState::Calculating;
        self.pending = Some(PendingDraw {
            request_id,
            requested_at: ctx.timestamp,
        });
        logs.push(Log::new(
            self.address,
            ctx,
            LotteryEvent::RequestedLotteryWinner { request_id },
        ));
        Ok(request_id)
    }

    /// Oracle callback: pick the winner, pay out the whole balance, open the next round.
    pub fn fulfill_random_words(
        &mut self,
        ctx: &CallContext,
        request_id: RequestId,
        words: &[H256],
        vault: &mut dyn Vault,
        logs: &mut Vec<Log>,
    ) -> Result<Draw, LotteryError> {
        if ctx.sender != self.params.coordinator {
            return Err(LotteryError::OnlyCoordinatorCanFulfill {
                have: ctx.sender,
                want: self.params.coordinator,
            });
        }
        match self.pending {
            Some(p) if p.request_id == request_id => {}
            _ => return Err(LotteryError::UnknownRequest(request_id)),
        }
        let word = words.first().ok_or(LotteryError::MissingRandomWords)?;
        let index = word
            .mod_usize(self.players.len())
            .ok_or(LotteryError::NoPlayers)?;
        let winner = self.players[index];

        let prize = vault.balance();
        vault
            .payout(&winner, prize)
            .map_err(LotteryError::TransferFailed)?;

        self.players.clear();
        self.start_time = ctx.timestamp;
        self.state = LotteryState::Open;
        self.pending = None;
        self.recent_winner = Some(winner);
        self.rounds_resolved = self.rounds_resolved.saturating_add(1);
        logs.push(Log::new(self.address, ctx, LotteryEvent::WinnerPicked { winner }));

        Ok(Draw {
            round: self.rounds_resolved,
            request_id,
            winner,
            prize,
        })
    }

    /// Abandon a pending request that was not answered within `recovery_delay`.
    /// Players and balance carry over; the next upkeep issues a fresh request.
    pub fn recover_stuck_round(
        &mut self,
        ctx: &CallContext,
        logs: &mut Vec<Log>,
    ) -> Result<RequestId, LotteryError> {
        if ctx.sender != self.owner {
            return Err(LotteryError::NotOwner);
        }
        let pending = match (self.state, self.pending) {
            (LotteryState::Calculating, Some(p)) => p,
            _ => return Err(LotteryError::RecoveryNotAllowed),
        };
        if ctx.timestamp.saturating_sub(pending.requested_at) < self.params.recovery_delay {
            return Err(LotteryError::RecoveryNotAllowed);
        }
        self.state = LotteryState::Open;
        self.pending = None;
        logs.push(Log::new(
            self.address,
            ctx,
            LotteryEvent::RoundRecovered {
                request_id: pending.request_id,
            },
        ));
        Ok(pending.request_id)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn params(&self) -> &LotteryParams {
        &self.params
    }

    pub fn state(&self) -> LotteryState {
        self.state
    }

    pub fn min_stake(&self) -> Wei {
        self.params.min_stake
    }

    pub fn event_duration(&self) -> u64 {
        self.params.event_duration
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn players(&self) -> &[Address] {
        &self.players
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, index: usize) -> Result<Address, LotteryError> {
        self.players
            .get(index)
            .copied()
            .ok_or(LotteryError::PlayerIndexOutOfRange {
                index,
                len: self.players.len(),
            })
    }

    pub fn pending_request_id(&self) -> Option<RequestId> {
        self.pending.map(|p| p.request_id)
    }

    pub fn recent_winner(&self) -> Option<Address> {
        self.recent_winner
    }

    pub fn rounds_resolved(&self) -> u64 {
        self.rounds_resolved
    }
}
